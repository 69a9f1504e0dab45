//! Peer protocol message types.
//!
//! One message is one logical event, serialized as a JSON object tagged
//! by `type`. The shapes (including the camelCase `totalRounds` field)
//! are frozen; changing any of them breaks deployed peers.

use serde::{Deserialize, Serialize};

use swg_core::{Choice, PlayerId};

/// Messages exchanged over the peer channel.
///
/// Every message is fire-and-forget: nothing is acknowledged, and every
/// type is tolerant of being received again. Loss shows up only as a
/// stalled handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PeerMessage {
    /// Introduce yourself once the channel opens. Seeds the opponent's
    /// identity; the Host's copy also fixes the match length.
    Profile {
        name: String,
        id: PlayerId,
        /// Present on the Host's profile only.
        #[serde(
            rename = "totalRounds",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        total_rounds: Option<u32>,
    },

    /// The sender's round UI is on screen.
    ScreenReady,

    /// Begin the choice window. Host to Guest only.
    StartRound,

    /// The sender's locked-in pick for the current round.
    Choice { choice: Choice },

    /// Alternate readiness signal kept for wire compatibility; received
    /// as a continue vote, never emitted.
    Ready,

    /// Continue-handshake vote after a resolved round.
    PlayAgainReady,
}

impl PeerMessage {
    /// Serialize to a wire frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a wire frame. Unknown `type` discriminants and
    /// malformed frames fail here and get dropped by the session.
    pub fn decode(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}
