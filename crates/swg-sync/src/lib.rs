//! # SWG Sync
//!
//! The peer match-synchronization protocol for Snake Water Gun: two
//! independently running clients, one ordered-but-unreliable message
//! channel, no central authority, and a shared obligation to agree on
//! round starts, resolution, score, and whether to keep playing.
//!
//! ## Key Properties
//!
//! - **Asymmetric authority**: only the Host turns "both screens ready"
//!   into a running round, so the two clocks never free-run apart.
//! - **Level-triggered**: handshakes re-check current flags, never edge
//!   counts, so redundant or stale messages fall through harmlessly.
//! - **Fire-and-forget**: no acks, no retries, no message queue. A lost
//!   choice is recovered by the round timer; a lost readiness signal
//!   stalls its handshake (a known, accepted gap).
//! - **Absorbing failures**: malformed frames, desynced messages, and
//!   double submissions are ignored; only channel loss is terminal.
//!
//! ## Message Flow
//!
//! ```text
//! Host                                Guest
//!   |-------- profile ----------------->|
//!   |<------- profile ------------------|
//!   |-------- screen-ready ------------>|
//!   |<------- screen-ready -------------|
//!   |-------- start-round ------------->|
//!   |-------- choice ------------------>|
//!   |<------- choice -------------------|
//!   |<------- play-again-ready ---------|
//!   |-------- play-again-ready -------->|
//!   |              (next round...)      |
//! ```

pub mod error;
pub mod messages;
pub mod protocol;
pub mod render;
pub mod timer;
pub mod transport;

pub use error::{Result, SyncError};
pub use messages::PeerMessage;
pub use protocol::{
    MatchConfig, MatchEnd, MatchPhase, MatchSession, PlayerAction, RoundPhase,
};
pub use render::{MatchVerdict, NullRenderer, Renderer, ResultDetail, Seat};
pub use timer::{RoundTimer, TickUrgency, TimerEvent};
pub use transport::{memory::MemoryTransport, ChannelEvent, Transport};
