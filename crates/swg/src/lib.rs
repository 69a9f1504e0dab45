//! # SWG
//!
//! Snake Water Gun: a casual two-player choice game, playable against a
//! remote human over a direct peer channel or against the scripted
//! house opponent.
//!
//! This crate is the unified surface. The interesting part lives in
//! [`swg_sync`]: a small distributed-agreement protocol that keeps two
//! independently running clients in step about round starts, choice
//! resolution, timeouts, score, and continuation, with no server in the
//! middle. [`swg_core`] holds the pure primitives, and [`solo`] the
//! offline mode.
//!
//! ## Hosting a match
//!
//! ```rust,no_run
//! use swg::{MatchConfig, MatchSession, NullRenderer, PlayerId, PlayerProfile};
//!
//! async fn example(channel: impl swg::Transport) {
//!     let profile = PlayerProfile::new("ada", PlayerId::generate());
//!     let session = MatchSession::host(
//!         profile,
//!         channel,
//!         NullRenderer,
//!         MatchConfig::default(),
//!     )
//!     .unwrap();
//!
//!     let (actions, feed) = tokio::sync::mpsc::unbounded_channel();
//!     // Hand `actions` to the UI layer, then:
//!     let end = session.run(feed).await;
//!     let _ = (actions, end);
//! }
//! ```

pub mod solo;

pub use solo::{RoundRecord, SoloGame};
pub use swg_core::{
    resolve, Choice, CoreError, MatchState, Outcome, PlayerId, PlayerProfile, RoomCode, Side,
};
pub use swg_sync::{
    ChannelEvent, MatchConfig, MatchEnd, MatchPhase, MatchSession, MatchVerdict, NullRenderer,
    PeerMessage, PlayerAction, Renderer, ResultDetail, RoundPhase, Seat, SyncError, TickUrgency,
    Transport,
};
