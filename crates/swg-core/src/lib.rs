//! # SWG Core
//!
//! Pure primitives for the Snake Water Gun duel: choices and the cyclic
//! dominance resolver, player identity, room codes, and the per-peer
//! match state.
//!
//! This crate contains no I/O, no timers, no networking. The peer
//! protocol that keeps two `MatchState` instances in agreement lives in
//! `swg-sync`.
//!
//! ## Key Types
//!
//! - [`Choice`] / [`Outcome`] / [`resolve`] - the game rule
//! - [`Side`] - Host/Guest role, fixed per match
//! - [`MatchState`] - the local client's authoritative view of a match
//! - [`PlayerProfile`] / [`PlayerId`] - identity exchanged at connect
//! - [`RoomCode`] - the rendezvous identifier peers share out of band

pub mod choice;
pub mod error;
pub mod profile;
pub mod room;
pub mod side;
pub mod state;

pub use choice::{resolve, Choice, Outcome};
pub use error::CoreError;
pub use profile::{PlayerId, PlayerProfile};
pub use room::RoomCode;
pub use side::Side;
pub use state::MatchState;
