//! Error types for the core primitives.

use thiserror::Error;

/// Core errors for identity and match-state construction.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("room code too short: need at least {min} characters, got {got}")]
    CodeTooShort { min: usize, got: usize },

    #[error("a match needs at least one round, got {0}")]
    InvalidRoundCount(u32),

    #[error("player id out of range: {0}")]
    InvalidPlayerId(u16),
}
