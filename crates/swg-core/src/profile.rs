//! Player identity: a stable short id plus a display name.
//!
//! Generation happens once per install; persisting the result is the
//! embedding application's job.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A four-digit player identifier (1000..=9999).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(u16);

impl PlayerId {
    const MIN: u16 = 1000;
    const MAX: u16 = 9999;

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        use rand::Rng;
        Self(rand::thread_rng().gen_range(Self::MIN..=Self::MAX))
    }

    /// Wrap a previously persisted id.
    pub fn from_raw(raw: u16) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(CoreError::InvalidPlayerId(raw))
        }
    }

    /// The raw numeric value.
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity exchanged in the `profile` message at connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Chosen nickname; may be empty.
    pub name: String,
    /// Stable per-user identifier.
    pub id: PlayerId,
}

impl PlayerProfile {
    pub fn new(name: impl Into<String>, id: PlayerId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    /// Nickname, or `Player#<id>` when none was set.
    pub fn display_name(&self) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            format!("Player#{}", self.id)
        } else {
            trimmed.to_string()
        }
    }
}
