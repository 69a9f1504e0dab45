//! The two fixed roles of a match.

use serde::{Deserialize, Serialize};

/// Which role this client holds for the lifetime of a match.
///
/// The Host decides the round count and is the sole initiator of the
/// start-round signal; the Guest never self-starts a round. Keeping the
/// role as an explicit variant (rather than a scattered boolean) lets
/// every host-only transition gate through one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Host,
    Guest,
}

impl Side {
    /// Whether this side holds round-start and round-count authority.
    pub const fn is_host(self) -> bool {
        matches!(self, Side::Host)
    }

    /// The role the peer holds.
    pub const fn other(self) -> Side {
        match self {
            Side::Host => Side::Guest,
            Side::Guest => Side::Host,
        }
    }
}
