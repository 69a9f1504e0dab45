//! The three weapons and the cyclic dominance rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three weapons a player can throw in a round.
///
/// The dominance relation is a single 3-cycle: Snake drinks Water,
/// Water douses Gun, Gun shoots Snake. Reversing any edge changes the
/// game, so the cycle is fixed here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Snake,
    Water,
    Gun,
}

impl Choice {
    /// All choices in canonical order.
    pub const ALL: [Choice; 3] = [Choice::Snake, Choice::Water, Choice::Gun];

    /// The default card shown when a round resolves with no pick at all.
    pub const DEFAULT_DISPLAY: Choice = Choice::Snake;

    /// The choice this one defeats.
    pub const fn beats(self) -> Choice {
        match self {
            Choice::Snake => Choice::Water,
            Choice::Water => Choice::Gun,
            Choice::Gun => Choice::Snake,
        }
    }

    /// Uppercase display name.
    pub const fn name(self) -> &'static str {
        match self {
            Choice::Snake => "SNAKE",
            Choice::Water => "WATER",
            Choice::Gun => "GUN",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Round verdict, always from the perspective of the first argument
/// passed to [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

impl Outcome {
    /// The same verdict seen from the other side of the table.
    pub const fn flip(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Lose,
            Outcome::Lose => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }
}

/// Resolve a round between two choices.
///
/// Total and pure. `Draw` iff both picked the same thing; otherwise the
/// 3-cycle decides.
pub const fn resolve(mine: Choice, theirs: Choice) -> Outcome {
    match (mine, theirs) {
        (Choice::Snake, Choice::Snake)
        | (Choice::Water, Choice::Water)
        | (Choice::Gun, Choice::Gun) => Outcome::Draw,
        (Choice::Snake, Choice::Water)
        | (Choice::Water, Choice::Gun)
        | (Choice::Gun, Choice::Snake) => Outcome::Win,
        _ => Outcome::Lose,
    }
}
