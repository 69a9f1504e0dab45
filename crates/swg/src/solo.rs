//! Solo play against the scripted house opponent.
//!
//! No protocol, no timers, no peer: the house picks uniformly at
//! random the moment the player commits, rounds are unbounded, and the
//! same resolver decides. Presentation (the shuffle animation, the
//! thinking indicator) is the embedder's business.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use swg_core::{resolve, Choice, Outcome};

/// One completed solo round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRecord {
    /// 1-based round index this record belongs to.
    pub round: u32,
    pub mine: Choice,
    pub house: Choice,
    /// Verdict from the player's perspective.
    pub outcome: Outcome,
}

/// A running solo game.
pub struct SoloGame {
    rng: StdRng,
    round: u32,
    my_score: u32,
    house_score: u32,
}

impl SoloGame {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Seeded variant for deterministic play.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            round: 1,
            my_score: 0,
            house_score: 0,
        }
    }

    /// Play the current round and move on to the next.
    pub fn play_round(&mut self, mine: Choice) -> RoundRecord {
        let house = Choice::ALL[self.rng.gen_range(0..Choice::ALL.len())];
        let outcome = resolve(mine, house);
        match outcome {
            Outcome::Win => self.my_score += 1,
            Outcome::Lose => self.house_score += 1,
            Outcome::Draw => {}
        }
        let record = RoundRecord {
            round: self.round,
            mine,
            house,
            outcome,
        };
        self.round += 1;
        record
    }

    /// The round the next play will count for.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Running (player, house) score.
    pub fn scores(&self) -> (u32, u32) {
        (self.my_score, self.house_score)
    }
}

impl Default for SoloGame {
    fn default() -> Self {
        Self::new()
    }
}
