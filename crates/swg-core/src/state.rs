//! Per-peer match state.
//!
//! Each client owns exactly one `MatchState`; the peer holds its own
//! independent instance and the two converge only through the message
//! protocol. Nothing here is shared by reference across the channel.

use crate::choice::{Choice, Outcome};
use crate::error::CoreError;
use crate::side::Side;

/// The authoritative local view of a match in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    /// Role this client holds, fixed for the match.
    pub side: Side,
    /// Current round, 1-based. Never exceeds `total_rounds`.
    pub round: u32,
    /// Match length. Host-authoritative; the Guest adopts it from the
    /// host's profile message.
    pub total_rounds: u32,
    pub my_score: u32,
    pub opponent_score: u32,
    pub my_choice: Option<Choice>,
    pub opponent_choice: Option<Choice>,
    /// True from the moment the round accepts choices until its single
    /// resolution has been applied. Guards against double scoring.
    pub is_resolving: bool,
    /// Local round UI presented.
    pub round_ready: bool,
    /// Peer reported its round UI presented.
    pub opponent_screen_ready: bool,
    /// Local continue vote cast.
    pub play_again_ready: bool,
    /// Peer's continue vote received.
    pub opponent_play_again_ready: bool,
}

impl MatchState {
    /// Create state for round 1 of a fresh match.
    pub fn new(side: Side, total_rounds: u32) -> Result<Self, CoreError> {
        if total_rounds < 1 {
            return Err(CoreError::InvalidRoundCount(total_rounds));
        }
        Ok(Self {
            side,
            round: 1,
            total_rounds,
            my_score: 0,
            opponent_score: 0,
            my_choice: None,
            opponent_choice: None,
            is_resolving: false,
            round_ready: false,
            opponent_screen_ready: false,
            play_again_ready: false,
            opponent_play_again_ready: false,
        })
    }

    /// Adopt the host's round count. Ignored for zero (a peer bug) and
    /// on the host itself, whose own value is authoritative.
    pub fn adopt_total_rounds(&mut self, total_rounds: u32) {
        if !self.side.is_host() && total_rounds >= 1 {
            self.total_rounds = total_rounds;
        }
    }

    /// Open the current round's choice window.
    pub fn begin_round(&mut self) {
        self.my_choice = None;
        self.opponent_choice = None;
        self.is_resolving = true;
    }

    /// Both picks are in.
    pub fn both_chosen(&self) -> bool {
        self.my_choice.is_some() && self.opponent_choice.is_some()
    }

    /// The pair of picks, once both are in.
    pub fn choices(&self) -> Option<(Choice, Choice)> {
        match (self.my_choice, self.opponent_choice) {
            (Some(mine), Some(theirs)) => Some((mine, theirs)),
            _ => None,
        }
    }

    /// Apply the round's single resolution: bump the winning side's
    /// score and clear both picks.
    ///
    /// Returns false (and changes nothing) if the round was already
    /// resolved; a late timer expiry or duplicate choice message must
    /// never score twice.
    pub fn apply_outcome(&mut self, outcome: Outcome) -> bool {
        if !self.is_resolving {
            return false;
        }
        match outcome {
            Outcome::Win => self.my_score += 1,
            Outcome::Lose => self.opponent_score += 1,
            Outcome::Draw => {}
        }
        self.my_choice = None;
        self.opponent_choice = None;
        self.is_resolving = false;
        true
    }

    /// Whether the current round is the match's last.
    pub fn is_final_round(&self) -> bool {
        self.round >= self.total_rounds
    }

    /// Move to the next round: bump the index and clear choices and all
    /// four readiness flags.
    ///
    /// Returns false on the final round; the match completion path
    /// handles that instead.
    pub fn advance_round(&mut self) -> bool {
        if self.is_final_round() {
            return false;
        }
        self.round += 1;
        self.my_choice = None;
        self.opponent_choice = None;
        self.is_resolving = false;
        self.round_ready = false;
        self.opponent_screen_ready = false;
        self.play_again_ready = false;
        self.opponent_play_again_ready = false;
        true
    }

    /// Final verdict from the cumulative score.
    pub fn final_outcome(&self) -> Outcome {
        match self.my_score.cmp(&self.opponent_score) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Lose,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}
