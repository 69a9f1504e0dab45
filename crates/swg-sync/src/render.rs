//! Rendering collaborator interface.
//!
//! The session never touches presentation. It narrates the match
//! through these callbacks and the embedder draws cards, scores and the
//! countdown however it likes.

use swg_core::{Choice, Outcome, PlayerProfile};

use crate::timer::TickUrgency;

/// Which side of the table a callback refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Mine,
    Theirs,
}

/// How a resolved round came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDetail {
    /// Both picked; the winning choice beat the losing one.
    Beats { winner: Choice, loser: Choice },
    /// Both picked the same thing.
    Mirror(Choice),
    /// The opponent never picked before the clock ran out.
    OpponentTimedOut,
    /// The local player never picked before the clock ran out.
    LocalTimedOut,
    /// Neither side picked; the round is a forced draw.
    BothTimedOut,
}

/// Final verdict of a completed match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchVerdict {
    pub outcome: Outcome,
    pub my_score: u32,
    pub opponent_score: u32,
}

/// Presentation callbacks emitted by the session.
pub trait Renderer: Send {
    /// The peer's identity arrived.
    fn opponent_joined(&mut self, profile: &PlayerProfile);

    /// A new round's banner: index and match length.
    fn show_round(&mut self, round: u32, total_rounds: u32);

    /// Put a face-down waiting card on a seat.
    fn show_waiting_card(&mut self, seat: Seat);

    /// A seat locked in its pick (still hidden).
    fn choice_locked(&mut self, seat: Seat);

    /// Reveal a seat's card.
    fn show_revealed_card(&mut self, seat: Seat, choice: Choice);

    /// Announce a round result.
    fn show_result(&mut self, outcome: Outcome, detail: ResultDetail);

    /// Running score changed.
    fn update_score(&mut self, mine: u32, theirs: u32);

    /// Countdown tick. Urgency is a presentation hint only.
    fn update_timer(&mut self, remaining: u64, urgency: TickUrgency);

    /// The match is over; final verdict.
    fn match_over(&mut self, verdict: MatchVerdict);

    /// The channel dropped; the match cannot continue. Reported once.
    fn connection_lost(&mut self);
}

/// A renderer that draws nothing. Useful for headless drivers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn opponent_joined(&mut self, _profile: &PlayerProfile) {}
    fn show_round(&mut self, _round: u32, _total_rounds: u32) {}
    fn show_waiting_card(&mut self, _seat: Seat) {}
    fn choice_locked(&mut self, _seat: Seat) {}
    fn show_revealed_card(&mut self, _seat: Seat, _choice: Choice) {}
    fn show_result(&mut self, _outcome: Outcome, _detail: ResultDetail) {}
    fn update_score(&mut self, _mine: u32, _theirs: u32) {}
    fn update_timer(&mut self, _remaining: u64, _urgency: TickUrgency) {}
    fn match_over(&mut self, _verdict: MatchVerdict) {}
    fn connection_lost(&mut self) {}
}
