//! Test fixtures and helpers.
//!
//! Common setup for protocol tests: a connected pair of sessions over
//! the in-memory transport, a renderer that records every callback, and
//! a scripted player that reacts to render cues the way a UI would.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use swg_core::{Choice, Outcome, PlayerId, PlayerProfile};
use swg_sync::render::{MatchVerdict, Renderer, ResultDetail, Seat};
use swg_sync::transport::memory::{pair, MemoryTransport};
use swg_sync::{MatchConfig, MatchSession, PlayerAction, TickUrgency};

/// Everything a renderer can be told, as data.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    OpponentJoined { name: String },
    ShowRound { round: u32, total_rounds: u32 },
    ShowWaitingCard { seat: Seat },
    ChoiceLocked { seat: Seat },
    ShowRevealedCard { seat: Seat, choice: Choice },
    ShowResult { outcome: Outcome, detail: ResultDetail },
    UpdateScore { mine: u32, theirs: u32 },
    UpdateTimer { remaining: u64, urgency: TickUrgency },
    MatchOver { verdict: MatchVerdict },
    ConnectionLost,
}

/// Shared handle onto a [`RecordingRenderer`]'s event log.
#[derive(Debug, Clone, Default)]
pub struct RenderLog(Arc<Mutex<Vec<RenderEvent>>>);

impl RenderLog {
    /// Snapshot of everything rendered so far.
    pub fn events(&self) -> Vec<RenderEvent> {
        self.0.lock().expect("render log poisoned").clone()
    }

    /// Count events matching a predicate.
    pub fn count(&self, pred: impl Fn(&RenderEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: RenderEvent) {
        self.0.lock().expect("render log poisoned").push(event);
    }
}

/// A renderer that records every callback and optionally forwards each
/// one as a live cue (for a [`ScriptedPlayer`]).
pub struct RecordingRenderer {
    log: RenderLog,
    cues: Option<mpsc::UnboundedSender<RenderEvent>>,
}

impl RecordingRenderer {
    /// Record only.
    pub fn new() -> (Self, RenderLog) {
        let log = RenderLog::default();
        (
            Self {
                log: log.clone(),
                cues: None,
            },
            log,
        )
    }

    /// Record and forward live cues.
    pub fn with_cues() -> (Self, RenderLog, mpsc::UnboundedReceiver<RenderEvent>) {
        let log = RenderLog::default();
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                log: log.clone(),
                cues: Some(tx),
            },
            log,
            rx,
        )
    }

    fn emit(&mut self, event: RenderEvent) {
        self.log.push(event.clone());
        if let Some(cues) = &self.cues {
            // The driver may have stopped listening; that is fine.
            let _ = cues.send(event);
        }
    }
}

impl Renderer for RecordingRenderer {
    fn opponent_joined(&mut self, profile: &PlayerProfile) {
        self.emit(RenderEvent::OpponentJoined {
            name: profile.display_name(),
        });
    }

    fn show_round(&mut self, round: u32, total_rounds: u32) {
        self.emit(RenderEvent::ShowRound {
            round,
            total_rounds,
        });
    }

    fn show_waiting_card(&mut self, seat: Seat) {
        self.emit(RenderEvent::ShowWaitingCard { seat });
    }

    fn choice_locked(&mut self, seat: Seat) {
        self.emit(RenderEvent::ChoiceLocked { seat });
    }

    fn show_revealed_card(&mut self, seat: Seat, choice: Choice) {
        self.emit(RenderEvent::ShowRevealedCard { seat, choice });
    }

    fn show_result(&mut self, outcome: Outcome, detail: ResultDetail) {
        self.emit(RenderEvent::ShowResult { outcome, detail });
    }

    fn update_score(&mut self, mine: u32, theirs: u32) {
        self.emit(RenderEvent::UpdateScore { mine, theirs });
    }

    fn update_timer(&mut self, remaining: u64, urgency: TickUrgency) {
        self.emit(RenderEvent::UpdateTimer { remaining, urgency });
    }

    fn match_over(&mut self, verdict: MatchVerdict) {
        self.emit(RenderEvent::MatchOver { verdict });
    }

    fn connection_lost(&mut self) {
        self.emit(RenderEvent::ConnectionLost);
    }
}

/// One side of a ready-to-run match fixture.
pub struct FixtureSide {
    pub session: MatchSession<MemoryTransport, RecordingRenderer>,
    pub log: RenderLog,
    pub cues: mpsc::UnboundedReceiver<RenderEvent>,
}

/// A connected host/guest pair over the in-memory transport, both with
/// recording renderers and live cue feeds.
pub fn paired_match(config: MatchConfig) -> (FixtureSide, FixtureSide) {
    let (host_channel, guest_channel) = pair();

    let (host_renderer, host_log, host_cues) = RecordingRenderer::with_cues();
    let (guest_renderer, guest_log, guest_cues) = RecordingRenderer::with_cues();

    let host_profile = PlayerProfile::new("host", PlayerId::from_raw(1111).expect("valid id"));
    let guest_profile = PlayerProfile::new("guest", PlayerId::from_raw(2222).expect("valid id"));

    let host = MatchSession::host(host_profile, host_channel, host_renderer, config.clone())
        .expect("valid host config");
    let guest = MatchSession::guest(guest_profile, guest_channel, guest_renderer, config)
        .expect("valid guest config");

    (
        FixtureSide {
            session: host,
            log: host_log,
            cues: host_cues,
        },
        FixtureSide {
            session: guest,
            log: guest_log,
            cues: guest_cues,
        },
    )
}

/// A headless stand-in for a human at the UI: acks each round banner,
/// submits the scripted pick when the clock starts, and presses
/// continue on each result.
///
/// A `None` pick sits the round out (the player goes silent and the
/// round timer decides). After a round nobody played, the player stays
/// silent on the result too, leaving advancement to the session's
/// auto-continue.
pub struct ScriptedPlayer {
    picks: Vec<Option<Choice>>,
}

impl ScriptedPlayer {
    pub fn new(picks: Vec<Option<Choice>>) -> Self {
        Self { picks }
    }

    /// Play the same pick every round.
    pub fn always(choice: Choice, rounds: usize) -> Self {
        Self {
            picks: vec![Some(choice); rounds],
        }
    }

    /// React to cues until the match ends or the cue feed closes.
    pub async fn drive(
        self,
        mut cues: mpsc::UnboundedReceiver<RenderEvent>,
        actions: mpsc::UnboundedSender<PlayerAction>,
    ) {
        let mut current_round = 0usize;
        let mut submitted = true;
        while let Some(cue) = cues.recv().await {
            match cue {
                RenderEvent::ShowRound { round, .. } => {
                    current_round = round as usize;
                    submitted = false;
                    let _ = actions.send(PlayerAction::ScreenReady);
                }
                RenderEvent::UpdateTimer { .. } if !submitted => {
                    submitted = true;
                    if let Some(Some(choice)) =
                        self.picks.get(current_round.saturating_sub(1)).copied()
                    {
                        let _ = actions.send(PlayerAction::Submit(choice));
                    }
                }
                RenderEvent::ShowResult { detail, .. } => {
                    if !matches!(detail, ResultDetail::BothTimedOut) {
                        let _ = actions.send(PlayerAction::Continue);
                    }
                }
                RenderEvent::MatchOver { .. } | RenderEvent::ConnectionLost => return,
                _ => {}
            }
        }
    }
}
