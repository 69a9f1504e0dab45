//! Match session state machine.
//!
//! Drives the local [`MatchState`] from three event sources: inbound
//! peer messages, local player actions, and timer expiry. Each handler
//! runs to completion before the next event is processed, so the state
//! needs no locking; agreement with the peer comes entirely from the
//! message protocol.
//!
//! The two roles are asymmetric on purpose. Only the Host may turn
//! "both screens ready" into a running round, which keeps the two
//! clients' timers from free-running independently. Everything else is
//! symmetric and level-triggered: flags are re-checked from current
//! state, so redundant or stale messages fall through harmlessly.

use std::time::Duration;

use tokio::sync::mpsc;

use swg_core::{resolve, Choice, MatchState, Outcome, PlayerId, PlayerProfile, Side};

use crate::error::Result;
use crate::messages::PeerMessage;
use crate::render::{MatchVerdict, Renderer, ResultDetail, Seat};
use crate::timer::{RoundTimer, TickUrgency, TimerEvent};
use crate::transport::{ChannelEvent, Transport};

/// Tunables for a match session.
///
/// The delay fields pace UI transitions only; shortening them (tests
/// zero them) changes feel, not correctness.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Rounds per match. Authoritative on the Host; a Guest's value is
    /// a default until the host's profile arrives.
    pub total_rounds: u32,
    /// Length of each round's choice window.
    pub round_duration: Duration,
    /// Wait after the profile exchange before round 1's handshake.
    pub connect_settle: Duration,
    /// Wait between revealing cards and announcing the result.
    pub reveal_delay: Duration,
    /// Wait after the continue-rendezvous before the next handshake.
    pub round_settle: Duration,
    /// Wait before auto-continuing a round nobody played.
    pub auto_continue_delay: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            total_rounds: 3,
            round_duration: Duration::from_secs(30),
            connect_settle: Duration::from_millis(1000),
            reveal_delay: Duration::from_millis(800),
            round_settle: Duration::from_millis(500),
            auto_continue_delay: Duration::from_millis(3000),
        }
    }
}

/// Whole-match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Waiting for the profile exchange.
    Connecting,
    /// Rounds are being played.
    InProgress,
    /// All rounds played; verdict announced.
    MatchComplete,
    /// The channel dropped or the local player left. Terminal.
    Disconnected,
}

/// Lifecycle of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Between rounds; nothing is expected yet.
    Idle,
    /// Waiting for both round UIs to report presented.
    AwaitingScreensReady,
    /// The choice window is open and the clock is running.
    AwaitingChoices,
    /// Resolved; cards revealed, result pending display.
    Resolving,
    /// Result shown; waiting on the continue-rendezvous.
    RoundComplete,
}

/// Local user intent fed to the session by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// The round UI is on screen.
    ScreenReady,
    /// Lock in a pick for the current round.
    Submit(Choice),
    /// Vote to continue to the next round.
    Continue,
    /// Leave the match.
    Leave,
}

/// How a session run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEnd {
    /// All rounds played.
    Completed(MatchVerdict),
    /// The channel closed or failed mid-match.
    Disconnected,
    /// The local player left.
    Left,
}

/// Events the session schedules for its own future self.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DelayedEvent {
    /// Connect settle elapsed; start round 1's handshake.
    EnterMatch,
    /// Reveal delay elapsed; announce the result of `round`.
    CompleteRound { round: u32 },
    /// Round settle elapsed; start `round`'s handshake.
    BeginHandshake { round: u32 },
    /// Nobody played `round`; cast the continue vote automatically.
    AutoContinue { round: u32 },
}

/// One owned event, whatever the source.
enum Event {
    Channel(ChannelEvent),
    Timer(TimerEvent),
    Delayed(DelayedEvent),
    Action(Option<PlayerAction>),
}

/// A running match against one remote peer.
///
/// Owns the local [`MatchState`], the transport, the renderer and the
/// round timer. Consume it with [`run`](MatchSession::run).
pub struct MatchSession<T: Transport, R: Renderer> {
    state: MatchState,
    phase: MatchPhase,
    round_phase: RoundPhase,
    profile: PlayerProfile,
    opponent: Option<PlayerProfile>,
    transport: T,
    renderer: R,
    config: MatchConfig,
    timer: Option<RoundTimer>,
    timer_tx: mpsc::UnboundedSender<TimerEvent>,
    timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
    delayed_tx: mpsc::UnboundedSender<DelayedEvent>,
    delayed_rx: mpsc::UnboundedReceiver<DelayedEvent>,
    pending_result: Option<(Outcome, ResultDetail)>,
}

impl<T: Transport, R: Renderer> MatchSession<T, R> {
    /// Create the hosting side. `config.total_rounds` is authoritative
    /// and will be announced in the profile message.
    pub fn host(
        profile: PlayerProfile,
        transport: T,
        renderer: R,
        config: MatchConfig,
    ) -> Result<Self> {
        Self::new(Side::Host, profile, transport, renderer, config)
    }

    /// Create the joining side. The round count is a local default
    /// until the host's profile arrives.
    pub fn guest(
        profile: PlayerProfile,
        transport: T,
        renderer: R,
        config: MatchConfig,
    ) -> Result<Self> {
        Self::new(Side::Guest, profile, transport, renderer, config)
    }

    fn new(
        side: Side,
        profile: PlayerProfile,
        transport: T,
        renderer: R,
        config: MatchConfig,
    ) -> Result<Self> {
        let state = MatchState::new(side, config.total_rounds)?;
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (delayed_tx, delayed_rx) = mpsc::unbounded_channel();
        Ok(Self {
            state,
            phase: MatchPhase::Connecting,
            round_phase: RoundPhase::Idle,
            profile,
            opponent: None,
            transport,
            renderer,
            config,
            timer: None,
            timer_tx,
            timer_rx,
            delayed_tx,
            delayed_rx,
            pending_result: None,
        })
    }

    /// The local view of the match.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn round_phase(&self) -> RoundPhase {
        self.round_phase
    }

    /// The peer's identity, once the profile exchange happened.
    pub fn opponent(&self) -> Option<&PlayerProfile> {
        self.opponent.as_ref()
    }

    /// Drive the match to its end.
    ///
    /// Selects over transport events, timer events, self-scheduled
    /// delays, and the `actions` feed from the UI. Never panics and
    /// never returns an error: channel failure collapses into
    /// [`MatchEnd::Disconnected`] after a single `connection_lost`
    /// callback.
    pub async fn run(mut self, mut actions: mpsc::UnboundedReceiver<PlayerAction>) -> MatchEnd {
        loop {
            let event = {
                let transport = &mut self.transport;
                let timer_rx = &mut self.timer_rx;
                let delayed_rx = &mut self.delayed_rx;
                // Biased: drain our own scheduled continuations and the
                // clock before new channel traffic, so a close arriving
                // together with a pending resolution cannot cancel it.
                tokio::select! {
                    biased;
                    Some(ev) = delayed_rx.recv() => Event::Delayed(ev),
                    Some(ev) = timer_rx.recv() => Event::Timer(ev),
                    ev = transport.next_event() => Event::Channel(ev),
                    action = actions.recv() => Event::Action(action),
                }
            };
            match self.dispatch(event).await {
                Ok(None) => {}
                Ok(Some(end)) => return end,
                Err(err) => {
                    tracing::warn!(error = %err, "channel failure, abandoning match");
                    return self.fail_match().await;
                }
            }
        }
    }

    async fn dispatch(&mut self, event: Event) -> Result<Option<MatchEnd>> {
        match event {
            Event::Channel(ChannelEvent::Open) => {
                self.handle_open().await?;
                Ok(None)
            }
            Event::Channel(ChannelEvent::Frame(frame)) => {
                self.handle_frame(&frame).await?;
                Ok(None)
            }
            Event::Channel(ChannelEvent::Closed) => Ok(Some(self.fail_match().await)),
            Event::Channel(ChannelEvent::Error(reason)) => {
                tracing::warn!(%reason, "channel error");
                Ok(Some(self.fail_match().await))
            }
            Event::Timer(ev) => {
                self.handle_timer(ev);
                Ok(None)
            }
            Event::Delayed(ev) => self.handle_delayed(ev).await,
            Event::Action(Some(action)) => self.handle_action(action).await,
            // The UI went away; treat it as leaving.
            Event::Action(None) => Ok(Some(self.leave().await)),
        }
    }

    // ── Channel events ───────────────────────────────────────────────

    async fn handle_open(&mut self) -> Result<()> {
        if self.phase != MatchPhase::Connecting {
            return Ok(());
        }
        tracing::debug!(side = ?self.state.side, "channel open, sending profile");
        let total_rounds = self
            .state
            .side
            .is_host()
            .then_some(self.state.total_rounds);
        self.send(PeerMessage::Profile {
            name: self.profile.name.clone(),
            id: self.profile.id,
            total_rounds,
        })
        .await
    }

    async fn handle_frame(&mut self, frame: &str) -> Result<()> {
        let message = match PeerMessage::decode(frame) {
            Ok(message) => message,
            Err(err) => {
                // Unknown types and junk never crash the machine.
                tracing::debug!(%err, "ignoring malformed frame");
                return Ok(());
            }
        };
        tracing::trace!(?message, "inbound");
        match message {
            PeerMessage::Profile {
                name,
                id,
                total_rounds,
            } => {
                self.on_profile(name, id, total_rounds);
                Ok(())
            }
            PeerMessage::ScreenReady => {
                self.state.opponent_screen_ready = true;
                self.try_start_round().await
            }
            PeerMessage::StartRound => {
                self.on_start_round();
                Ok(())
            }
            PeerMessage::Choice { choice } => {
                self.on_peer_choice(choice);
                Ok(())
            }
            // `ready` is the legacy spelling of the same vote.
            PeerMessage::Ready | PeerMessage::PlayAgainReady => {
                self.state.opponent_play_again_ready = true;
                self.try_advance();
                Ok(())
            }
        }
    }

    fn on_profile(&mut self, name: String, id: PlayerId, total_rounds: Option<u32>) {
        if self.phase != MatchPhase::Connecting || self.opponent.is_some() {
            tracing::debug!("ignoring duplicate profile");
            return;
        }
        if let Some(n) = total_rounds {
            self.state.adopt_total_rounds(n);
        }
        let profile = PlayerProfile::new(name, id);
        self.renderer.opponent_joined(&profile);
        self.opponent = Some(profile);
        // No agreement step: both sides assume symmetric progress once
        // profiles are exchanged.
        self.schedule(self.config.connect_settle, DelayedEvent::EnterMatch);
    }

    fn on_start_round(&mut self) {
        if self.state.side.is_host() {
            tracing::debug!("ignoring start-round: we are the host");
            return;
        }
        if self.phase != MatchPhase::InProgress
            || self.round_phase != RoundPhase::AwaitingScreensReady
        {
            tracing::debug!(phase = ?self.round_phase, "ignoring start-round in this phase");
            return;
        }
        self.open_choice_window();
    }

    fn on_peer_choice(&mut self, choice: Choice) {
        if self.phase != MatchPhase::InProgress || self.round_phase != RoundPhase::AwaitingChoices
        {
            // In-flight choices can outlive their round; drop them.
            tracing::debug!("ignoring choice outside the choice window");
            return;
        }
        if self.state.opponent_choice.is_some() {
            tracing::debug!("ignoring duplicate choice");
            return;
        }
        self.state.opponent_choice = Some(choice);
        self.renderer.choice_locked(Seat::Theirs);
        self.try_resolve();
    }

    // ── Local actions ────────────────────────────────────────────────

    async fn handle_action(&mut self, action: PlayerAction) -> Result<Option<MatchEnd>> {
        match action {
            PlayerAction::ScreenReady => {
                if self.phase == MatchPhase::InProgress
                    && matches!(
                        self.round_phase,
                        RoundPhase::Idle | RoundPhase::AwaitingScreensReady
                    )
                    && !self.state.round_ready
                {
                    self.state.round_ready = true;
                    self.send(PeerMessage::ScreenReady).await?;
                    self.try_start_round().await?;
                }
                Ok(None)
            }
            PlayerAction::Submit(choice) => {
                self.submit_choice(choice).await?;
                Ok(None)
            }
            PlayerAction::Continue => {
                if self.phase == MatchPhase::InProgress
                    && matches!(
                        self.round_phase,
                        RoundPhase::Resolving | RoundPhase::RoundComplete
                    )
                    && !self.state.play_again_ready
                {
                    self.cast_continue_vote().await?;
                }
                Ok(None)
            }
            PlayerAction::Leave => Ok(Some(self.leave().await)),
        }
    }

    async fn submit_choice(&mut self, choice: Choice) -> Result<()> {
        if self.phase != MatchPhase::InProgress || self.round_phase != RoundPhase::AwaitingChoices
        {
            return Ok(());
        }
        if self.state.my_choice.is_some() {
            // Double submission: local no-op, never sent to the peer.
            return Ok(());
        }
        self.state.my_choice = Some(choice);
        self.renderer.choice_locked(Seat::Mine);
        self.send(PeerMessage::Choice { choice }).await?;
        self.try_resolve();
        Ok(())
    }

    async fn cast_continue_vote(&mut self) -> Result<()> {
        self.state.play_again_ready = true;
        self.send(PeerMessage::PlayAgainReady).await?;
        self.try_advance();
        Ok(())
    }

    // ── Round start ──────────────────────────────────────────────────

    /// The one predicate behind every host-only start decision.
    fn can_start_round(&self) -> bool {
        self.state.side.is_host()
            && self.phase == MatchPhase::InProgress
            && self.round_phase == RoundPhase::AwaitingScreensReady
            && self.state.round_ready
            && self.state.opponent_screen_ready
    }

    /// Re-checked from current flags wherever they may have changed, so
    /// redundant screen-ready signals are harmless.
    async fn try_start_round(&mut self) -> Result<()> {
        if !self.can_start_round() {
            return Ok(());
        }
        self.send(PeerMessage::StartRound).await?;
        self.open_choice_window();
        Ok(())
    }

    fn open_choice_window(&mut self) {
        self.state.begin_round();
        self.round_phase = RoundPhase::AwaitingChoices;
        let duration = self.config.round_duration;
        // Replacing the handle cancels any stale countdown.
        self.timer = Some(RoundTimer::start(
            self.state.round,
            duration,
            self.timer_tx.clone(),
        ));
        self.renderer.update_timer(
            duration.as_secs(),
            TickUrgency::for_remaining(duration.as_secs()),
        );
    }

    // ── Resolution ───────────────────────────────────────────────────

    fn try_resolve(&mut self) {
        if self.round_phase != RoundPhase::AwaitingChoices {
            return;
        }
        let Some((mine, theirs)) = self.state.choices() else {
            return;
        };
        self.cancel_timer();
        let outcome = resolve(mine, theirs);
        let detail = match outcome {
            Outcome::Draw => ResultDetail::Mirror(mine),
            Outcome::Win => ResultDetail::Beats {
                winner: mine,
                loser: theirs,
            },
            Outcome::Lose => ResultDetail::Beats {
                winner: theirs,
                loser: mine,
            },
        };
        self.renderer.show_revealed_card(Seat::Mine, mine);
        self.renderer.show_revealed_card(Seat::Theirs, theirs);
        self.finish_round(outcome, detail);
    }

    fn handle_timer(&mut self, event: TimerEvent) {
        let in_window = self.phase == MatchPhase::InProgress
            && self.round_phase == RoundPhase::AwaitingChoices;
        match event {
            TimerEvent::Tick { tag, remaining } => {
                if in_window && tag == self.state.round {
                    self.renderer
                        .update_timer(remaining, TickUrgency::for_remaining(remaining));
                }
            }
            TimerEvent::Expired { tag } => {
                // A queued expiry can arrive after the round resolved
                // or after a disconnect; the guards drop it.
                if !in_window || tag != self.state.round {
                    tracing::debug!(tag, "ignoring stale timer expiry");
                    return;
                }
                self.resolve_by_timeout();
            }
        }
    }

    fn resolve_by_timeout(&mut self) {
        self.timer = None;
        let (outcome, detail) = match (self.state.my_choice, self.state.opponent_choice) {
            // Whoever chose wins outright; the silent side is credited
            // no choice at all.
            (Some(mine), None) => {
                self.renderer.show_revealed_card(Seat::Mine, mine);
                (Outcome::Win, ResultDetail::OpponentTimedOut)
            }
            (None, Some(theirs)) => {
                self.renderer.show_revealed_card(Seat::Theirs, theirs);
                (Outcome::Lose, ResultDetail::LocalTimedOut)
            }
            // Forced draw. The default card is display only; nobody
            // scores.
            (None, None) => {
                self.renderer
                    .show_revealed_card(Seat::Mine, Choice::DEFAULT_DISPLAY);
                self.renderer
                    .show_revealed_card(Seat::Theirs, Choice::DEFAULT_DISPLAY);
                (Outcome::Draw, ResultDetail::BothTimedOut)
            }
            // Both in means try_resolve already owns this round.
            (Some(_), Some(_)) => return,
        };
        self.finish_round(outcome, detail);
    }

    fn finish_round(&mut self, outcome: Outcome, detail: ResultDetail) {
        if !self.state.apply_outcome(outcome) {
            return;
        }
        self.renderer
            .update_score(self.state.my_score, self.state.opponent_score);
        self.round_phase = RoundPhase::Resolving;
        self.pending_result = Some((outcome, detail));
        self.schedule(
            self.config.reveal_delay,
            DelayedEvent::CompleteRound {
                round: self.state.round,
            },
        );
    }

    // ── Scheduled continuations ──────────────────────────────────────

    async fn handle_delayed(&mut self, event: DelayedEvent) -> Result<Option<MatchEnd>> {
        match event {
            DelayedEvent::EnterMatch => {
                if self.phase == MatchPhase::Connecting && self.opponent.is_some() {
                    self.phase = MatchPhase::InProgress;
                    self.renderer.update_score(0, 0);
                    self.enter_round_handshake();
                    self.try_start_round().await?;
                }
                Ok(None)
            }
            DelayedEvent::CompleteRound { round } => self.complete_round(round).await,
            DelayedEvent::BeginHandshake { round } => {
                if self.phase == MatchPhase::InProgress
                    && self.state.round == round
                    && self.round_phase == RoundPhase::Idle
                {
                    self.enter_round_handshake();
                    self.try_start_round().await?;
                }
                Ok(None)
            }
            DelayedEvent::AutoContinue { round } => {
                if self.phase == MatchPhase::InProgress
                    && self.state.round == round
                    && self.round_phase == RoundPhase::RoundComplete
                    && !self.state.play_again_ready
                {
                    self.cast_continue_vote().await?;
                }
                Ok(None)
            }
        }
    }

    fn enter_round_handshake(&mut self) {
        self.round_phase = RoundPhase::AwaitingScreensReady;
        self.renderer
            .show_round(self.state.round, self.state.total_rounds);
        self.renderer.show_waiting_card(Seat::Mine);
        self.renderer.show_waiting_card(Seat::Theirs);
    }

    async fn complete_round(&mut self, round: u32) -> Result<Option<MatchEnd>> {
        if self.phase != MatchPhase::InProgress
            || self.state.round != round
            || self.round_phase != RoundPhase::Resolving
        {
            return Ok(None);
        }
        let Some((outcome, detail)) = self.pending_result.take() else {
            return Ok(None);
        };
        self.renderer.show_result(outcome, detail);
        if self.state.is_final_round() {
            return Ok(Some(self.complete_match().await));
        }
        self.round_phase = RoundPhase::RoundComplete;
        if matches!(detail, ResultDetail::BothTimedOut) {
            // Nobody is around to press continue, so cast the vote for
            // them after a grace period.
            self.schedule(
                self.config.auto_continue_delay,
                DelayedEvent::AutoContinue { round },
            );
        }
        self.try_advance();
        Ok(None)
    }

    /// Pure rendezvous: runs after the local vote and after every
    /// inbound vote, and advancing clears both flags, so either arrival
    /// order advances exactly once.
    fn try_advance(&mut self) {
        if self.round_phase != RoundPhase::RoundComplete {
            return;
        }
        if !(self.state.play_again_ready && self.state.opponent_play_again_ready) {
            return;
        }
        if !self.state.advance_round() {
            return;
        }
        self.pending_result = None;
        self.round_phase = RoundPhase::Idle;
        self.schedule(
            self.config.round_settle,
            DelayedEvent::BeginHandshake {
                round: self.state.round,
            },
        );
    }

    // ── Match end ────────────────────────────────────────────────────

    async fn complete_match(&mut self) -> MatchEnd {
        self.phase = MatchPhase::MatchComplete;
        self.cancel_timer();
        let verdict = MatchVerdict {
            outcome: self.state.final_outcome(),
            my_score: self.state.my_score,
            opponent_score: self.state.opponent_score,
        };
        self.renderer.match_over(verdict);
        self.transport.close().await;
        MatchEnd::Completed(verdict)
    }

    async fn fail_match(&mut self) -> MatchEnd {
        self.cancel_timer();
        self.transport.close().await;
        if self.phase != MatchPhase::Disconnected {
            self.phase = MatchPhase::Disconnected;
            self.renderer.connection_lost();
        }
        MatchEnd::Disconnected
    }

    async fn leave(&mut self) -> MatchEnd {
        self.cancel_timer();
        self.transport.close().await;
        self.phase = MatchPhase::Disconnected;
        MatchEnd::Left
    }

    // ── Plumbing ─────────────────────────────────────────────────────

    async fn send(&mut self, message: PeerMessage) -> Result<()> {
        let frame = message.encode()?;
        tracing::trace!(?message, "outbound");
        self.transport.send(frame).await
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }

    fn schedule(&self, after: Duration, event: DelayedEvent) {
        let tx = self.delayed_tx.clone();
        if after.is_zero() {
            let _ = tx.send(event);
            return;
        }
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(event);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullRenderer;
    use crate::transport::memory::{pair, MemoryTransport};

    type TestSession = MatchSession<MemoryTransport, NullRenderer>;

    fn config() -> MatchConfig {
        MatchConfig {
            total_rounds: 3,
            round_duration: Duration::from_secs(30),
            connect_settle: Duration::ZERO,
            reveal_delay: Duration::ZERO,
            round_settle: Duration::ZERO,
            auto_continue_delay: Duration::ZERO,
        }
    }

    fn profile(raw: u16) -> PlayerProfile {
        PlayerProfile::new("", PlayerId::from_raw(raw).unwrap())
    }

    fn host_session(config: MatchConfig) -> (TestSession, MemoryTransport) {
        let (ours, theirs) = pair();
        let session = MatchSession::host(profile(1111), ours, NullRenderer, config).unwrap();
        (session, theirs)
    }

    fn guest_session(config: MatchConfig) -> (TestSession, MemoryTransport) {
        let (ours, theirs) = pair();
        let session = MatchSession::guest(profile(1111), ours, NullRenderer, config).unwrap();
        (session, theirs)
    }

    /// Process everything the session scheduled for itself (all delays
    /// are zero in tests, so scheduled events are already queued).
    async fn pump(session: &mut TestSession) -> Option<MatchEnd> {
        let mut end = None;
        while let Ok(ev) = session.delayed_rx.try_recv() {
            if let Some(e) = session.handle_delayed(ev).await.unwrap() {
                end = Some(e);
            }
        }
        end
    }

    async fn feed(session: &mut TestSession, message: PeerMessage) {
        let frame = message.encode().unwrap();
        session.handle_frame(&frame).await.unwrap();
    }

    /// Open the channel and exchange profiles; `rounds_from_peer` is
    /// set when the peer plays the host role.
    async fn connect(session: &mut TestSession, rounds_from_peer: Option<u32>) {
        session
            .dispatch(Event::Channel(ChannelEvent::Open))
            .await
            .unwrap();
        feed(
            session,
            PeerMessage::Profile {
                name: "peer".into(),
                id: PlayerId::from_raw(2222).unwrap(),
                total_rounds: rounds_from_peer,
            },
        )
        .await;
        pump(session).await;
    }

    /// Next frame the peer end would see, decoded.
    async fn next_frame(probe: &mut MemoryTransport) -> PeerMessage {
        loop {
            match probe.next_event().await {
                ChannelEvent::Open => continue,
                ChannelEvent::Frame(frame) => return PeerMessage::decode(&frame).unwrap(),
                other => panic!("unexpected channel event: {other:?}"),
            }
        }
    }

    /// Drive a connected host into the round's choice window.
    async fn open_window_as_host(session: &mut TestSession) {
        session
            .handle_action(PlayerAction::ScreenReady)
            .await
            .unwrap();
        feed(session, PeerMessage::ScreenReady).await;
        assert_eq!(session.round_phase(), RoundPhase::AwaitingChoices);
    }

    #[tokio::test]
    async fn test_host_starts_only_when_both_screens_ready() {
        let (mut session, mut probe) = host_session(config());
        connect(&mut session, None).await;
        assert_eq!(session.phase(), MatchPhase::InProgress);
        assert_eq!(session.round_phase(), RoundPhase::AwaitingScreensReady);

        // Local screen alone is not enough.
        session
            .handle_action(PlayerAction::ScreenReady)
            .await
            .unwrap();
        assert_eq!(session.round_phase(), RoundPhase::AwaitingScreensReady);

        // Peer's screen-ready completes the condition.
        feed(&mut session, PeerMessage::ScreenReady).await;
        assert_eq!(session.round_phase(), RoundPhase::AwaitingChoices);
        assert!(session.state().is_resolving);

        // The wire saw exactly: profile, screen-ready, start-round.
        assert!(matches!(
            next_frame(&mut probe).await,
            PeerMessage::Profile {
                total_rounds: Some(3),
                ..
            }
        ));
        assert_eq!(next_frame(&mut probe).await, PeerMessage::ScreenReady);
        assert_eq!(next_frame(&mut probe).await, PeerMessage::StartRound);
    }

    #[tokio::test]
    async fn test_guest_never_self_starts() {
        let (mut session, _probe) = guest_session(config());
        connect(&mut session, Some(3)).await;

        session
            .handle_action(PlayerAction::ScreenReady)
            .await
            .unwrap();
        feed(&mut session, PeerMessage::ScreenReady).await;
        // Both flags true, but only start-round may open the window.
        assert_eq!(session.round_phase(), RoundPhase::AwaitingScreensReady);

        feed(&mut session, PeerMessage::StartRound).await;
        assert_eq!(session.round_phase(), RoundPhase::AwaitingChoices);
    }

    #[tokio::test]
    async fn test_host_ignores_start_round() {
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;
        feed(&mut session, PeerMessage::StartRound).await;
        assert_eq!(session.round_phase(), RoundPhase::AwaitingScreensReady);
    }

    #[tokio::test]
    async fn test_guest_adopts_host_round_count() {
        let (mut session, _probe) = guest_session(config());
        connect(&mut session, Some(5)).await;
        assert_eq!(session.state().total_rounds, 5);

        let (mut host, _probe) = host_session(config());
        connect(&mut host, Some(7)).await;
        assert_eq!(host.state().total_rounds, 3);
    }

    #[tokio::test]
    async fn test_resolution_by_choices() {
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;

        session
            .handle_action(PlayerAction::Submit(Choice::Snake))
            .await
            .unwrap();
        assert_eq!(session.state().my_choice, Some(Choice::Snake));
        assert_eq!(session.round_phase(), RoundPhase::AwaitingChoices);

        feed(
            &mut session,
            PeerMessage::Choice {
                choice: Choice::Water,
            },
        )
        .await;

        // Snake beats water: local point, choices cleared, round resolved.
        assert_eq!(session.state().my_score, 1);
        assert_eq!(session.state().opponent_score, 0);
        assert_eq!(session.state().my_choice, None);
        assert_eq!(session.state().opponent_choice, None);
        assert!(!session.state().is_resolving);
        assert_eq!(session.round_phase(), RoundPhase::Resolving);

        assert_eq!(pump(&mut session).await, None);
        assert_eq!(session.round_phase(), RoundPhase::RoundComplete);
    }

    #[tokio::test]
    async fn test_double_submission_is_local_noop() {
        let (mut session, mut probe) = host_session(config());
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;

        session
            .handle_action(PlayerAction::Submit(Choice::Snake))
            .await
            .unwrap();
        session
            .handle_action(PlayerAction::Submit(Choice::Gun))
            .await
            .unwrap();
        assert_eq!(session.state().my_choice, Some(Choice::Snake));

        // profile, screen-ready, start-round, then exactly one choice.
        let mut choices = 0;
        for _ in 0..4 {
            if matches!(next_frame(&mut probe).await, PeerMessage::Choice { .. }) {
                choices += 1;
            }
        }
        assert_eq!(choices, 1);
    }

    #[tokio::test]
    async fn test_choice_after_resolution_ignored() {
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;

        session
            .handle_action(PlayerAction::Submit(Choice::Water))
            .await
            .unwrap();
        feed(
            &mut session,
            PeerMessage::Choice {
                choice: Choice::Water,
            },
        )
        .await;
        assert_eq!(session.round_phase(), RoundPhase::Resolving);

        // A straggler choice changes nothing.
        feed(
            &mut session,
            PeerMessage::Choice {
                choice: Choice::Gun,
            },
        )
        .await;
        assert_eq!(session.state().opponent_choice, None);
        assert_eq!(session.state().my_score, 0);
        assert_eq!(session.state().opponent_score, 0);
    }

    #[tokio::test]
    async fn test_late_expiry_does_not_double_resolve() {
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;

        session
            .handle_action(PlayerAction::Submit(Choice::Gun))
            .await
            .unwrap();
        feed(
            &mut session,
            PeerMessage::Choice {
                choice: Choice::Snake,
            },
        )
        .await;
        assert_eq!(session.state().my_score, 1);

        // The expiry that was queued before cancellation lands late.
        session.handle_timer(TimerEvent::Expired { tag: 1 });
        assert_eq!(session.state().my_score, 1);
        assert_eq!(session.state().opponent_score, 0);
    }

    #[tokio::test]
    async fn test_timeout_whoever_chose_wins() {
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;

        session
            .handle_action(PlayerAction::Submit(Choice::Water))
            .await
            .unwrap();
        session.handle_timer(TimerEvent::Expired { tag: 1 });

        assert_eq!(session.state().my_score, 1);
        assert_eq!(session.state().opponent_score, 0);
        assert_eq!(session.round_phase(), RoundPhase::Resolving);
    }

    #[tokio::test]
    async fn test_timeout_silent_side_loses() {
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;

        feed(
            &mut session,
            PeerMessage::Choice {
                choice: Choice::Gun,
            },
        )
        .await;
        session.handle_timer(TimerEvent::Expired { tag: 1 });

        assert_eq!(session.state().my_score, 0);
        assert_eq!(session.state().opponent_score, 1);
    }

    #[tokio::test]
    async fn test_timeout_neither_chose_forced_draw_auto_continues() {
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;

        session.handle_timer(TimerEvent::Expired { tag: 1 });
        assert_eq!(session.state().my_score, 0);
        assert_eq!(session.state().opponent_score, 0);

        // CompleteRound, then the auto-continue vote fires.
        pump(&mut session).await;
        assert_eq!(session.round_phase(), RoundPhase::RoundComplete);
        assert!(session.state().play_again_ready);

        // Peer's vote arrives; both sides advance.
        feed(&mut session, PeerMessage::PlayAgainReady).await;
        assert_eq!(session.state().round, 2);
        pump(&mut session).await;
        assert_eq!(session.round_phase(), RoundPhase::AwaitingScreensReady);
        assert!(!session.state().play_again_ready);
        assert!(!session.state().opponent_play_again_ready);
    }

    #[tokio::test]
    async fn test_continue_rendezvous_either_order_exactly_once() {
        // Local vote first.
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;
        session
            .handle_action(PlayerAction::Submit(Choice::Snake))
            .await
            .unwrap();
        feed(
            &mut session,
            PeerMessage::Choice {
                choice: Choice::Snake,
            },
        )
        .await;
        pump(&mut session).await;
        session.handle_action(PlayerAction::Continue).await.unwrap();
        assert_eq!(session.state().round, 1);
        feed(&mut session, PeerMessage::PlayAgainReady).await;
        assert_eq!(session.state().round, 2);

        // Peer vote first.
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;
        session
            .handle_action(PlayerAction::Submit(Choice::Snake))
            .await
            .unwrap();
        feed(
            &mut session,
            PeerMessage::Choice {
                choice: Choice::Snake,
            },
        )
        .await;
        feed(&mut session, PeerMessage::PlayAgainReady).await;
        pump(&mut session).await;
        assert_eq!(session.state().round, 1);
        session.handle_action(PlayerAction::Continue).await.unwrap();
        assert_eq!(session.state().round, 2);

        // A duplicate vote after advancing must not advance again.
        feed(&mut session, PeerMessage::PlayAgainReady).await;
        assert_eq!(session.state().round, 2);
    }

    #[tokio::test]
    async fn test_ready_counts_as_continue_vote() {
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;
        session
            .handle_action(PlayerAction::Submit(Choice::Water))
            .await
            .unwrap();
        feed(
            &mut session,
            PeerMessage::Choice {
                choice: Choice::Water,
            },
        )
        .await;
        pump(&mut session).await;

        feed(&mut session, PeerMessage::Ready).await;
        assert!(session.state().opponent_play_again_ready);
        session.handle_action(PlayerAction::Continue).await.unwrap();
        assert_eq!(session.state().round, 2);
    }

    #[tokio::test]
    async fn test_junk_frames_are_ignored() {
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;

        session
            .handle_frame(r#"{"type":"emote","value":"wave"}"#)
            .await
            .unwrap();
        session.handle_frame("not json").await.unwrap();
        session.handle_frame("42").await.unwrap();

        assert_eq!(session.phase(), MatchPhase::InProgress);
        assert_eq!(session.round_phase(), RoundPhase::AwaitingScreensReady);
    }

    #[tokio::test]
    async fn test_final_round_completes_match() {
        let mut cfg = config();
        cfg.total_rounds = 1;
        let (mut session, mut probe) = host_session(cfg);
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;

        session
            .handle_action(PlayerAction::Submit(Choice::Gun))
            .await
            .unwrap();
        feed(
            &mut session,
            PeerMessage::Choice {
                choice: Choice::Snake,
            },
        )
        .await;

        let end = pump(&mut session).await;
        assert_eq!(
            end,
            Some(MatchEnd::Completed(MatchVerdict {
                outcome: Outcome::Win,
                my_score: 1,
                opponent_score: 0,
            }))
        );
        assert_eq!(session.phase(), MatchPhase::MatchComplete);

        // No continue-handshake after the final round: the last frames
        // on the wire are start-round and our choice, then the close.
        assert!(matches!(
            next_frame(&mut probe).await,
            PeerMessage::Profile { .. }
        ));
        assert_eq!(next_frame(&mut probe).await, PeerMessage::ScreenReady);
        assert_eq!(next_frame(&mut probe).await, PeerMessage::StartRound);
        assert!(matches!(
            next_frame(&mut probe).await,
            PeerMessage::Choice { .. }
        ));
        assert_eq!(probe.next_event().await, ChannelEvent::Closed);
    }

    #[tokio::test]
    async fn test_disconnect_mid_round_is_terminal() {
        let (mut session, _probe) = host_session(config());
        connect(&mut session, None).await;
        open_window_as_host(&mut session).await;

        let end = session
            .dispatch(Event::Channel(ChannelEvent::Closed))
            .await
            .unwrap();
        assert_eq!(end, Some(MatchEnd::Disconnected));
        assert_eq!(session.phase(), MatchPhase::Disconnected);
        assert!(session.timer.is_none());

        // No score mutation after the drop.
        session.handle_timer(TimerEvent::Expired { tag: 1 });
        assert_eq!(session.state().my_score, 0);
        assert_eq!(session.state().opponent_score, 0);
    }
}
