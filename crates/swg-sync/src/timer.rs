//! Cancellable one-shot round countdown.
//!
//! The timer knows nothing about game rules: it counts seconds down
//! from a duration, reports each tick, and fires expiry at most once.
//! Callers tag each timer so events from a superseded countdown can be
//! recognized and dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Presentation hint derived from the seconds remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickUrgency {
    Calm,
    /// Five seconds or less.
    Warning,
    /// Three seconds or less.
    Danger,
}

impl TickUrgency {
    pub const fn for_remaining(remaining: u64) -> Self {
        match remaining {
            0..=3 => TickUrgency::Danger,
            4..=5 => TickUrgency::Warning,
            _ => TickUrgency::Calm,
        }
    }
}

/// Event reported by a running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; payload is the seconds left.
    Tick { tag: u32, remaining: u64 },
    /// The countdown reached zero before being cancelled. Fires at most
    /// once per timer.
    Expired { tag: u32 },
}

/// Handle to a running countdown.
///
/// Stopping (or dropping) the handle cancels the pending expiry.
/// Cancellation is idempotent; stopping an already-expired timer is a
/// no-op.
pub struct RoundTimer {
    handle: JoinHandle<()>,
}

impl RoundTimer {
    /// Start a countdown that reports into `events`.
    pub fn start(tag: u32, duration: Duration, events: mpsc::UnboundedSender<TimerEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let mut remaining = duration.as_secs();
            if remaining == 0 {
                let _ = events.send(TimerEvent::Expired { tag });
                return;
            }
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                remaining -= 1;
                if events.send(TimerEvent::Tick { tag, remaining }).is_err() {
                    return;
                }
                if remaining == 0 {
                    let _ = events.send(TimerEvent::Expired { tag });
                    return;
                }
            }
        });
        Self { handle }
    }

    /// Cancel the countdown.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
