//! Transport abstraction for the peer channel.
//!
//! The session sees a connected point-to-point pipe: ordered delivery,
//! no delivery guarantee, no acknowledgements, one fixed peer. How the
//! channel came to exist (room rendezvous, signaling, ICE) is the
//! implementation's business and happens before the session gets it.

use async_trait::async_trait;

use crate::error::SyncError;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Lifecycle and data events surfaced by a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel is open and the peer is reachable. Reported once.
    Open,
    /// One wire frame from the peer.
    Frame(String),
    /// The peer closed the channel, or it was closed locally.
    Closed,
    /// The channel failed. Terminal, like `Closed`.
    Error(String),
}

/// A point-to-point channel to the single peer of a match.
#[async_trait]
pub trait Transport: Send {
    /// Fire-and-forget send of one wire frame.
    async fn send(&mut self, frame: String) -> Result<()>;

    /// Next lifecycle or data event.
    ///
    /// Must be cancel-safe: the session polls it inside a select and a
    /// cancelled call must not drop a frame. After `Closed` or `Error`
    /// the method keeps returning `Closed`.
    async fn next_event(&mut self) -> ChannelEvent;

    /// Close the channel. Idempotent.
    async fn close(&mut self);
}

/// An in-memory channel pair for tests.
///
/// Frames flow through unbounded tokio channels, so ordering matches
/// send order exactly and nothing is ever dropped while both ends live.
pub mod memory {
    use super::*;
    use tokio::sync::mpsc;

    /// One end of an in-memory channel pair.
    pub struct MemoryTransport {
        tx: Option<mpsc::UnboundedSender<String>>,
        rx: mpsc::UnboundedReceiver<String>,
        opened: bool,
        closed: bool,
    }

    /// Create two connected ends.
    pub fn pair() -> (MemoryTransport, MemoryTransport) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        let a = MemoryTransport {
            tx: Some(a_tx),
            rx: a_rx,
            opened: false,
            closed: false,
        };
        let b = MemoryTransport {
            tx: Some(b_tx),
            rx: b_rx,
            opened: false,
            closed: false,
        };
        (a, b)
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn send(&mut self, frame: String) -> Result<()> {
            let tx = self.tx.as_ref().ok_or(SyncError::ChannelClosed)?;
            tx.send(frame).map_err(|_| SyncError::ChannelClosed)
        }

        async fn next_event(&mut self) -> ChannelEvent {
            if !self.opened {
                self.opened = true;
                return ChannelEvent::Open;
            }
            if self.closed {
                return ChannelEvent::Closed;
            }
            match self.rx.recv().await {
                Some(frame) => ChannelEvent::Frame(frame),
                None => {
                    self.closed = true;
                    ChannelEvent::Closed
                }
            }
        }

        async fn close(&mut self) {
            // Dropping our sender ends the peer's receive stream.
            self.tx = None;
            self.closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::pair;
    use super::*;

    #[tokio::test]
    async fn test_open_then_frames_in_order() {
        let (mut a, mut b) = pair();

        assert_eq!(a.next_event().await, ChannelEvent::Open);
        assert_eq!(b.next_event().await, ChannelEvent::Open);

        a.send("one".into()).await.unwrap();
        a.send("two".into()).await.unwrap();

        assert_eq!(b.next_event().await, ChannelEvent::Frame("one".into()));
        assert_eq!(b.next_event().await, ChannelEvent::Frame("two".into()));
    }

    #[tokio::test]
    async fn test_close_reaches_peer() {
        let (mut a, mut b) = pair();
        assert_eq!(a.next_event().await, ChannelEvent::Open);
        assert_eq!(b.next_event().await, ChannelEvent::Open);

        a.send("last".into()).await.unwrap();
        a.close().await;

        // Frames sent before the close still arrive, then the close.
        assert_eq!(b.next_event().await, ChannelEvent::Frame("last".into()));
        assert_eq!(b.next_event().await, ChannelEvent::Closed);
        assert_eq!(b.next_event().await, ChannelEvent::Closed);
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (mut a, _b) = pair();
        a.close().await;
        assert!(matches!(
            a.send("x".into()).await,
            Err(SyncError::ChannelClosed)
        ));
        assert_eq!(a.next_event().await, ChannelEvent::Open);
        assert_eq!(a.next_event().await, ChannelEvent::Closed);
    }
}
