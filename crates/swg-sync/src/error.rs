//! Error types for the sync module.

use thiserror::Error;

/// Errors that can occur inside the session or its transport.
///
/// None of these cross the session boundary: channel failures collapse
/// into the terminal disconnected state and everything else is absorbed
/// by state checks.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The channel is closed; nothing more can be sent.
    #[error("channel closed")]
    ChannelClosed,

    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// A frame could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Match configuration was rejected.
    #[error(transparent)]
    Config(#[from] swg_core::CoreError),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
