//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means a frame could not be turned into an
//! event (or back), never that the room or connection is at fault.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an event failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame is malformed, names an unknown event, or carries
    /// arguments of the wrong shape.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but breaks a protocol rule (for example an
    /// empty username).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
