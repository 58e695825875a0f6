//! Error types for the session layer.

use quizroom_transport::ConnectionId;

/// Errors that can occur while tracking connection sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the connection. Usually the connection
    /// already went away and its session was dropped.
    #[error("session not found for {0}")]
    NotFound(ConnectionId),

    /// A session is already registered under this connection id.
    #[error("{0} already has a session")]
    AlreadyRegistered(ConnectionId),

    /// The connection's writer task is gone, so nothing can be delivered.
    #[error("outbound channel closed for {0}")]
    ChannelClosed(ConnectionId),
}
