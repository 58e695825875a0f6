//! Unified error type for the Quizroom server.

use quizroom_protocol::ProtocolError;
use quizroom_room::RoomError;
use quizroom_session::SessionError;
use quizroom_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuizroomError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unknown or duplicate connection).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (not found, invalid state, upstream failure).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Bad or missing configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),

    /// Binding or serving a listener failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::Idle(std::time::Duration::from_secs(300));
        let quizroom_err: QuizroomError = err.into();
        assert!(matches!(quizroom_err, QuizroomError::Transport(_)));
        assert!(quizroom_err.to_string().contains("idle"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let quizroom_err: QuizroomError = err.into();
        assert!(matches!(quizroom_err, QuizroomError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::NotFound(quizroom_transport::ConnectionId::new(3));
        let quizroom_err: QuizroomError = err.into();
        assert!(matches!(quizroom_err, QuizroomError::Session(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(quizroom_protocol::RoomId::new("R1"));
        let quizroom_err: QuizroomError = err.into();
        assert!(matches!(quizroom_err, QuizroomError::Room(_)));
        assert!(quizroom_err.to_string().contains("R1"));
    }

    #[test]
    fn test_from_config_error() {
        let err = ConfigError::Missing("API_URL");
        let quizroom_err: QuizroomError = err.into();
        assert!(matches!(quizroom_err, QuizroomError::Config(_)));
        assert!(quizroom_err.to_string().contains("API_URL"));
    }
}
