//! Error types for the room layer.

use quizroom_protocol::RoomId;

use crate::SourceError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is in a state that doesn't allow this operation.
    /// For example, starting a round while one is still running.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// The question source could not deal a quiz.
    #[error("question source failed: {0}")]
    Source(#[from] SourceError),
}
