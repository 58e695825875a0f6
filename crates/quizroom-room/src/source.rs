//! The question source seam.

use std::future::Future;

use quizroom_protocol::Question;

/// Why a quiz could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The request never produced a response (connect failure, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("provider returned status {0}")]
    Status(u16),

    /// The response body was not the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The provider returned no questions.
    #[error("provider returned an empty quiz")]
    Empty,
}

/// Produces an ordered question set for a topic and difficulty.
///
/// The coordinator calls `fetch` outside every lock, so a slow provider
/// only delays the start that asked for it.
pub trait QuestionSource: Send + Sync + 'static {
    fn fetch(
        &self,
        area: &str,
        level: &str,
    ) -> impl Future<Output = Result<Vec<Question>, SourceError>> + Send;
}
