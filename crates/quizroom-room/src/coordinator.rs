//! Room session coordinator: the entry point for every room operation.
//!
//! Connection handlers call into the coordinator; the coordinator finds
//! (or creates) the room and forwards the operation to its actor. The
//! registry lock is only held long enough to look up or insert a handle,
//! and never while a quiz is being fetched.

use std::sync::Arc;

use chrono::Utc;
use quizroom_protocol::{Answer, RoomId};
use quizroom_session::Broadcaster;
use quizroom_transport::ConnectionId;
use tokio::sync::Mutex;

use crate::{
    JoinOutcome, QuestionSource, RoomConfig, RoomError, RoomHandle, RoomInfo, RoomRegistry,
    RoundSetup, RoundStarted, SourceError, SubmitOutcome,
};

/// Parameters of a `startGame` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub room_id: RoomId,
    pub area: String,
    pub level: String,
    pub time_limit_secs: u64,
    /// The connection that asked; it does not receive `quiz-list`.
    pub initiator: Option<ConnectionId>,
}

/// Owns the room registry and the question source.
pub struct Coordinator<S: QuestionSource, B: Broadcaster> {
    registry: Mutex<RoomRegistry<B>>,
    source: Arc<S>,
    admin_secret: Option<String>,
}

impl<S: QuestionSource, B: Broadcaster> Coordinator<S, B> {
    /// Creates a coordinator with an empty registry.
    ///
    /// `admin_secret` gates [`clear_all`](Self::clear_all); with `None`,
    /// clearing is always refused.
    pub fn new(
        source: Arc<S>,
        broadcaster: Arc<B>,
        config: RoomConfig,
        admin_secret: Option<String>,
    ) -> Self {
        Self {
            registry: Mutex::new(RoomRegistry::new(broadcaster, config)),
            source,
            admin_secret,
        }
    }

    /// The question source, shared with the single-player HTTP endpoint.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    async fn room(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.registry
            .lock()
            .await
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Adds `username` to the room, creating the room on first use, and
    /// subscribes `connection` to it. Everyone else in the room receives
    /// the updated roster.
    pub async fn join(
        &self,
        room_id: &RoomId,
        username: &str,
        connection: ConnectionId,
    ) -> Result<JoinOutcome, RoomError> {
        let handle = self.registry.lock().await.get_or_create(room_id);
        handle.join(username, connection).await
    }

    /// Fetches a quiz and starts a round.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] if nobody has joined the room.
    /// - [`RoomError::Source`] if the provider failed or returned no
    ///   questions. The room is left as it was and the start may be
    ///   retried.
    /// - [`RoomError::InvalidState`] if a round is already running.
    pub async fn start(&self, request: StartRequest) -> Result<RoundStarted, RoomError> {
        let handle = self.room(&request.room_id).await?;

        let quiz = match self.source.fetch(&request.area, &request.level).await {
            Ok(quiz) if quiz.is_empty() => Err(SourceError::Empty),
            other => other,
        }
        .inspect_err(|e| {
            tracing::warn!(
                room_id = %request.room_id,
                area = %request.area,
                level = %request.level,
                error = %e,
                "question fetch failed"
            );
        })?;

        let setup = RoundSetup {
            quiz,
            created_at: Utc::now(),
            time_limit_secs: request.time_limit_secs,
            area: request.area,
            level: request.level,
        };
        handle.begin_round(setup, request.initiator).await
    }

    /// Records a player's answers.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room does not exist. Unknown
    /// players, repeats and out-of-round submissions are reported through
    /// [`SubmitOutcome`] instead.
    pub async fn submit_answers(
        &self,
        room_id: &RoomId,
        username: &str,
        answers: Vec<Answer>,
    ) -> Result<SubmitOutcome, RoomError> {
        self.room(room_id).await?.submit(username, answers).await
    }

    /// Wipes every room if `secret` matches the configured admin secret.
    /// Returns `true` if the rooms were cleared.
    pub async fn clear_all(&self, secret: &str) -> bool {
        match &self.admin_secret {
            Some(expected) if expected == secret => {
                self.registry.lock().await.clear_all().await;
                true
            }
            Some(_) => {
                tracing::warn!("clear-all refused: wrong secret");
                false
            }
            None => {
                tracing::warn!("clear-all refused: no admin secret configured");
                false
            }
        }
    }

    /// Snapshot of one room.
    pub async fn room_info(&self, room_id: &RoomId) -> Result<RoomInfo, RoomError> {
        self.room(room_id).await?.get_info().await
    }

    /// Returns the number of rooms.
    pub async fn room_count(&self) -> usize {
        self.registry.lock().await.len()
    }
}
