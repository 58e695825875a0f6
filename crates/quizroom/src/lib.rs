//! # Quizroom
//!
//! Multiplayer trivia rooms over WebSocket, plus a small HTTP API.
//!
//! Participants join a room, one of them starts a round, everyone gets
//! the same questions, and the room broadcasts the results exactly once:
//! as soon as every player has answered, or when the time limit plus a
//! short countdown runs out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizroom::prelude::*;
//!
//! # async fn run() -> Result<(), QuizroomError> {
//! let config = ServerConfig::from_env()?;
//! let source = HttpQuestionSource::new(config.provider.clone())?;
//! let server = QuizServerBuilder::new().config(&config).build(source).await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
pub mod http;
mod server;
mod source;

pub use config::{ConfigError, ProviderConfig, ServerConfig};
pub use error::QuizroomError;
pub use server::{DEFAULT_IDLE_TIMEOUT, QuizServer, QuizServerBuilder};
pub use source::HttpQuestionSource;

pub mod prelude {
    pub use crate::{
        ConfigError, HttpQuestionSource, ProviderConfig, QuizServer, QuizServerBuilder,
        QuizroomError, ServerConfig,
    };
    pub use quizroom_protocol::{
        Answer, ClientEvent, Codec, GameMode, JsonCodec, PlayerState, Question, QuestionResult,
        RoomId, Roster, ServerEvent,
    };
    pub use quizroom_room::{
        Coordinator, JoinOutcome, QuestionSource, RoomConfig, RoomError, RoomInfo, RoomState,
        SourceError, StartRequest, SubmitOutcome,
    };
    pub use quizroom_session::{Broadcaster, SessionHub};
}
