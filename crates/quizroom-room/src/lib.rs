//! Trivia room coordination for Quizroom.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! roster and current round. Every join, submission and deadline goes
//! through the room's queue, which is what lets a room report its
//! results exactly once.
//!
//! # Key types
//!
//! - [`Coordinator`]: join, start, submit and clear; the entry point
//! - [`RoomRegistry`]: room id → running room
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`QuestionSource`]: where quizzes come from
//! - [`format_results`]: per-player answers → per-question results
//! - [`RoomState`]: lifecycle state machine
//! - [`RoomConfig`]: countdown and queue size

mod config;
mod coordinator;
mod error;
mod registry;
mod results;
mod room;
mod source;
mod state;

pub use config::{DEFAULT_CHANNEL_SIZE, DEFAULT_COUNTDOWN, RoomConfig, RoomState};
pub use coordinator::{Coordinator, StartRequest};
pub use error::RoomError;
pub use registry::{RoomRegistry, generate_room_id};
pub use results::{DEFAULT_QUESTION_COUNT, format_results};
pub use room::{RoomHandle, RoomInfo};
pub use source::{QuestionSource, SourceError};
pub use state::{JoinOutcome, RoundSetup, RoundStarted, SubmitOutcome};
