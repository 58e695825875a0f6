//! Wire protocol for Quizroom.
//!
//! This crate defines what participants and the server say to each other:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`RoomId`], etc.):
//!   the events that travel over the socket.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those events are
//!   turned into frames and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! Every frame is a JSON object `{"event": <name>, "args": [...]}`. The
//! positional `args` keep the payload order that existing trivia clients
//! rely on.
//!
//! ```text
//! Transport (frames) → Protocol (events) → Room (coordinator)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    Answer, ClientEvent, GameMode, PlayerState, Question, QuestionResult,
    RoomId, Roster, ServerEvent,
};
