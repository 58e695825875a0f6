//! Connection sessions and room-scoped broadcast for Quizroom.
//!
//! This crate is the server side of "who is listening to which room":
//!
//! 1. **Sessions**: one per live connection, holding the channel that
//!    feeds the connection's writer task ([`Session`]).
//! 2. **Subscriptions**: which connections hear a room's broadcasts
//!    ([`SessionManager`]).
//! 3. **Delivery**: the [`Broadcaster`] trait the room layer calls, and
//!    [`SessionHub`], the shared implementation used by the server.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← calls Broadcaster::broadcast(room, exclude, event)
//!     ↕
//! Session Layer (this crate)  ← fans events out to subscribed connections
//!     ↕
//! Transport Layer (below)  ← provides ConnectionId; writer tasks send frames
//! ```

mod error;
mod hub;
mod manager;
mod session;

pub use error::SessionError;
pub use hub::{Broadcaster, SessionHub};
pub use manager::SessionManager;
pub use session::{Outbound, OutboundReceiver, Session};
