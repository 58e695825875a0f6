//! The session manager: tracks live connections and their room
//! subscriptions.
//!
//! # Concurrency note
//!
//! `SessionManager` is a plain struct over `HashMap`s. It is shared
//! through [`SessionHub`](crate::SessionHub), which wraps it in a mutex;
//! every method here is short and never awaits, so the lock is never held
//! across a suspension point.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use quizroom_protocol::{RoomId, ServerEvent};
use quizroom_transport::ConnectionId;

use crate::{Outbound, Session, SessionError};

/// Registry of live connections and of which rooms they listen to.
///
/// ## Lifecycle
///
/// ```text
/// register() ──→ join_room() ──→ broadcast()/send_to() ──→ unregister()
///                    ↑  (any number of rooms)                   │
///                    └──────────────────────────────────────────┘
///                        unregister drops every subscription
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    /// All live sessions, keyed by connection.
    sessions: HashMap<ConnectionId, Session>,

    /// Room → subscribed connections. Kept in sync with
    /// `Session::rooms`. Ordered so broadcasts go out in a stable order.
    rooms: HashMap<RoomId, BTreeSet<ConnectionId>>,
}

impl SessionManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection.
    ///
    /// # Errors
    /// [`SessionError::AlreadyRegistered`] if the id is already in use.
    pub fn register(
        &mut self,
        connection: ConnectionId,
        outbound: Outbound,
    ) -> Result<&Session, SessionError> {
        if self.sessions.contains_key(&connection) {
            return Err(SessionError::AlreadyRegistered(connection));
        }
        tracing::debug!(%connection, "session registered");
        Ok(self
            .sessions
            .entry(connection)
            .or_insert_with(|| Session::new(connection, outbound)))
    }

    /// Drops a connection's session and every room subscription it held.
    ///
    /// Room state is untouched: a player whose connection drops stays in
    /// the room's roster and is simply counted as not having answered.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the connection was never registered.
    pub fn unregister(
        &mut self,
        connection: ConnectionId,
    ) -> Result<Session, SessionError> {
        let session = self
            .sessions
            .remove(&connection)
            .ok_or(SessionError::NotFound(connection))?;

        for room_id in &session.rooms {
            if let Some(members) = self.rooms.get_mut(room_id) {
                members.remove(&connection);
                if members.is_empty() {
                    self.rooms.remove(room_id);
                }
            }
        }

        tracing::debug!(
            %connection,
            rooms = session.rooms.len(),
            connected_for = ?session.connected_at.elapsed(),
            "session unregistered"
        );
        Ok(session)
    }

    /// Subscribes a connection to a room's broadcasts.
    ///
    /// Returns `true` if the subscription is new.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the connection has no session.
    pub fn join_room(
        &mut self,
        connection: ConnectionId,
        room_id: &RoomId,
    ) -> Result<bool, SessionError> {
        let session = self
            .sessions
            .get_mut(&connection)
            .ok_or(SessionError::NotFound(connection))?;

        if !session.rooms.insert(room_id.clone()) {
            return Ok(false);
        }
        self.rooms
            .entry(room_id.clone())
            .or_default()
            .insert(connection);
        Ok(true)
    }

    /// Delivers an event to every connection subscribed to `room_id`,
    /// skipping `exclude`.
    ///
    /// Connections whose writer task already exited are skipped. Returns
    /// the number of connections the event was queued for.
    pub fn broadcast(
        &self,
        room_id: &RoomId,
        exclude: Option<ConnectionId>,
        event: Arc<ServerEvent>,
    ) -> usize {
        let Some(members) = self.rooms.get(room_id) else {
            return 0;
        };

        members
            .iter()
            .filter(|connection| Some(**connection) != exclude)
            .filter_map(|connection| self.sessions.get(connection))
            .filter(|session| session.deliver(Arc::clone(&event)))
            .count()
    }

    /// Delivers an event to a single connection.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] if the connection has no session.
    /// - [`SessionError::ChannelClosed`] if its writer task is gone.
    pub fn send_to(
        &self,
        connection: ConnectionId,
        event: Arc<ServerEvent>,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get(&connection)
            .ok_or(SessionError::NotFound(connection))?;
        if session.deliver(event) {
            Ok(())
        } else {
            Err(SessionError::ChannelClosed(connection))
        }
    }

    /// Returns the connections subscribed to a room, in id order.
    pub fn members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Looks up a session by connection.
    pub fn get(&self, connection: &ConnectionId) -> Option<&Session> {
        self.sessions.get(connection)
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
