//! Shared broadcast hub.
//!
//! [`SessionHub`] is the cloneable handle every connection task and every
//! room actor holds. Rooms only see it through the [`Broadcaster`] trait,
//! which keeps the room crate testable with a recording fake.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quizroom_protocol::{RoomId, ServerEvent};
use quizroom_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::{OutboundReceiver, SessionError, SessionManager};

/// Delivery seam between rooms and connections.
pub trait Broadcaster: Send + Sync + 'static {
    /// Subscribes a connection to a room's broadcasts.
    fn join_room(&self, connection: ConnectionId, room_id: &RoomId);

    /// Sends an event to every subscriber of a room except `exclude`.
    /// Returns how many connections it was queued for.
    fn broadcast(
        &self,
        room_id: &RoomId,
        exclude: Option<ConnectionId>,
        event: ServerEvent,
    ) -> usize;

    /// Sends an event to one connection. Returns `false` if it is gone.
    fn send_to(&self, connection: ConnectionId, event: ServerEvent) -> bool;
}

/// Thread-safe [`SessionManager`] behind a std mutex.
///
/// A std mutex is enough here: no method holds the guard across an
/// `.await`.
#[derive(Debug, Clone, Default)]
pub struct SessionHub {
    inner: Arc<Mutex<SessionManager>>,
}

impl SessionHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionManager> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a connection and returns the queue its writer task
    /// should drain.
    ///
    /// # Errors
    /// [`SessionError::AlreadyRegistered`] if the id is already in use.
    pub fn register(
        &self,
        connection: ConnectionId,
    ) -> Result<OutboundReceiver, SessionError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().register(connection, tx)?;
        Ok(rx)
    }

    /// Drops a connection and its room subscriptions.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the connection was never registered.
    pub fn unregister(&self, connection: ConnectionId) -> Result<(), SessionError> {
        self.lock().unregister(connection).map(|_| ())
    }

    /// Connections subscribed to a room.
    pub fn members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.lock().members(room_id)
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Broadcaster for SessionHub {
    fn join_room(&self, connection: ConnectionId, room_id: &RoomId) {
        if let Err(e) = self.lock().join_room(connection, room_id) {
            tracing::debug!(%connection, room_id = %room_id, error = %e, "subscribe skipped");
        }
    }

    fn broadcast(
        &self,
        room_id: &RoomId,
        exclude: Option<ConnectionId>,
        event: ServerEvent,
    ) -> usize {
        let name = event.name();
        let delivered = self.lock().broadcast(room_id, exclude, Arc::new(event));
        tracing::debug!(room_id = %room_id, event = name, delivered, "broadcast");
        delivered
    }

    fn send_to(&self, connection: ConnectionId, event: ServerEvent) -> bool {
        match self.lock().send_to(connection, Arc::new(event)) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(%connection, error = %e, "direct send dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizroom_protocol::{Roster, ServerEvent};

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_register_returns_live_receiver() {
        let hub = SessionHub::new();
        let mut rx = hub.register(conn(1)).expect("should register");

        assert!(hub.send_to(conn(1), ServerEvent::UserConnected(Roster::new())));
        let event = rx.try_recv().expect("event should be queued");
        assert_eq!(event.name(), "user-connected");
    }

    #[test]
    fn test_broadcast_through_clone_reaches_subscribers() {
        let hub = SessionHub::new();
        let mut rx1 = hub.register(conn(1)).unwrap();
        let mut rx2 = hub.register(conn(2)).unwrap();
        let room = RoomId::new("R1");
        hub.join_room(conn(1), &room);
        hub.join_room(conn(2), &room);

        let other = hub.clone();
        let delivered = other.broadcast(&room, Some(conn(2)), ServerEvent::QuizFinished(vec![]));

        assert_eq!(delivered, 1);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_join_room_unknown_connection_is_ignored() {
        let hub = SessionHub::new();
        let room = RoomId::new("R1");
        hub.join_room(conn(7), &room);
        assert!(hub.members(&room).is_empty());
    }

    #[test]
    fn test_unregister_then_send_to_returns_false() {
        let hub = SessionHub::new();
        let _rx = hub.register(conn(1)).unwrap();
        hub.unregister(conn(1)).unwrap();

        assert!(!hub.send_to(conn(1), ServerEvent::QuizFinished(vec![])));
        assert!(hub.is_empty());
    }
}
