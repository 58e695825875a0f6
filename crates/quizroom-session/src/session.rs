//! Session types: the server's record of one live connection.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use quizroom_protocol::{RoomId, ServerEvent};
use quizroom_transport::ConnectionId;
use tokio::sync::mpsc;

/// Sending half of a connection's outbound queue.
///
/// Events are wrapped in `Arc` so a room broadcast serializes nothing
/// and clones nothing per recipient; the writer task encodes each event
/// once for its own socket.
pub type Outbound = mpsc::UnboundedSender<Arc<ServerEvent>>;

/// Receiving half, owned by the connection's writer task.
pub type OutboundReceiver = mpsc::UnboundedReceiver<Arc<ServerEvent>>;

/// A single live connection.
#[derive(Debug, Clone)]
pub struct Session {
    /// Which connection this session belongs to.
    pub connection_id: ConnectionId,

    /// Queue feeding the connection's writer task.
    pub outbound: Outbound,

    /// Rooms this connection has joined. A connection may sit in several
    /// rooms at once, the same way a socket.io socket can.
    pub rooms: BTreeSet<RoomId>,

    /// When the session was registered.
    pub connected_at: Instant,
}

impl Session {
    pub(crate) fn new(connection_id: ConnectionId, outbound: Outbound) -> Self {
        Self {
            connection_id,
            outbound,
            rooms: BTreeSet::new(),
            connected_at: Instant::now(),
        }
    }

    /// Queues an event for this connection.
    ///
    /// Returns `false` if the writer task has already gone away.
    pub fn deliver(&self, event: Arc<ServerEvent>) -> bool {
        self.outbound.send(event).is_ok()
    }
}
