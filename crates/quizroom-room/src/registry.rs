//! Room registry: room id → running room actor.

use std::collections::HashMap;
use std::sync::Arc;

use quizroom_protocol::RoomId;
use quizroom_session::Broadcaster;

use crate::room::spawn_room;
use crate::{RoomConfig, RoomHandle};

/// Issues a fresh, unguessable room id: 128 random bits as lowercase hex.
pub fn generate_room_id() -> RoomId {
    let bytes: [u8; 16] = rand::random();
    RoomId::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}

/// Every live room, keyed by id.
///
/// Rooms are created on first join and live until [`clear_all`]; a
/// finished room stays put so its players can start another round.
///
/// [`clear_all`]: RoomRegistry::clear_all
pub struct RoomRegistry<B: Broadcaster> {
    rooms: HashMap<RoomId, RoomHandle>,
    broadcaster: Arc<B>,
    config: RoomConfig,
}

impl<B: Broadcaster> RoomRegistry<B> {
    /// Creates an empty registry. Every room it spawns shares
    /// `broadcaster` and `config`.
    pub fn new(broadcaster: Arc<B>, config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            broadcaster,
            config,
        }
    }

    /// Returns the room's handle, spawning an empty room if the id is new.
    pub fn get_or_create(&mut self, room_id: &RoomId) -> RoomHandle {
        if let Some(handle) = self.rooms.get(room_id) {
            return handle.clone();
        }

        let handle = spawn_room(
            room_id.clone(),
            self.config.clone(),
            Arc::clone(&self.broadcaster),
        );
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, rooms = self.rooms.len(), "room created");
        handle
    }

    /// Looks up an existing room.
    pub fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(room_id).cloned()
    }

    /// Shuts every room down and empties the registry. Returns how many
    /// rooms were removed.
    pub async fn clear_all(&mut self) -> usize {
        let count = self.rooms.len();
        for (room_id, handle) in self.rooms.drain() {
            if handle.shutdown().await.is_err() {
                tracing::debug!(%room_id, "room already stopped");
            }
        }
        tracing::info!(rooms = count, "all rooms cleared");
        count
    }

    /// Returns the number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if there are no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
