//! Codec trait and the JSON implementation.
//!
//! The connection handler only needs "something that turns events into
//! bytes and back", so it is written against [`Codec`]. [`JsonCodec`] is
//! the only implementation today; browser clients speak JSON.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to frame bytes and decodes them back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task on the runtime.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into frame bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value cannot be
    /// represented in this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes frame bytes into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or do
    /// not match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use quizroom_protocol::{ClientEvent, Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let frame = br#"{"event":"join-room","args":["R1","alice"]}"#;
///
/// let event: ClientEvent = codec.decode(frame).unwrap();
/// assert_eq!(event, ClientEvent::JoinRoom(RoomId::new("R1"), "alice".into()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
