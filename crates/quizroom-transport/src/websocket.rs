//! WebSocket transport implementation using `tokio-tungstenite`.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<TcpStream>;

fn io_error(
    kind: ErrorKind,
    err: tokio_tungstenite::tungstenite::Error,
) -> std::io::Error {
    std::io::Error::new(kind, err)
}

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let ws = tokio_tungstenite::accept_async(stream).await.map_err(|e| {
            TransportError::AcceptFailed(io_error(
                ErrorKind::ConnectionRefused,
                e,
            ))
        })?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(connection = %id, %peer, "accepted WebSocket connection");

        let (sink, source) = ws.split();
        Ok(WebSocketConnection {
            id,
            peer,
            sink: Mutex::new(sink),
            source: Mutex::new(source),
        })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// A single WebSocket connection.
///
/// The socket is split so that a writer task can push events while the
/// connection handler is parked in [`recv`](Connection::recv).
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    sink: Mutex<SplitSink<WsStream, Message>>,
    source: Mutex<SplitStream<WsStream>>,
}

impl WebSocketConnection {
    /// Returns the remote address of the peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Like [`recv`](Connection::recv), but fails with
    /// [`TransportError::Idle`] when no frame at all arrives within
    /// `idle`. Ping and pong frames count as activity and restart the
    /// clock.
    pub async fn recv_within(&self, idle: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        self.next_frame(Some(idle)).await
    }

    /// Sends a WebSocket ping. Browsers answer with a pong on their own,
    /// which keeps a quiet but live peer from looking idle.
    pub async fn ping(&self) -> Result<(), TransportError> {
        self.sink
            .lock()
            .await
            .send(Message::Ping(Default::default()))
            .await
            .map_err(|e| TransportError::SendFailed(io_error(ErrorKind::BrokenPipe, e)))
    }

    async fn next_frame(&self, idle: Option<Duration>) -> Result<Option<Vec<u8>>, TransportError> {
        let mut source = self.source.lock().await;
        loop {
            let next = match idle {
                Some(idle) => tokio::time::timeout(idle, source.next())
                    .await
                    .map_err(|_| TransportError::Idle(idle))?,
                None => source.next().await,
            };
            match next {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(io_error(
                        ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    /// UTF-8 payloads go out as text frames, anything else as binary.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::text(text.to_owned()),
            Err(_) => Message::binary(data.to_vec()),
        };
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(io_error(ErrorKind::BrokenPipe, e))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        self.next_frame(None).await
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(io_error(ErrorKind::BrokenPipe, e))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
