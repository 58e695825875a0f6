//! `QuizServer` builder and server loop.
//!
//! This is the entry point for running a Quizroom server. It ties
//! together all the layers: transport → protocol → session → room, and
//! serves the HTTP API next to the WebSocket listener.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use quizroom_protocol::{Codec, JsonCodec};
use quizroom_room::{Coordinator, QuestionSource, RoomConfig};
use quizroom_session::SessionHub;
use quizroom_transport::{Transport, WebSocketTransport};
use tokio::net::TcpListener;

use crate::handler::handle_connection;
use crate::http::{AppState, router};
use crate::{QuizroomError, ServerConfig};

/// Default idle timeout for WebSocket connections.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<S: QuestionSource, C: Codec> {
    pub(crate) coordinator: Arc<Coordinator<S, SessionHub>>,
    pub(crate) hub: Arc<SessionHub>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Quizroom server.
///
/// # Example
///
/// ```rust,ignore
/// use quizroom::prelude::*;
///
/// let server = QuizServerBuilder::new()
///     .ws_bind("0.0.0.0:3031")
///     .http_bind("0.0.0.0:3030")
///     .build(my_source)
///     .await?;
/// server.run().await
/// ```
pub struct QuizServerBuilder {
    ws_addr: String,
    http_addr: String,
    room_config: RoomConfig,
    admin_secret: Option<String>,
    idle_timeout: Duration,
}

impl QuizServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            ws_addr: "127.0.0.1:3031".to_string(),
            http_addr: "127.0.0.1:3030".to_string(),
            room_config: RoomConfig::default(),
            admin_secret: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Takes every setting from a loaded [`ServerConfig`].
    pub fn config(self, config: &ServerConfig) -> Self {
        Self {
            ws_addr: config.ws_addr.to_string(),
            http_addr: config.http_addr.to_string(),
            room_config: config.room_config(),
            admin_secret: config.admin_secret.clone(),
            idle_timeout: config.idle_timeout,
        }
    }

    /// Sets the address of the WebSocket listener.
    pub fn ws_bind(mut self, addr: &str) -> Self {
        self.ws_addr = addr.to_string();
        self
    }

    /// Sets the address of the HTTP API listener.
    pub fn http_bind(mut self, addr: &str) -> Self {
        self.http_addr = addr.to_string();
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the secret that authorizes clearing every room.
    pub fn admin_secret(mut self, secret: impl Into<String>) -> Self {
        self.admin_secret = Some(secret.into());
        self
    }

    /// Sets how long a silent WebSocket connection is kept open.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds both listeners.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build<S: QuestionSource>(
        self,
        source: S,
    ) -> Result<QuizServer<S, JsonCodec>, QuizroomError> {
        let transport = WebSocketTransport::bind(&self.ws_addr).await?;
        let http = TcpListener::bind(&self.http_addr).await?;

        let hub = Arc::new(SessionHub::new());
        let coordinator = Arc::new(Coordinator::new(
            Arc::new(source),
            Arc::clone(&hub),
            self.room_config,
            self.admin_secret,
        ));

        let state = Arc::new(ServerState {
            coordinator,
            hub,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(QuizServer {
            transport,
            http,
            state,
        })
    }
}

impl Default for QuizServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Quizroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuizServer<S: QuestionSource, C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    http: TcpListener,
    state: Arc<ServerState<S, C>>,
}

impl<S, C> QuizServer<S, C>
where
    S: QuestionSource,
    C: Codec + Clone,
{
    /// Returns the address of the WebSocket listener.
    pub fn ws_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the address of the HTTP API listener.
    pub fn http_addr(&self) -> std::io::Result<SocketAddr> {
        self.http.local_addr()
    }

    /// The room coordinator, for inspection.
    pub fn coordinator(&self) -> &Arc<Coordinator<S, SessionHub>> {
        &self.state.coordinator
    }

    /// Runs the WebSocket accept loop and the HTTP API until either
    /// fails.
    pub async fn run(self) -> Result<(), QuizroomError> {
        let Self {
            transport,
            http,
            state,
        } = self;

        let app = router(AppState {
            coordinator: Arc::clone(&state.coordinator),
        });

        tracing::info!("Quizroom server running");

        tokio::select! {
            result = axum::serve(http, app).into_future() => result.map_err(QuizroomError::Io),
            result = accept_loop(transport, state) => result,
        }
    }
}

/// Accepts incoming connections and spawns a handler task for each.
async fn accept_loop<S, C>(
    mut transport: WebSocketTransport,
    state: Arc<ServerState<S, C>>,
) -> Result<(), QuizroomError>
where
    S: QuestionSource,
    C: Codec + Clone,
{
    loop {
        match transport.accept().await {
            Ok(conn) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(conn, state).await {
                        tracing::debug!(error = %e, "connection ended with error");
                    }
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "accept failed");
            }
        }
    }
}
