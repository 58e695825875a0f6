//! Per-connection handler: event decoding and routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register a session → get the outbound queue
//!   2. Spawn the writer task that drains the queue onto the socket and
//!      pings the peer periodically
//!   3. Loop: receive frames → decode `ClientEvent` → call the coordinator
//!
//! Any inbound frame, pongs included, counts as activity. A connection
//! is closed as idle only when the peer stops answering pings.
//!
//! Room events never go straight to the socket from here. Rooms push
//! them through the session hub and the writer task sends them, so a
//! slow socket never stalls a room.

use std::sync::Arc;
use std::time::Duration;

use quizroom_protocol::{ClientEvent, Codec, ServerEvent};
use quizroom_room::{QuestionSource, RoomError, StartRequest};
use quizroom_session::{Broadcaster, OutboundReceiver, SessionHub};
use quizroom_transport::{Connection, ConnectionId, TransportError, WebSocketConnection};
use tokio::time::{Instant, MissedTickBehavior};

use crate::QuizroomError;
use crate::server::ServerState;

/// Drop guard that unregisters a connection's session when the handler
/// exits, panics included.
struct SessionGuard {
    connection: ConnectionId,
    hub: SessionHub,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.hub.unregister(self.connection) {
            tracing::debug!(connection = %self.connection, error = %e, "session already gone");
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S, C>>,
) -> Result<(), QuizroomError>
where
    S: QuestionSource,
    C: Codec + Clone,
{
    let conn = Arc::new(conn);
    let connection = conn.id();
    tracing::debug!(%connection, peer = %conn.peer_addr(), "handling new connection");

    let outbound = state.hub.register(connection)?;
    let guard = SessionGuard {
        connection,
        hub: (*state.hub).clone(),
    };

    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        outbound,
        state.codec.clone(),
        keepalive_period(state.idle_timeout),
    ));

    let result = read_loop(&conn, &state).await;

    // Unregistering drops the outbound sender, which ends the writer.
    drop(guard);
    writer.abort();
    result
}

/// Shortest keep-alive period, so a tiny idle timeout cannot turn the
/// writer into a busy loop.
const MIN_KEEPALIVE: Duration = Duration::from_millis(10);

/// Pings go out twice per idle window, so a peer that answers them
/// never trips the idle cutoff.
fn keepalive_period(idle_timeout: Duration) -> Duration {
    (idle_timeout / 2).max(MIN_KEEPALIVE)
}

/// Sends queued server events until the session is dropped or the
/// socket fails, pinging the peer whenever the keep-alive period passes.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut outbound: OutboundReceiver,
    codec: C,
    keepalive: Duration,
) {
    let connection = conn.id();
    let mut ticker = tokio::time::interval_at(Instant::now() + keepalive, keepalive);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let event = tokio::select! {
            event = outbound.recv() => match event {
                Some(event) => event,
                None => break,
            },
            _ = ticker.tick() => {
                if let Err(e) = conn.ping().await {
                    tracing::debug!(%connection, error = %e, "ping failed, stopping writer");
                    break;
                }
                continue;
            }
        };

        let bytes = match codec.encode(event.as_ref()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%connection, event = event.name(), error = %e, "encode failed");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%connection, error = %e, "send failed, stopping writer");
            break;
        }
    }
}

async fn read_loop<S, C>(
    conn: &WebSocketConnection,
    state: &ServerState<S, C>,
) -> Result<(), QuizroomError>
where
    S: QuestionSource,
    C: Codec,
{
    let connection = conn.id();

    loop {
        let data = match conn.recv_within(state.idle_timeout).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%connection, "connection closed cleanly");
                break;
            }
            Err(TransportError::Idle(idle)) => {
                tracing::info!(%connection, ?idle, "peer stopped answering, closing");
                let _ = conn.close().await;
                break;
            }
            Err(e) => {
                tracing::debug!(%connection, error = %e, "recv error");
                break;
            }
        };

        let event = match decode_event(&state.codec, &data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%connection, error = %e, "ignoring undecodable frame");
                continue;
            }
        };

        dispatch(state, connection, event).await;
    }

    Ok(())
}

fn decode_event(codec: &impl Codec, data: &[u8]) -> Result<ClientEvent, QuizroomError> {
    let event: ClientEvent = codec.decode(data)?;
    event.validate()?;
    Ok(event)
}

/// Routes one client event to the coordinator. Failures are contained
/// here; none of them closes the connection.
async fn dispatch<S, C>(state: &ServerState<S, C>, connection: ConnectionId, event: ClientEvent)
where
    S: QuestionSource,
    C: Codec,
{
    match event {
        ClientEvent::JoinRoom(room_id, username) => {
            if let Err(e) = state.coordinator.join(&room_id, &username, connection).await {
                tracing::debug!(%connection, %room_id, error = %e, "join failed");
            }
        }

        ClientEvent::StartGame(room_id, area, level, time_limit_secs) => {
            let request = StartRequest {
                room_id: room_id.clone(),
                area,
                level,
                time_limit_secs,
                initiator: Some(connection),
            };
            match state.coordinator.start(request).await {
                Ok(started) => {
                    tracing::debug!(%connection, %room_id, round = started.round, "start accepted");
                }
                Err(RoomError::Source(e)) => {
                    state
                        .hub
                        .send_to(connection, ServerEvent::StartFailed(room_id, e.to_string()));
                }
                Err(e) => {
                    tracing::debug!(%connection, %room_id, error = %e, "start ignored");
                }
            }
        }

        ClientEvent::SubmitAnswers(room_id, username, answers) => {
            match state
                .coordinator
                .submit_answers(&room_id, &username, answers)
                .await
            {
                Ok(outcome) => {
                    tracing::debug!(%connection, %room_id, %username, ?outcome, "answers handled");
                }
                Err(e) => {
                    tracing::debug!(%connection, %room_id, error = %e, "submission ignored");
                }
            }
        }
    }
}
