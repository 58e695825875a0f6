//! HTTP API: single-player quizzes, room ids, and the admin clear.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use quizroom_protocol::{GameMode, Question, RoomId};
use quizroom_room::{Coordinator, QuestionSource, generate_room_id};
use quizroom_session::SessionHub;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Largest request body the API accepts.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024;

/// State shared by every HTTP handler.
pub struct AppState<S: QuestionSource> {
    pub coordinator: Arc<Coordinator<S, SessionHub>>,
}

impl<S: QuestionSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SingleGameRequest {
    pub area: String,
    pub level: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleGameResponse {
    pub quizlist: Vec<Question>,
    pub game_mode: GameMode,
}

#[derive(Debug, Deserialize)]
pub struct ClearRoomsRequest {
    pub secret: String,
}

/// Builds the API router with CORS, request tracing and the body limit.
pub fn router<S: QuestionSource>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/newSingleGame", post(new_single_game::<S>))
        .route("/api/v1/getRoomID", get(get_room_id))
        .route("/api/v1/clearAllRooms", post(clear_all_rooms::<S>))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// Fetches a quiz for one player; no room is involved.
pub async fn new_single_game<S: QuestionSource>(
    State(state): State<AppState<S>>,
    Json(request): Json<SingleGameRequest>,
) -> Result<Json<SingleGameResponse>, ApiError> {
    let quizlist = state
        .coordinator
        .source()
        .fetch(&request.area, &request.level)
        .await
        .map_err(|e| ApiError::bad_gateway(e.to_string()))?;

    Ok(Json(SingleGameResponse {
        quizlist,
        game_mode: GameMode::SinglePlayer,
    }))
}

/// Issues a fresh room id. The room itself is created on first join.
pub async fn get_room_id() -> Json<RoomId> {
    Json(generate_room_id())
}

/// Clears every room when the secret matches. Always answers 204 so the
/// response says nothing about the secret.
pub async fn clear_all_rooms<S: QuestionSource>(
    State(state): State<AppState<S>>,
    Json(request): Json<ClearRoomsRequest>,
) -> StatusCode {
    state.coordinator.clear_all(&request.secret).await;
    StatusCode::NO_CONTENT
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(status = %self.status, message = %self.message, "request failed");
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
