//! Events and identity types that travel over the socket.
//!
//! Both event enums are adjacently tagged: the variant name goes into
//! `"event"` and the positional payload into `"args"`. Tuple variants
//! serialize as arrays, so the field order of each variant IS the wire
//! order. Do not reorder fields.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of a trivia room: a short opaque token chosen by clients
/// (usually one handed out by the `getRoomID` endpoint).
///
/// `#[serde(transparent)]` keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a raw token.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ---------------------------------------------------------------------------
// Quiz content
// ---------------------------------------------------------------------------

/// Index of the option a player picked for one question.
pub type Answer = u32;

/// One trivia question as delivered by the question provider.
///
/// The server never looks inside a question; only the number of
/// questions in a round matters to it. The JSON is passed through
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Question(pub serde_json::Value);

/// Per-player state inside a room.
///
/// Serializes as `{}` before the player has submitted and as
/// `{"answers": [...]}` afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Submitted answers, one per question. `None` until submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<Answer>>,
}

impl PlayerState {
    /// Returns `true` once the player has submitted for the current round.
    pub fn has_submitted(&self) -> bool {
        self.answers.is_some()
    }
}

/// Room roster: username → player state, ordered by username.
pub type Roster = BTreeMap<String, PlayerState>;

/// Answers to one question: username → chosen option.
pub type QuestionResult = BTreeMap<String, Answer>;

/// Tag telling clients which flow a quiz belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    /// Quiz fetched over HTTP for a lone player.
    SinglePlayer,
    /// Quiz broadcast to a room.
    MultiPlayer,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events a participant sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "args")]
pub enum ClientEvent {
    /// `[roomId, username]`
    #[serde(rename = "join-room")]
    JoinRoom(RoomId, String),

    /// `[roomId, area, level, timeLimitSeconds]`
    #[serde(rename = "startGame")]
    StartGame(RoomId, String, String, u64),

    /// `[roomId, username, answers]`
    #[serde(rename = "submit-answers")]
    SubmitAnswers(RoomId, String, Vec<Answer>),
}

impl ClientEvent {
    /// Returns the room the event is addressed to.
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::JoinRoom(room_id, ..)
            | Self::StartGame(room_id, ..)
            | Self::SubmitAnswers(room_id, ..) => room_id,
        }
    }

    /// Rejects events that decode fine but cannot name a room or player.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.room_id().as_str().trim().is_empty() {
            return Err(ProtocolError::InvalidMessage("empty room id".into()));
        }
        match self {
            Self::JoinRoom(_, username) | Self::SubmitAnswers(_, username, _)
                if username.trim().is_empty() =>
            {
                Err(ProtocolError::InvalidMessage("empty username".into()))
            }
            _ => Ok(()),
        }
    }
}

/// Events the server pushes to participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "args")]
pub enum ServerEvent {
    /// `[roster]`: someone joined; the full roster of the room.
    #[serde(rename = "user-connected", with = "single_arg")]
    UserConnected(Roster),

    /// `[quiz, mode, createdAt, timeLimitSeconds, area, level,
    /// effectiveWindowSeconds]`: a round started.
    #[serde(rename = "quiz-list")]
    QuizList(
        Vec<Question>,
        GameMode,
        DateTime<Utc>,
        u64,
        String,
        String,
        u64,
    ),

    /// `[results]`: one participant→answer map per question.
    #[serde(rename = "quiz-finished", with = "single_arg")]
    QuizFinished(Vec<QuestionResult>),

    /// `[roomId, message]`: the initiator's start could not load questions.
    #[serde(rename = "start-failed")]
    StartFailed(RoomId, String),
}

impl ServerEvent {
    /// Returns the wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserConnected(_) => "user-connected",
            Self::QuizList(..) => "quiz-list",
            Self::QuizFinished(_) => "quiz-finished",
            Self::StartFailed(..) => "start-failed",
        }
    }
}

/// Keeps single-payload events as one-element `args` arrays instead of
/// letting serde unwrap the newtype.
mod single_arg {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        (value,).serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let (value,) = <(T,)>::deserialize(deserializer)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomId::new("R1")).unwrap();
        assert_eq!(json, "\"R1\"");
        assert_eq!(RoomId::new("R1").to_string(), "R1");
    }

    #[test]
    fn test_player_state_without_answers_is_empty_object() {
        let json = serde_json::to_value(PlayerState::default()).unwrap();
        assert_eq!(json, json!({}));
    }

    #[test]
    fn test_player_state_with_answers() {
        let state = PlayerState {
            answers: Some(vec![0, 3]),
        };
        assert!(state.has_submitted());
        assert_eq!(serde_json::to_value(&state).unwrap(), json!({"answers": [0, 3]}));
    }

    #[test]
    fn test_game_mode_uses_camel_case_tags() {
        assert_eq!(
            serde_json::to_value(GameMode::MultiPlayer).unwrap(),
            json!("multiPlayer")
        );
        assert_eq!(
            serde_json::to_value(GameMode::SinglePlayer).unwrap(),
            json!("singlePlayer")
        );
    }

    // =====================================================================
    // ClientEvent
    // =====================================================================

    #[test]
    fn test_client_event_join_room_decodes_positional_args() {
        let event: ClientEvent =
            serde_json::from_value(json!({"event": "join-room", "args": ["R1", "alice"]}))
                .unwrap();
        assert_eq!(event, ClientEvent::JoinRoom(RoomId::new("R1"), "alice".into()));
    }

    #[test]
    fn test_client_event_start_game_decodes_positional_args() {
        let event: ClientEvent = serde_json::from_value(
            json!({"event": "startGame", "args": ["R1", "science", "easy", 30]}),
        )
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::StartGame(RoomId::new("R1"), "science".into(), "easy".into(), 30)
        );
    }

    #[test]
    fn test_client_event_submit_answers_decodes_positional_args() {
        let event: ClientEvent = serde_json::from_value(
            json!({"event": "submit-answers", "args": ["R1", "bob", [1, 1]]}),
        )
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::SubmitAnswers(RoomId::new("R1"), "bob".into(), vec![1, 1])
        );
    }

    #[test]
    fn test_client_event_unknown_event_is_rejected() {
        let result: Result<ClientEvent, _> =
            serde_json::from_value(json!({"event": "fly-to-moon", "args": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_event_wrong_arity_is_rejected() {
        let result: Result<ClientEvent, _> =
            serde_json::from_value(json!({"event": "join-room", "args": ["R1"]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_event_validate_rejects_blank_names() {
        assert!(ClientEvent::JoinRoom(RoomId::new(""), "alice".into())
            .validate()
            .is_err());
        assert!(ClientEvent::SubmitAnswers(RoomId::new("R1"), "  ".into(), vec![])
            .validate()
            .is_err());
        assert!(ClientEvent::StartGame(RoomId::new("R1"), String::new(), String::new(), 5)
            .validate()
            .is_ok());
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_user_connected_wraps_roster_in_args_array() {
        let mut roster = Roster::new();
        roster.insert("alice".into(), PlayerState::default());
        roster.insert("bob".into(), PlayerState { answers: Some(vec![2]) });

        let json = serde_json::to_value(ServerEvent::UserConnected(roster)).unwrap();
        assert_eq!(
            json,
            json!({"event": "user-connected", "args": [{"alice": {}, "bob": {"answers": [2]}}]})
        );
    }

    #[test]
    fn test_quiz_list_keeps_payload_order() {
        let created_at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let event = ServerEvent::QuizList(
            vec![Question(json!({"q": "2+2?"}))],
            GameMode::MultiPlayer,
            created_at,
            30,
            "science".into(),
            "easy".into(),
            34,
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "quiz-list");
        let args = json["args"].as_array().expect("args is an array");
        assert_eq!(args.len(), 7);
        assert_eq!(args[0], json!([{"q": "2+2?"}]));
        assert_eq!(args[1], "multiPlayer");
        assert_eq!(args[2], "2026-01-02T03:04:05Z");
        assert_eq!(args[3], 30);
        assert_eq!(args[4], "science");
        assert_eq!(args[5], "easy");
        assert_eq!(args[6], 34);
    }

    #[test]
    fn test_quiz_finished_wraps_results_in_args_array() {
        let mut first = QuestionResult::new();
        first.insert("alice".into(), 0);
        let event = ServerEvent::QuizFinished(vec![first, QuestionResult::new()]);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, json!({"event": "quiz-finished", "args": [[{"alice": 0}, {}]]}));

        let decoded: ServerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
        assert_eq!(decoded.name(), "quiz-finished");
    }

    #[test]
    fn test_start_failed_json_format() {
        let event = ServerEvent::StartFailed(RoomId::new("R1"), "no questions".into());
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "start-failed", "args": ["R1", "no questions"]})
        );
    }
}
