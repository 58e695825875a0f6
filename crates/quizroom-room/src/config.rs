//! Room configuration and state machine.

use std::time::Duration;

/// Countdown clients show before a round's clock starts.
pub const DEFAULT_COUNTDOWN: Duration = Duration::from_secs(4);

/// Default command channel size for room actors.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room the coordinator spawns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    /// Grace period added to every round's time limit. The deadline
    /// fires after `time_limit + countdown`.
    pub countdown: Duration,

    /// Capacity of each room actor's command queue. When it fills up,
    /// callers wait.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            countdown: DEFAULT_COUNTDOWN,
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }
}

impl RoomConfig {
    /// The window after which a round's deadline fires. Saturates at
    /// `Duration::MAX`; the time limit comes straight from a client.
    pub fn effective_window(&self, time_limit_secs: u64) -> Duration {
        Duration::from_secs(time_limit_secs).saturating_add(self.countdown)
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room, per round.
///
/// ```text
/// Empty → Joinable → InProgress → Finished
///                        ↑            │
///                        └── start ───┘
/// ```
///
/// - **Empty**: the room exists but nobody has joined yet.
/// - **Joinable**: players are gathering; no round has started.
/// - **InProgress**: a quiz has been dealt and answers are being
///   collected.
/// - **Finished**: results for the current round have been broadcast.
///   Terminal for the round; an explicit start begins the next one.
///
/// Joining is accepted in every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Empty,
    Joinable,
    InProgress,
    Finished,
}

impl RoomState {
    /// Returns `true` if a new round may begin.
    pub fn can_start(&self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// Returns `true` if answers are being collected.
    pub fn accepts_answers(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Joinable => write!(f, "Joinable"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_state_can_start() {
        assert!(RoomState::Empty.can_start());
        assert!(RoomState::Joinable.can_start());
        assert!(!RoomState::InProgress.can_start());
        assert!(RoomState::Finished.can_start());
    }

    #[test]
    fn test_room_state_accepts_answers_only_in_progress() {
        assert!(!RoomState::Empty.accepts_answers());
        assert!(!RoomState::Joinable.accepts_answers());
        assert!(RoomState::InProgress.accepts_answers());
        assert!(!RoomState::Finished.accepts_answers());
    }

    #[test]
    fn test_room_state_display() {
        assert_eq!(RoomState::Joinable.to_string(), "Joinable");
        assert_eq!(RoomState::InProgress.to_string(), "InProgress");
    }

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.countdown, Duration::from_secs(4));
        assert_eq!(config.channel_size, 64);
    }

    #[test]
    fn test_effective_window_adds_countdown() {
        let config = RoomConfig::default();
        assert_eq!(config.effective_window(30), Duration::from_secs(34));
        assert_eq!(config.effective_window(0), Duration::from_secs(4));
    }

    #[test]
    fn test_effective_window_saturates_on_huge_limit() {
        let config = RoomConfig::default();
        assert_eq!(config.effective_window(u64::MAX), Duration::MAX);
    }
}
