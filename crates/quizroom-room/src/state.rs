//! The room entity: roster, current round, and the finish check.
//!
//! `Room` is plain data with no I/O. The actor in `room.rs` owns one and
//! calls into it for every command, which is what makes each mutation
//! atomic: nothing else ever touches it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use quizroom_protocol::{
    Answer, GameMode, PlayerState, Question, QuestionResult, Roster, ServerEvent,
};

use crate::results::format_results;
use crate::{RoomError, RoomState};

/// What happened when a player joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// New player added with no answers.
    Joined,
    /// The username was already in the roster; nothing changed.
    AlreadyPresent,
}

/// What happened to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Answers stored. `finished` is `true` if they completed the round.
    Recorded { finished: bool },
    /// The player already submitted this round; the first answers stand.
    Duplicate,
    /// No such player in the room.
    UnknownPlayer,
    /// No round is collecting answers.
    NotInProgress,
}

/// Reply to a successful start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundStarted {
    /// The round number, starting at 1.
    pub round: u64,
    /// Time limit plus countdown; the deadline fires after this.
    pub effective_window: Duration,
}

/// Everything a round needs, gathered before the room is touched.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSetup {
    pub quiz: Vec<Question>,
    pub created_at: DateTime<Utc>,
    pub time_limit_secs: u64,
    pub area: String,
    pub level: String,
}

/// What asked for a finish check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FinishTrigger {
    /// A submission was recorded; finish only if everyone has answered.
    Submission,
    /// The deadline of the given round elapsed; finish unconditionally
    /// if that round is still the current one.
    Deadline(u64),
}

#[derive(Debug, Default)]
pub(crate) struct Room {
    players: Roster,
    current: Option<RoundSetup>,
    round: u64,
    active: bool,
    finished: bool,
}

impl Room {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a player with empty state. Re-joining leaves the existing
    /// entry, answers included, untouched.
    pub(crate) fn join(&mut self, username: &str) -> JoinOutcome {
        if self.players.contains_key(username) {
            return JoinOutcome::AlreadyPresent;
        }
        self.players
            .insert(username.to_owned(), PlayerState::default());
        JoinOutcome::Joined
    }

    pub(crate) fn state(&self) -> RoomState {
        if self.active {
            RoomState::InProgress
        } else if self.finished {
            RoomState::Finished
        } else if self.players.is_empty() {
            RoomState::Empty
        } else {
            RoomState::Joinable
        }
    }

    /// Installs a new round. Every player's answers are cleared so the
    /// round is scored only on what is submitted during it.
    pub(crate) fn begin_round(&mut self, setup: RoundSetup) -> Result<u64, RoomError> {
        let state = self.state();
        if !state.can_start() {
            return Err(RoomError::InvalidState(format!(
                "cannot start a round in state {state}"
            )));
        }

        for player in self.players.values_mut() {
            player.answers = None;
        }
        self.current = Some(setup);
        self.round += 1;
        self.active = true;
        self.finished = false;
        Ok(self.round)
    }

    /// Stores a player's answers. The first submission of a round wins.
    pub(crate) fn submit(&mut self, username: &str, answers: Vec<Answer>) -> SubmitOutcome {
        if !self.state().accepts_answers() {
            return SubmitOutcome::NotInProgress;
        }
        let Some(player) = self.players.get_mut(username) else {
            return SubmitOutcome::UnknownPlayer;
        };
        if player.has_submitted() {
            return SubmitOutcome::Duplicate;
        }
        player.answers = Some(answers);
        SubmitOutcome::Recorded { finished: false }
    }

    /// Decides whether the current round ends now.
    ///
    /// Returns the formatted results exactly once per round; every later
    /// call returns `None` until the next round begins.
    pub(crate) fn finish_check(&mut self, trigger: FinishTrigger) -> Option<Vec<QuestionResult>> {
        if self.finished || !self.active {
            return None;
        }
        let due = match trigger {
            FinishTrigger::Submission => self.everyone_answered(),
            FinishTrigger::Deadline(round) => round == self.round,
        };
        if !due {
            return None;
        }

        let question_count = self.current.as_ref().map_or(0, |r| r.quiz.len());
        let results = format_results(&self.players, question_count);
        self.finished = true;
        self.active = false;
        Some(results)
    }

    /// `true` if every player currently in the roster has submitted.
    pub(crate) fn everyone_answered(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(PlayerState::has_submitted)
    }

    /// The `quiz-list` event for the current round.
    pub(crate) fn quiz_list(&self, effective_window: Duration) -> Option<ServerEvent> {
        let setup = self.current.as_ref()?;
        Some(ServerEvent::QuizList(
            setup.quiz.clone(),
            GameMode::MultiPlayer,
            setup.created_at,
            setup.time_limit_secs,
            setup.area.clone(),
            setup.level.clone(),
            effective_window.as_secs(),
        ))
    }

    pub(crate) fn roster(&self) -> &Roster {
        &self.players
    }

    pub(crate) fn submitted_count(&self) -> usize {
        self.players.values().filter(|p| p.has_submitted()).count()
    }

    pub(crate) fn round(&self) -> u64 {
        self.round
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }
}
