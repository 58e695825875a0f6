//! Room actor: an isolated Tokio task that owns one trivia room.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. Joins, submissions and deadline checks are
//! all commands on the same queue, so the race between "the last player
//! answered" and "time ran out" is settled by queue order, and the
//! room's `finished` flag guarantees a single results broadcast.

use std::sync::Arc;

use quizroom_protocol::{Answer, RoomId, Roster, ServerEvent};
use quizroom_session::Broadcaster;
use quizroom_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::state::{FinishTrigger, Room};
use crate::{
    JoinOutcome, RoomConfig, RoomError, RoomState, RoundSetup, RoundStarted, SubmitOutcome,
};

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is a reply channel: the caller
/// sends a command and waits for the response on it.
pub(crate) enum RoomCommand {
    /// Add a player and subscribe their connection.
    Join {
        username: String,
        connection: ConnectionId,
        reply: oneshot::Sender<JoinOutcome>,
    },

    /// Install a freshly fetched quiz and start the clock.
    BeginRound {
        setup: RoundSetup,
        initiator: Option<ConnectionId>,
        reply: oneshot::Sender<Result<RoundStarted, RoomError>>,
    },

    /// Record a player's answers.
    Submit {
        username: String,
        answers: Vec<Answer>,
        reply: oneshot::Sender<SubmitOutcome>,
    },

    /// A round's deferred timer elapsed.
    Deadline { round: u64 },

    /// Request a snapshot of the room.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Shut down the room.
    Shutdown,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    /// The room's id.
    pub room_id: RoomId,
    /// Current lifecycle state.
    pub state: RoomState,
    /// Everyone in the room and what they have submitted.
    pub roster: Roster,
    /// Players who have answered in the current round.
    pub submitted_count: usize,
    /// Current round number; 0 before the first start.
    pub round: u64,
    /// Whether a round is collecting answers.
    pub active: bool,
    /// Whether the current round's results went out.
    pub finished: bool,
}

impl RoomInfo {
    pub fn player_count(&self) -> usize {
        self.roster.len()
    }
}

/// Handle to a running room actor. Used to send commands to it.
///
/// This is cheap to clone; it's just an `mpsc::Sender` wrapper. The
/// registry holds one of these per room.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }

    /// Adds a player to the room and subscribes `connection` to its
    /// broadcasts.
    pub async fn join(
        &self,
        username: impl Into<String>,
        connection: ConnectionId,
    ) -> Result<JoinOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                username: username.into(),
                connection,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Starts a round with an already fetched quiz.
    pub async fn begin_round(
        &self,
        setup: RoundSetup,
        initiator: Option<ConnectionId>,
    ) -> Result<RoundStarted, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::BeginRound {
                setup,
                initiator,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Records a player's answers for the current round.
    pub async fn submit(
        &self,
        username: impl Into<String>,
        answers: Vec<Answer>,
    ) -> Result<SubmitOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Submit {
                username: username.into(),
                answers,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Requests the current room info.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<B: Broadcaster> {
    room_id: RoomId,
    config: RoomConfig,
    room: Room,
    broadcaster: Arc<B>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Handed to deadline timers. Weak so a pending timer never keeps a
    /// cleared room alive.
    timer_sender: mpsc::WeakSender<RoomCommand>,
}

impl<B: Broadcaster> RoomActor<B> {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    username,
                    connection,
                    reply,
                } => {
                    let outcome = self.handle_join(&username, connection);
                    let _ = reply.send(outcome);
                }
                RoomCommand::BeginRound {
                    setup,
                    initiator,
                    reply,
                } => {
                    let result = self.handle_begin_round(setup, initiator);
                    let _ = reply.send(result);
                }
                RoomCommand::Submit {
                    username,
                    answers,
                    reply,
                } => {
                    let outcome = self.handle_submit(&username, answers);
                    let _ = reply.send(outcome);
                }
                RoomCommand::Deadline { round } => {
                    self.handle_deadline(round);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(&mut self, username: &str, connection: ConnectionId) -> JoinOutcome {
        let outcome = self.room.join(username);
        self.broadcaster.join_room(connection, &self.room_id);

        if outcome == JoinOutcome::Joined {
            tracing::info!(
                room_id = %self.room_id,
                %username,
                players = self.room.roster().len(),
                "player joined"
            );
        } else {
            tracing::debug!(room_id = %self.room_id, %username, "player rejoined");
        }

        self.broadcaster.broadcast(
            &self.room_id,
            Some(connection),
            ServerEvent::UserConnected(self.room.roster().clone()),
        );
        outcome
    }

    fn handle_begin_round(
        &mut self,
        setup: RoundSetup,
        initiator: Option<ConnectionId>,
    ) -> Result<RoundStarted, RoomError> {
        let effective_window = self.config.effective_window(setup.time_limit_secs);
        let questions = setup.quiz.len();
        let round = self.room.begin_round(setup)?;

        tracing::info!(
            room_id = %self.room_id,
            round,
            questions,
            window_secs = effective_window.as_secs(),
            "round started"
        );

        if let Some(event) = self.room.quiz_list(effective_window) {
            self.broadcaster.broadcast(&self.room_id, initiator, event);
        }
        self.schedule_deadline(round, effective_window);

        Ok(RoundStarted {
            round,
            effective_window,
        })
    }

    fn handle_submit(&mut self, username: &str, answers: Vec<Answer>) -> SubmitOutcome {
        match self.room.submit(username, answers) {
            SubmitOutcome::Recorded { .. } => {
                tracing::debug!(room_id = %self.room_id, %username, "answers recorded");
                let finished = self.finish(FinishTrigger::Submission);
                SubmitOutcome::Recorded { finished }
            }
            other => {
                tracing::debug!(
                    room_id = %self.room_id,
                    %username,
                    outcome = ?other,
                    "submission ignored"
                );
                other
            }
        }
    }

    fn handle_deadline(&mut self, round: u64) {
        if !self.finish(FinishTrigger::Deadline(round)) {
            tracing::debug!(
                room_id = %self.room_id,
                round,
                current = self.room.round(),
                "deadline ignored"
            );
        }
    }

    /// Runs the finish check and broadcasts results if it passes.
    /// Returns `true` if this call finished the round.
    fn finish(&mut self, trigger: FinishTrigger) -> bool {
        let Some(results) = self.room.finish_check(trigger) else {
            return false;
        };

        tracing::info!(
            room_id = %self.room_id,
            round = self.room.round(),
            ?trigger,
            submitted = self.room.submitted_count(),
            players = self.room.roster().len(),
            "round finished"
        );
        self.broadcaster
            .broadcast(&self.room_id, None, ServerEvent::QuizFinished(results));
        true
    }

    /// Fires a `Deadline` for `round` once `window` has elapsed. The
    /// timer is never cancelled; the room ignores it if the round has
    /// already finished or been replaced.
    fn schedule_deadline(&self, round: u64, window: std::time::Duration) {
        let sender = self.timer_sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(RoomCommand::Deadline { round }).await;
            }
        });
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            state: self.room.state(),
            roster: self.room.roster().clone(),
            submitted_count: self.room.submitted_count(),
            round: self.room.round(),
            active: self.room.is_active(),
            finished: self.room.is_finished(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room<B: Broadcaster>(
    room_id: RoomId,
    config: RoomConfig,
    broadcaster: Arc<B>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));

    let actor = RoomActor {
        room_id: room_id.clone(),
        config,
        room: Room::new(),
        broadcaster,
        receiver: rx,
        timer_sender: tx.downgrade(),
    };

    tokio::spawn(actor.run());

    RoomHandle { room_id, sender: tx }
}
