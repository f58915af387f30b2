//! Event loop for a local game.
//!
//! The session lives on its own task. Commands come in over one channel and
//! events go out over another, so the caller never blocks on the computer's
//! thinking delay. The delay is a timer held only while a computer move is
//! pending; resetting or shutting down drops it, which cancels the move.

use std::pin::Pin;
use std::time::Duration;

use derive_more::{Display, Error};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Sleep;
use tracing::{debug, info, instrument, warn};
use xando_engine::{Board, Outcome, Player};

use super::session::{LocalSession, Phase};
use crate::error::InvalidMove;

/// Requests sent to a running local game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    /// Human move at a cell index.
    Play(usize),
    /// Start over.
    Reset,
    /// Stop the event loop.
    Shutdown,
}

/// Notifications emitted by a running local game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalEvent {
    /// A mark was placed.
    MoveApplied {
        /// Who moved.
        player: Player,
        /// Where.
        index: usize,
        /// Board after the move.
        board: Board,
    },
    /// The computer's move is scheduled.
    AiThinking,
    /// A command was refused.
    Rejected(InvalidMove),
    /// The board reached an outcome.
    GameOver(Outcome),
    /// The game was reset to an empty board.
    Reset,
}

/// The event loop has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Local game has shut down")]
pub struct GameClosed;

/// Handle to a local game running on a background task.
#[derive(Debug)]
pub struct LocalGame {
    commands: mpsc::UnboundedSender<LocalCommand>,
    events: mpsc::UnboundedReceiver<LocalEvent>,
    task: JoinHandle<()>,
}

impl LocalGame {
    /// Spawns the event loop. Must be called within a tokio runtime.
    #[instrument(skip(session), fields(mode = %session.mode()))]
    pub fn spawn<R: Rng + Send + 'static>(session: LocalSession<R>, ai_delay: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(session, ai_delay, command_rx, event_tx));
        info!(?ai_delay, "Local game started");
        Self {
            commands: command_tx,
            events: event_rx,
            task,
        }
    }

    /// Sends a command.
    pub fn send(&self, command: LocalCommand) -> Result<(), GameClosed> {
        self.commands.send(command).map_err(|_| GameClosed)
    }

    /// Requests a human move.
    pub fn play(&self, index: usize) -> Result<(), GameClosed> {
        self.send(LocalCommand::Play(index))
    }

    /// Requests a reset.
    pub fn reset(&self) -> Result<(), GameClosed> {
        self.send(LocalCommand::Reset)
    }

    /// Waits for the next event. `None` once the loop has stopped.
    pub async fn next_event(&mut self) -> Option<LocalEvent> {
        self.events.recv().await
    }

    /// Stops the loop, canceling any pending computer move.
    #[instrument(skip(self))]
    pub async fn shutdown(self) {
        let _ = self.commands.send(LocalCommand::Shutdown);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Local game task ended abnormally");
        }
    }
}

async fn wait_for(pending: &mut Option<Pin<Box<Sleep>>>) {
    match pending {
        Some(sleep) => sleep.await,
        None => std::future::pending().await,
    }
}

async fn run<R: Rng>(
    mut session: LocalSession<R>,
    ai_delay: Duration,
    mut commands: mpsc::UnboundedReceiver<LocalCommand>,
    events: mpsc::UnboundedSender<LocalEvent>,
) {
    let emit = |event: LocalEvent| {
        if events.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    };
    let mut pending: Option<Pin<Box<Sleep>>> = None;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(LocalCommand::Play(index)) => {
                    let before = session.history().len();
                    match session.play(index) {
                        Ok(phase) => {
                            if let Some(&(index, player)) = session.history().get(before) {
                                emit(LocalEvent::MoveApplied {
                                    player,
                                    index,
                                    board: *session.board(),
                                });
                            }
                            match phase {
                                Phase::Thinking(_) => {
                                    emit(LocalEvent::AiThinking);
                                    pending = Some(Box::pin(tokio::time::sleep(ai_delay)));
                                }
                                Phase::Terminal(outcome) => emit(LocalEvent::GameOver(outcome)),
                                Phase::AwaitingMove(_) => {}
                            }
                        }
                        Err(e) => emit(LocalEvent::Rejected(e)),
                    }
                }
                Some(LocalCommand::Reset) => {
                    if pending.take().is_some() {
                        debug!("Canceled pending computer move");
                    }
                    session.reset();
                    emit(LocalEvent::Reset);
                }
                Some(LocalCommand::Shutdown) | None => break,
            },
            () = wait_for(&mut pending), if pending.is_some() => {
                pending = None;
                let before = session.history().len();
                match session.complete_ai_turn() {
                    Ok(phase) => {
                        if let Some(&(index, player)) = session.history().get(before) {
                            emit(LocalEvent::MoveApplied {
                                player,
                                index,
                                board: *session.board(),
                            });
                        }
                        if let Phase::Terminal(outcome) = phase {
                            emit(LocalEvent::GameOver(outcome));
                        }
                    }
                    Err(e) => warn!(error = %e, "Scheduled computer move had nothing to do"),
                }
            }
        }
    }

    if pending.is_some() {
        debug!("Canceled pending computer move on shutdown");
    }
    info!("Local game stopped");
}
