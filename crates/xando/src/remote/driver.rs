//! Event loop for a remote game.
//!
//! Selects over caller commands and the record subscription, so store
//! notifications and local intents are handled one at a time on a single
//! task. Teardown (explicit, or the handle's command channel closing)
//! unsubscribes and deletes the record before the loop reports [`RemoteEvent::Closed`].

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::mirror::Mirror;
use super::session::RemoteSession;
use crate::error::{InvalidMove, SessionError};
use crate::local::GameClosed;

/// Requests sent to a running remote game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Play this client's mark at a cell index.
    Play(usize),
    /// Start over on an empty board.
    Reset,
    /// Leave the game and delete the record.
    Teardown,
}

/// Notifications emitted by a running remote game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    /// The mirror changed, from a snapshot or an accepted local write.
    Synced(Mirror),
    /// A command was refused before anything was written.
    Rejected(InvalidMove),
    /// A store round trip failed or a snapshot was unusable.
    Error(SessionError),
    /// The record was deleted by the other client.
    OpponentLeft,
    /// The loop has torn down the session and stopped.
    Closed,
}

/// Handle to a remote game running on a background task.
#[derive(Debug)]
pub struct RemoteGame {
    commands: mpsc::UnboundedSender<RemoteCommand>,
    events: mpsc::UnboundedReceiver<RemoteEvent>,
    task: JoinHandle<()>,
}

impl RemoteGame {
    /// Spawns the event loop. Must be called within a tokio runtime.
    #[instrument(
        skip(session),
        fields(game_id = %session.mirror().game_id(), symbol = %session.mirror().symbol())
    )]
    pub fn spawn(session: RemoteSession) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(session, command_rx, event_tx));
        info!("Remote game started");
        Self {
            commands: command_tx,
            events: event_rx,
            task,
        }
    }

    /// Sends a command.
    pub fn send(&self, command: RemoteCommand) -> Result<(), GameClosed> {
        self.commands.send(command).map_err(|_| GameClosed)
    }

    /// Requests a move.
    pub fn play(&self, index: usize) -> Result<(), GameClosed> {
        self.send(RemoteCommand::Play(index))
    }

    /// Requests a reset.
    pub fn reset(&self) -> Result<(), GameClosed> {
        self.send(RemoteCommand::Reset)
    }

    /// Waits for the next event. `None` once the loop has stopped and every
    /// event has been read.
    pub async fn next_event(&mut self) -> Option<RemoteEvent> {
        self.events.recv().await
    }

    /// Leaves the game and waits for the loop to finish its cleanup.
    #[instrument(skip(self))]
    pub async fn teardown(self) {
        let _ = self.commands.send(RemoteCommand::Teardown);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Remote game task ended abnormally");
        }
    }
}

fn outcome_event(result: Result<Mirror, SessionError>) -> RemoteEvent {
    match result {
        Ok(mirror) => RemoteEvent::Synced(mirror),
        Err(SessionError::InvalidMove(e)) => RemoteEvent::Rejected(e),
        Err(e) => RemoteEvent::Error(e),
    }
}

async fn run(
    mut session: RemoteSession,
    mut commands: mpsc::UnboundedReceiver<RemoteCommand>,
    events: mpsc::UnboundedSender<RemoteEvent>,
) {
    let emit = |event: RemoteEvent| {
        if events.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    };

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(RemoteCommand::Play(index)) => emit(outcome_event(session.play(index).await)),
                Some(RemoteCommand::Reset) => emit(outcome_event(session.reset().await)),
                Some(RemoteCommand::Teardown) | None => break,
            },
            change = session.next_change() => match change {
                Some(change) => {
                    let was_closed = *session.mirror().closed();
                    let result = session.apply_change(change).await;
                    let left = !was_closed && *session.mirror().closed();
                    emit(outcome_event(result));
                    if left {
                        emit(RemoteEvent::OpponentLeft);
                    }
                }
                None => {
                    warn!("Subscription ended");
                    break;
                }
            },
        }
    }

    session.teardown().await;
    emit(RemoteEvent::Closed);
    info!("Remote game stopped");
}
