//! Matchmaking and synchronization against a shared document store.
//!
//! A client looks for an open record and joins it as O, or creates one and
//! waits as X. From then on the record is the only shared state: every
//! snapshot replaces the local [`Mirror`], and every local move is written as
//! one update of `board` and `currentTurn`.
//!
//! Neither step is transactional. Two clients matchmaking at once can both
//! join the same open record, or both create one. Move writes carry no
//! version, so a client acting on a stale mirror overwrites the other's move
//! (last writer wins). The turn-ownership check in [`RemoteSession::play`] is
//! the only guard.

use std::sync::Arc;

use rand::RngCore;
use tracing::{debug, info, instrument, warn};
use xando_engine::{Board, Player, evaluate};

use super::mirror::{Mirror, reconcile, reconcile_deleted};
use super::record::{GameRecord, RecordPatch, RecordStatus, open_games_query};
use super::store::{Change, DocumentStore, Subscription};
use crate::config::GameConfig;
use crate::error::{InvalidMove, SessionError};

/// Generates a display name of the form `Player_xxxxx`.
pub fn generate_identity() -> String {
    format!("Player_{:05x}", rand::thread_rng().next_u64() & 0xf_ffff)
}

/// Generates a random 128-bit game id as hex.
pub fn generate_game_id() -> String {
    let mut rng = rand::thread_rng();
    format!("{:016x}{:016x}", rng.next_u64(), rng.next_u64())
}

/// Undoes this client's matchmaking write, best effort.
///
/// A creator deletes the record it made. A joiner reopens the seat it took.
async fn abandon(store: &dyn DocumentStore, collection: &str, mirror: &Mirror) {
    let result = match mirror.symbol() {
        Player::X => store.delete(collection, mirror.game_id()).await,
        Player::O => {
            let reopen = RecordPatch::new()
                .with_player2(String::new())
                .with_status(RecordStatus::Waiting);
            match reopen.to_document() {
                Ok(fields) => store.update(collection, mirror.game_id(), fields).await,
                Err(e) => Err(e),
            }
        }
    };
    if let Err(e) = result {
        warn!(
            error = %e,
            game_id = %mirror.game_id(),
            "Failed to undo matchmaking write"
        );
    }
}

/// One client's attachment to a shared game.
#[derive(Debug)]
pub struct RemoteSession {
    store: Arc<dyn DocumentStore>,
    collection: String,
    identity: String,
    mirror: Mirror,
    subscription: Subscription,
}

impl RemoteSession {
    /// Matchmakes using the configured collection and player name.
    ///
    /// A name is generated when none is configured.
    #[instrument(skip(store, config), fields(collection = %config.collection()))]
    pub async fn from_config(
        store: Arc<dyn DocumentStore>,
        config: &GameConfig,
    ) -> Result<Self, SessionError> {
        let identity = config
            .player_name()
            .clone()
            .unwrap_or_else(generate_identity);
        Self::matchmake(store, config.collection().clone(), identity).await
    }

    /// Joins the first open game in `collection`, or creates one.
    ///
    /// Joining assigns O and writes `player2` and `status = active`.
    /// Creating assigns X and writes an empty waiting record. Either way the
    /// session then subscribes to the record.
    ///
    /// The query and the follow-up write are separate round trips, so a
    /// concurrent client can claim the same record in between.
    ///
    /// # Errors
    ///
    /// [`SessionError::RemoteQueryFailed`] if the lookup fails,
    /// [`SessionError::RemoteWriteFailed`] if the join or create write fails,
    /// [`SessionError::RemoteSubscriptionFailed`] if subscribing fails (the join or
    /// create is undone first), and
    /// [`SessionError::MalformedRecord`] if the open record can't be decoded.
    #[instrument(skip_all)]
    pub async fn matchmake(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        identity: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let collection = collection.into();
        let identity = identity.into();
        debug!(%collection, %identity, "Looking for an open game");

        let open = store
            .query(&collection, &open_games_query())
            .await
            .map_err(SessionError::RemoteQueryFailed)?;

        let mirror = match open.into_iter().next() {
            Some((game_id, document)) => {
                let mut record = GameRecord::from_document(document)?;
                let patch = RecordPatch::new()
                    .with_player2(identity.clone())
                    .with_status(RecordStatus::Active);
                let fields = patch.to_document().map_err(SessionError::RemoteWriteFailed)?;
                store
                    .update(&collection, &game_id, fields)
                    .await
                    .map_err(SessionError::RemoteWriteFailed)?;
                record.apply(&patch);
                info!(%game_id, opponent = %record.player1, "Joined open game as O");
                Mirror::attached(game_id, Player::O, &record)
            }
            None => {
                let game_id = generate_game_id();
                let record = GameRecord::waiting(identity.clone());
                let document = record
                    .to_document()
                    .map_err(SessionError::RemoteWriteFailed)?;
                store
                    .create(&collection, &game_id, document)
                    .await
                    .map_err(SessionError::RemoteWriteFailed)?;
                info!(%game_id, "No open game, created one as X");
                Mirror::attached(game_id, Player::X, &record)
            }
        };

        let subscription = match store.subscribe(&collection, mirror.game_id()).await {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(
                    error = %e,
                    game_id = %mirror.game_id(),
                    "Subscribe failed, undoing matchmaking write"
                );
                abandon(store.as_ref(), &collection, &mirror).await;
                return Err(SessionError::RemoteSubscriptionFailed(e));
            }
        };

        Ok(Self {
            store,
            collection,
            identity,
            mirror,
            subscription,
        })
    }

    /// Waits for the next change on the record. Cancel safe.
    ///
    /// `None` once the store has dropped the subscription.
    pub async fn next_change(&mut self) -> Option<Change> {
        self.subscription.recv().await
    }

    /// Folds one change into the mirror.
    ///
    /// A snapshot replaces the mirror. If it shows a finished board and the
    /// record isn't marked finished yet, this client writes
    /// `status = finished`. A deletion closes the mirror.
    ///
    /// # Errors
    ///
    /// [`SessionError::MalformedRecord`] leaves the mirror untouched.
    /// [`SessionError::RemoteSubscriptionFailed`] passes on a store error.
    /// [`SessionError::RemoteWriteFailed`] if marking the game finished
    /// fails; the mirror still reflects the snapshot.
    #[instrument(skip(self, change), fields(game_id = %self.mirror.game_id()))]
    pub async fn apply_change(&mut self, change: Change) -> Result<Mirror, SessionError> {
        match change {
            Change::Snapshot(document) => {
                let record = GameRecord::from_document(document).inspect_err(|e| {
                    warn!(error = %e, "Ignoring malformed snapshot");
                })?;
                self.mirror = reconcile(&self.mirror, &record);
                debug!(
                    turn = %record.current_turn,
                    status = %record.status,
                    board = %record.board.display(),
                    "Snapshot applied"
                );

                let outcome = self.mirror.outcome();
                if outcome.is_terminal() && record.status != RecordStatus::Finished {
                    info!(%outcome, "Game over, marking record finished");
                    self.write(RecordPatch::new().with_status(RecordStatus::Finished))
                        .await?;
                }
                Ok(self.mirror.clone())
            }
            Change::Deleted => {
                info!("Game record deleted");
                self.mirror = reconcile_deleted(&self.mirror);
                Ok(self.mirror.clone())
            }
            Change::Error(e) => {
                warn!(error = %e, "Subscription reported an error");
                Err(SessionError::RemoteSubscriptionFailed(e))
            }
        }
    }

    /// Waits for the next change and folds it in.
    pub async fn next_update(&mut self) -> Option<Result<Mirror, SessionError>> {
        let change = self.next_change().await?;
        Some(self.apply_change(change).await)
    }

    /// Plays this client's mark at `index`.
    ///
    /// Checks the preconditions against the mirror, then writes the next
    /// board and the handed-off turn in one update, plus
    /// `status = finished` if the move ends the game. On success the mirror
    /// advances without waiting for the confirming snapshot.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidMove`] if the mirror refuses the move; nothing
    /// is written. [`SessionError::RemoteWriteFailed`] leaves the mirror as it
    /// was.
    #[instrument(
        skip(self),
        fields(game_id = %self.mirror.game_id(), symbol = %self.mirror.symbol())
    )]
    pub async fn play(&mut self, index: usize) -> Result<Mirror, SessionError> {
        let board = self.mirror.next_board(index).inspect_err(|e| {
            warn!(index, error = %e, "Rejected move");
        })?;

        let mut patch = RecordPatch::new()
            .with_board(board)
            .with_current_turn(self.mirror.symbol().opponent());
        let outcome = evaluate(&board);
        if outcome.is_terminal() {
            info!(%outcome, "Move ends the game");
            patch = patch.with_status(RecordStatus::Finished);
        }

        self.write(patch).await?;
        debug!(index, "Move written");
        Ok(self.mirror.clone())
    }

    /// Starts the game over on an empty board with X to move.
    ///
    /// # Errors
    ///
    /// [`InvalidMove::Inactive`] while waiting for an opponent or after the
    /// record was deleted. [`SessionError::RemoteWriteFailed`] if the write
    /// fails.
    #[instrument(skip(self), fields(game_id = %self.mirror.game_id()))]
    pub async fn reset(&mut self) -> Result<Mirror, SessionError> {
        if *self.mirror.closed() || *self.mirror.status() == RecordStatus::Waiting {
            warn!("Reset refused, game not active");
            return Err(InvalidMove::Inactive.into());
        }
        let patch = RecordPatch::new()
            .with_board(Board::new())
            .with_current_turn(Player::X)
            .with_status(RecordStatus::Active);
        self.write(patch).await?;
        info!("Game reset");
        Ok(self.mirror.clone())
    }

    /// Leaves the game.
    ///
    /// Unsubscribes, then deletes the record. Both are best effort: failures
    /// are logged and otherwise ignored.
    #[instrument(skip(self), fields(game_id = %self.mirror.game_id()))]
    pub async fn teardown(self) {
        if let Err(e) = self.store.unsubscribe(self.subscription.id()).await {
            warn!(error = %e, "Failed to unsubscribe");
        }
        match self
            .store
            .delete(&self.collection, self.mirror.game_id())
            .await
        {
            Ok(()) => info!("Left game, record deleted"),
            Err(e) => warn!(error = %e, "Failed to delete game record"),
        }
    }

    async fn write(&mut self, patch: RecordPatch) -> Result<(), SessionError> {
        let fields = patch.to_document().map_err(SessionError::RemoteWriteFailed)?;
        self.store
            .update(&self.collection, self.mirror.game_id(), fields)
            .await
            .inspect_err(|e| warn!(error = %e, "Record write failed"))
            .map_err(SessionError::RemoteWriteFailed)?;
        self.mirror = self.mirror.with_patch(&patch);
        Ok(())
    }

    /// Current view of the game.
    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    /// This client's display name.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Collection holding the record.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}
