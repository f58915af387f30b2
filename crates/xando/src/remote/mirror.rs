//! Local view of a shared game.
//!
//! A [`Mirror`] is never edited field by field. It is rebuilt from each
//! incoming record with [`reconcile`], so the same snapshot always produces
//! the same view whatever the transport did before.

use derive_getters::Getters;
use xando_engine::{Board, Outcome, Player, evaluate};

use super::record::{GameRecord, RecordPatch, RecordStatus};
use crate::error::InvalidMove;

/// What one client believes about the shared game.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Mirror {
    /// Record id in the store.
    game_id: String,
    /// Mark this client plays.
    symbol: Player,
    /// Last known board.
    board: Board,
    /// Mark whose move it is.
    current_turn: Player,
    /// Last known lifecycle state.
    status: RecordStatus,
    /// Opponent's name, once known.
    opponent: Option<String>,
    /// The record was deleted.
    closed: bool,
}

impl Mirror {
    /// Builds the first view of a record this client just attached to.
    pub fn attached(game_id: impl Into<String>, symbol: Player, record: &GameRecord) -> Self {
        let seed = Self {
            game_id: game_id.into(),
            symbol,
            board: Board::new(),
            current_turn: Player::X,
            status: RecordStatus::Waiting,
            opponent: None,
            closed: false,
        };
        reconcile(&seed, record)
    }

    /// True if the record says this client moves next.
    pub fn is_my_turn(&self) -> bool {
        self.current_turn == self.symbol
    }

    /// True while both seats are filled, nobody has finished and the record exists.
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active && !self.closed
    }

    /// Outcome of the mirrored board.
    pub fn outcome(&self) -> Outcome {
        evaluate(&self.board)
    }

    /// Checks the move preconditions against this view and returns the
    /// board the move would produce.
    ///
    /// # Errors
    ///
    /// [`InvalidMove::Inactive`] before an opponent joins or after the game
    /// closes, [`InvalidMove::GameOver`] once the board has an outcome,
    /// [`InvalidMove::NotYourTurn`] if the opponent owns the turn, and
    /// [`InvalidMove::Illegal`] for a taken or out-of-range cell.
    pub fn next_board(&self, index: usize) -> Result<Board, InvalidMove> {
        if self.outcome().is_terminal() {
            return Err(InvalidMove::GameOver);
        }
        if !self.is_active() {
            return Err(InvalidMove::Inactive);
        }
        if !self.is_my_turn() {
            return Err(InvalidMove::NotYourTurn);
        }
        let mut next = self.board;
        next.place(index, self.symbol)?;
        Ok(next)
    }

    /// The view after this client's own write succeeded, ahead of the
    /// snapshot that will confirm it.
    pub fn with_patch(&self, patch: &RecordPatch) -> Self {
        let mut next = self.clone();
        if let (Some(player2), Player::X) = (&patch.player2, self.symbol) {
            next.opponent = non_empty(player2);
        }
        if let Some(turn) = patch.current_turn {
            next.current_turn = turn;
        }
        if let Some(board) = patch.board {
            next.board = board;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        next
    }
}

fn non_empty(name: &str) -> Option<String> {
    (!name.is_empty()).then(|| name.to_string())
}

/// Rebuilds the view from a fresh snapshot.
///
/// The board, turn and status are replaced wholesale. Identity fields
/// (game id, own symbol) carry over from `previous`.
pub fn reconcile(previous: &Mirror, record: &GameRecord) -> Mirror {
    let opponent = match previous.symbol {
        Player::X => non_empty(&record.player2),
        Player::O => non_empty(&record.player1),
    };
    Mirror {
        game_id: previous.game_id.clone(),
        symbol: previous.symbol,
        board: record.board,
        current_turn: record.current_turn,
        status: record.status,
        opponent: opponent.or_else(|| previous.opponent.clone()),
        closed: previous.closed,
    }
}

/// The view after the record disappeared.
pub fn reconcile_deleted(previous: &Mirror) -> Mirror {
    Mirror {
        closed: true,
        ..previous.clone()
    }
}
