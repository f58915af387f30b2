//! Game rules for tic-tac-toe.
//!
//! Pure functions that classify a board. Nothing here caches results, so
//! an [`Outcome`] always reflects the board it was computed from.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, check_winner, winning_line};

use tracing::instrument;

use crate::board::Board;
use crate::types::Outcome;

/// Classifies the board.
///
/// A completed line wins (first match in [`LINES`] order). Otherwise a full
/// board is a draw, and anything else is still in progress.
#[instrument(level = "trace", skip(board), ret)]
pub fn evaluate(board: &Board) -> Outcome {
    if let Some(winner) = check_winner(board) {
        Outcome::Win(winner)
    } else if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
