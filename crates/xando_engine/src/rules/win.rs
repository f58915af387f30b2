//! Win detection logic for tic-tac-toe.

use tracing::instrument;

use crate::board::Board;
use crate::types::Player;

/// The eight winning triples in evaluation order: rows, columns, diagonals.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the first completed line and its owner.
#[instrument(level = "trace", skip(board), ret)]
pub fn winning_line(board: &Board) -> Option<([usize; 3], Player)> {
    LINES.iter().find_map(|&line| {
        let [a, b, c] = line.map(|i| board.cells()[i]);
        match a.player() {
            Some(player) if a == b && b == c => Some((line, player)),
            _ => None,
        }
    })
}

/// Checks if there is a winner on the board.
///
/// Returns `Some(player)` if the player has three in a row,
/// `None` otherwise.
#[instrument(level = "trace", skip(board))]
pub fn check_winner(board: &Board) -> Option<Player> {
    winning_line(board).map(|(_, player)| player)
}
