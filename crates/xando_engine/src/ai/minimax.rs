//! Hard opponent: exhaustive minimax.
//!
//! The 3x3 game tree is small enough to search to every terminal state
//! without pruning. Scores are from the searching player's point of view:
//! a win `d` plies below the candidate move scores `10 - d`, a loss
//! `d - 10`, a draw `0`. Faster wins and slower losses are preferred.

use super::Strategy;
use crate::board::Board;
use crate::rules::evaluate;
use crate::types::{Outcome, Player};

const WIN_SCORE: i32 = 10;

/// Never-losing minimax player.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimaxStrategy;

impl Strategy for MinimaxStrategy {
    fn select_move(&mut self, board: &Board, me: Player) -> Option<usize> {
        best_move(board, me)
    }

    fn name(&self) -> &str {
        "Minimax"
    }
}

/// Scores every empty cell for `me`, in ascending index order.
pub fn score_moves(board: &Board, me: Player) -> Vec<(usize, i32)> {
    let mut scratch = *board;
    board
        .empty_indices()
        .into_iter()
        .filter_map(|i| {
            scratch
                .probe(i, me, |b| minimax(b, me, me.opponent(), 0))
                .ok()
                .map(|score| (i, score))
        })
        .collect()
}

/// Returns the highest scoring cell; ties go to the lowest index.
pub fn best_move(board: &Board, me: Player) -> Option<usize> {
    score_moves(board, me)
        .into_iter()
        .fold(None, |best: Option<(usize, i32)>, (i, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((i, score)),
        })
        .map(|(i, _)| i)
}

fn minimax(board: &mut Board, me: Player, to_move: Player, depth: i32) -> i32 {
    match evaluate(board) {
        Outcome::Win(winner) if winner == me => return WIN_SCORE - depth,
        Outcome::Win(_) => return depth - WIN_SCORE,
        Outcome::Draw => return 0,
        Outcome::InProgress => {}
    }

    let scores = board.empty_indices().into_iter().filter_map(|i| {
        board
            .probe(i, to_move, |b| minimax(b, me, to_move.opponent(), depth + 1))
            .ok()
    });

    let best = if to_move == me {
        scores.max()
    } else {
        scores.min()
    };
    best.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(xs: &[usize], os: &[usize]) -> Board {
        let mut board = Board::new();
        for &i in xs {
            board.place(i, Player::X).unwrap();
        }
        for &i in os {
            board.place(i, Player::O).unwrap();
        }
        board
    }

    #[test]
    fn test_immediate_win_scores_ten() {
        let b = board(&[0, 1], &[3, 4]);
        let scores = score_moves(&b, Player::X);
        assert_eq!(scores.iter().find(|(i, _)| *i == 2), Some(&(2, 10)));
        assert_eq!(best_move(&b, Player::X), Some(2));
    }

    #[test]
    fn test_faster_win_scores_higher() {
        // Immediate win at 2.
        let fast = board(&[0, 1], &[3, 4]);
        // No immediate win, but 3 (or 6) forks and wins two plies later.
        let slow = board(&[0, 4], &[1, 8]);

        let top = |b: &Board| score_moves(b, Player::X).into_iter().map(|(_, s)| s).max();
        assert_eq!(top(&fast), Some(10));
        assert_eq!(top(&slow), Some(8));
        assert_eq!(best_move(&slow, Player::X), Some(3));
    }

    #[test]
    fn test_blocks_when_no_win() {
        let b = board(&[0, 1], &[4]);
        assert_eq!(best_move(&b, Player::O), Some(2));
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        // Every opening draws with perfect play, so the first cell wins the tie.
        assert_eq!(best_move(&Board::new(), Player::X), Some(0));
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let b = board(&[4], &[0]);
        let before = b;
        let _ = score_moves(&b, Player::X);
        assert_eq!(b, before);
    }
}
