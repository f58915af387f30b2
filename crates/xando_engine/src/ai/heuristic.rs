//! Medium opponent: one ply of lookahead.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{RandomStrategy, Strategy};
use crate::board::Board;
use crate::rules::check_winner;
use crate::types::Player;

/// Returns the lowest empty index where `player` would complete a line.
pub fn winning_move(board: &Board, player: Player) -> Option<usize> {
    let mut scratch = *board;
    board.empty_indices().into_iter().find(|&i| {
        scratch
            .probe(i, player, |b| check_winner(b) == Some(player))
            .unwrap_or(false)
    })
}

/// Wins if it can, blocks if it must, otherwise plays randomly.
///
/// Not optimal: it cannot see forks and will lose to a perfect opponent.
#[derive(Debug, Clone)]
pub struct HeuristicStrategy<R = StdRng> {
    fallback: RandomStrategy<R>,
}

impl HeuristicStrategy {
    /// Creates a strategy whose random fallback is seeded from the OS.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> HeuristicStrategy<R> {
    /// Creates a strategy whose random fallback draws from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            fallback: RandomStrategy::with_rng(rng),
        }
    }
}

impl<R: Rng> Strategy for HeuristicStrategy<R> {
    fn select_move(&mut self, board: &Board, me: Player) -> Option<usize> {
        winning_move(board, me)
            .or_else(|| winning_move(board, me.opponent()))
            .or_else(|| self.fallback.pick(board))
    }

    fn name(&self) -> &str {
        "Heuristic"
    }
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
    fn test_takes_win_over_block() {
        // O can win at 5, X threatens at 2.
        let b = board(&[0, 1], &[3, 4]);
        let mut strategy = HeuristicStrategy::with_rng(StdRng::seed_from_u64(3));
        assert_eq!(strategy.select_move(&b, Player::O), Some(5));
    }

    #[test]
    fn test_blocks_threat() {
        let b = board(&[0, 1], &[4]);
        let mut strategy = HeuristicStrategy::with_rng(StdRng::seed_from_u64(3));
        assert_eq!(strategy.select_move(&b, Player::O), Some(2));
    }

    #[test]
    fn test_lowest_winning_index_first() {
        // X wins at 2 (top row) or 6 (left column).
        let b = board(&[0, 1, 3], &[4, 8]);
        assert_eq!(winning_move(&b, Player::X), Some(2));
    }

    #[test]
    fn test_board_unchanged_after_lookahead() {
        let b = board(&[0, 1], &[4]);
        let before = b;
        let _ = winning_move(&b, Player::X);
        let _ = winning_move(&b, Player::O);
        assert_eq!(b, before);
    }

    #[test]
    fn test_center_opening_falls_back_to_random() {
        let b = board(&[4], &[]);
        for seed in 0..20 {
            let mut strategy = HeuristicStrategy::with_rng(StdRng::seed_from_u64(seed));
            let choice = strategy.select_move(&b, Player::O).unwrap();
            assert_ne!(choice, 4);
            assert!(b.is_vacant(choice));
        }
    }
}
