//! Easy opponent: any empty cell, uniformly.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::Strategy;
use crate::board::Board;
use crate::types::Player;

/// Picks a uniformly random empty cell.
///
/// The random source is injectable so tests can seed it.
#[derive(Debug, Clone)]
pub struct RandomStrategy<R = StdRng> {
    rng: R,
}

impl RandomStrategy {
    /// Creates a strategy seeded from the OS.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a strategy with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomStrategy<R> {
    /// Creates a strategy drawing from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Picks an empty cell, or `None` on a full board.
    pub fn pick(&mut self, board: &Board) -> Option<usize> {
        board.empty_indices().choose(&mut self.rng).copied()
    }
}

impl<R: Rng> Strategy for RandomStrategy<R> {
    fn select_move(&mut self, board: &Board, _me: Player) -> Option<usize> {
        self.pick(board)
    }

    fn name(&self) -> &str {
        "Random"
    }
}
