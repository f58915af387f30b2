//! Computer opponents.
//!
//! Three interchangeable move-selection policies of increasing strength,
//! selected by [`Difficulty`]. Every policy takes the board by shared
//! reference and does its lookahead on a private copy, so the caller's
//! board only changes when the caller applies the returned move.

mod heuristic;
mod minimax;
mod random;

pub use heuristic::{HeuristicStrategy, winning_move};
pub use minimax::{MinimaxStrategy, best_move, score_moves};
pub use random::RandomStrategy;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::board::Board;
use crate::types::Player;

/// A move-selection policy.
pub trait Strategy {
    /// Chooses a cell for `me` to play.
    ///
    /// Returns `None` only when the board has no empty cell.
    fn select_move(&mut self, board: &Board, me: Player) -> Option<usize>;

    /// Returns the policy's display name.
    fn name(&self) -> &str;
}

/// Strength of the computer opponent.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Difficulty {
    /// Uniformly random empty cell.
    Easy,
    /// Win if possible, else block, else random.
    #[default]
    Medium,
    /// Exhaustive minimax. Never loses.
    Hard,
}

impl Difficulty {
    /// Builds the strategy for this difficulty with an entropy-seeded RNG.
    #[instrument]
    pub fn strategy(self) -> AiStrategy {
        self.strategy_with_rng(StdRng::from_entropy())
    }

    /// Builds the strategy for this difficulty with the given random source.
    pub fn strategy_with_rng<R: Rng>(self, rng: R) -> AiStrategy<R> {
        match self {
            Difficulty::Easy => AiStrategy::Random(RandomStrategy::with_rng(rng)),
            Difficulty::Medium => AiStrategy::Heuristic(HeuristicStrategy::with_rng(rng)),
            Difficulty::Hard => AiStrategy::Minimax(MinimaxStrategy),
        }
    }
}

/// Strategy chosen by difficulty.
#[derive(Debug, Clone)]
pub enum AiStrategy<R = StdRng> {
    /// Easy.
    Random(RandomStrategy<R>),
    /// Medium.
    Heuristic(HeuristicStrategy<R>),
    /// Hard.
    Minimax(MinimaxStrategy),
}

impl<R> AiStrategy<R> {
    /// Returns the difficulty this strategy implements.
    pub fn difficulty(&self) -> Difficulty {
        match self {
            AiStrategy::Random(_) => Difficulty::Easy,
            AiStrategy::Heuristic(_) => Difficulty::Medium,
            AiStrategy::Minimax(_) => Difficulty::Hard,
        }
    }
}

impl<R: Rng> Strategy for AiStrategy<R> {
    #[instrument(level = "debug", skip(self, board), fields(difficulty = %self.difficulty()))]
    fn select_move(&mut self, board: &Board, me: Player) -> Option<usize> {
        let choice = match self {
            AiStrategy::Random(s) => s.select_move(board, me),
            AiStrategy::Heuristic(s) => s.select_move(board, me),
            AiStrategy::Minimax(s) => s.select_move(board, me),
        };
        debug!(?choice, "AI chose cell");
        choice
    }

    fn name(&self) -> &str {
        match self {
            AiStrategy::Random(s) => s.name(),
            AiStrategy::Heuristic(s) => s.name(),
            AiStrategy::Minimax(s) => s.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parses_config_values() {
        assert_eq!("EASY".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("IMPOSSIBLE".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::default(), Difficulty::Medium);
        assert_eq!(Difficulty::Medium.to_string(), "MEDIUM");
    }

    #[test]
    fn test_strategy_matches_difficulty() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let strategy = difficulty.strategy_with_rng(StdRng::seed_from_u64(1));
            assert_eq!(strategy.difficulty(), difficulty);
        }
    }

    #[test]
    fn test_full_board_yields_none() {
        let mut board = Board::new();
        for (i, p) in [
            Player::X,
            Player::O,
            Player::X,
            Player::O,
            Player::X,
            Player::O,
            Player::O,
            Player::X,
            Player::O,
        ]
        .into_iter()
        .enumerate()
        {
            board.place(i, p).unwrap();
        }
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let mut strategy = difficulty.strategy_with_rng(StdRng::seed_from_u64(7));
            assert_eq!(strategy.select_move(&board, Player::O), None);
        }
    }
}
