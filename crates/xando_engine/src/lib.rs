//! xando engine - pure tic-tac-toe logic.
//!
//! # Architecture
//!
//! - **Board**: nine cells in row-major order, mutated only through `place`
//! - **Rules**: win/draw classification over the eight fixed lines
//! - **AI**: random, one-ply heuristic and minimax opponents
//!
//! # Example
//!
//! ```
//! use xando_engine::{Board, Difficulty, Outcome, Player, Strategy, evaluate};
//!
//! let mut board = Board::new();
//! board.place(4, Player::X).unwrap();
//!
//! let mut ai = Difficulty::Hard.strategy();
//! let reply = ai.select_move(&board, Player::O).unwrap();
//! board.place(reply, Player::O).unwrap();
//!
//! assert_eq!(evaluate(&board), Outcome::InProgress);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod ai;
mod board;
mod error;
mod rules;
mod types;

pub use ai::{
    AiStrategy, Difficulty, HeuristicStrategy, MinimaxStrategy, RandomStrategy, Strategy,
    best_move, score_moves, winning_move,
};
pub use board::{Board, CELLS};
pub use error::IllegalMove;
pub use rules::{LINES, check_winner, evaluate, is_draw, is_full, winning_line};
pub use types::{Cell, Outcome, Player};
