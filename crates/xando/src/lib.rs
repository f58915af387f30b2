//! xando - tic-tac-toe sessions on top of `xando_engine`.
//!
//! # Architecture
//!
//! - **Local**: one board shared by two humans, or a human against the computer
//! - **Remote**: matchmaking and move sync through a shared document store
//! - **Config**: TOML settings for mode, difficulty and pacing
//!
//! # Example
//!
//! ```
//! use xando::{Difficulty, LocalSession, Phase, COMPUTER};
//!
//! let mut session = LocalSession::solo(Difficulty::Hard);
//! assert_eq!(session.play(0), Ok(Phase::Thinking(COMPUTER)));
//! session.complete_ai_turn().unwrap();
//! assert_eq!(session.history().len(), 2);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod local;
mod remote;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig, GameMode};

// Crate-level exports - Errors
pub use error::{InvalidMove, SessionError, StoreError};

// Crate-level exports - Local play
pub use local::{
    COMPUTER, GameClosed, HUMAN, LocalCommand, LocalEvent, LocalGame, LocalSession, Phase,
};

// Crate-level exports - Remote play
pub use remote::{
    Change, Document, DocumentId, DocumentStore, GameRecord, InMemoryStore, Mirror, Query,
    RecordPatch, RecordStatus, RemoteCommand, RemoteEvent, RemoteGame, RemoteSession,
    Subscription, SubscriptionId, generate_game_id, generate_identity, open_games_query,
    reconcile, reconcile_deleted,
};

// Crate-level exports - Engine types
pub use xando_engine::{
    AiStrategy, Board, Cell, Difficulty, IllegalMove, Outcome, Player, Strategy, evaluate,
};
