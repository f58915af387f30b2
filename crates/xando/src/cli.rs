//! Command-line interface for xando.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use xando::{Difficulty, GameMode};

/// xando - tic-tac-toe against a friend, the computer, or another client
#[derive(Parser, Debug)]
#[command(name = "xando")]
#[command(about = "Tic-tac-toe with computer and shared-store opponents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play on this terminal
    Play {
        /// Two humans, or one human against the computer
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Computer strength in solo mode
        #[arg(long, value_enum)]
        difficulty: Option<DifficultyArg>,

        /// Pause before the computer answers, in milliseconds
        #[arg(long)]
        ai_delay_ms: Option<u64>,
    },

    /// Run two computer clients against each other through an in-memory store
    OnlineDemo {
        /// Strength of the client that plays X
        #[arg(long, value_enum, default_value = "hard")]
        x: DifficultyArg,

        /// Strength of the client that plays O
        #[arg(long, value_enum, default_value = "medium")]
        o: DifficultyArg,
    },
}

/// Play mode as typed on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// One human against the computer
    Solo,
    /// Two humans sharing one board
    OfflineMulti,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Solo => GameMode::Solo,
            ModeArg::OfflineMulti => GameMode::OfflineMulti,
        }
    }
}

/// Difficulty as typed on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyArg {
    /// Random moves
    Easy,
    /// Wins or blocks when it can
    Medium,
    /// Full minimax search
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(difficulty: DifficultyArg) -> Self {
        match difficulty {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}
