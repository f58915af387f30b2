//! Local game state machine.
//!
//! Drives turn alternation on one shared board. In solo mode every accepted
//! human move hands the turn to the computer; the caller decides when the
//! computer actually answers by calling [`LocalSession::complete_ai_turn`].

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument, warn};
use xando_engine::{AiStrategy, Board, Difficulty, Outcome, Player, Strategy, evaluate};

use crate::config::{GameConfig, GameMode};
use crate::error::InvalidMove;

/// Mark played by the human in solo mode.
pub const HUMAN: Player = Player::X;

/// Mark played by the computer in solo mode.
pub const COMPUTER: Player = Player::O;

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a human to place this mark.
    AwaitingMove(Player),
    /// The computer owes a move with this mark.
    Thinking(Player),
    /// The board has an outcome; only reset is accepted.
    Terminal(Outcome),
}

/// One local game.
#[derive(Debug, Clone)]
pub struct LocalSession<R = StdRng> {
    mode: GameMode,
    board: Board,
    phase: Phase,
    ai: Option<AiStrategy<R>>,
    history: Vec<(usize, Player)>,
}

impl LocalSession {
    /// Creates a two-player game.
    #[instrument]
    pub fn offline_multi() -> Self {
        info!("Creating two-player local session");
        Self::build(GameMode::OfflineMulti, None)
    }

    /// Creates a game against the computer at the given strength.
    #[instrument]
    pub fn solo(difficulty: Difficulty) -> Self {
        Self::solo_with_strategy(difficulty.strategy())
    }

    /// Creates a session from configuration.
    #[instrument(skip(config), fields(mode = %config.mode(), difficulty = %config.difficulty()))]
    pub fn from_config(config: &GameConfig) -> Self {
        match config.mode() {
            GameMode::Solo => Self::solo(*config.difficulty()),
            GameMode::OfflineMulti => Self::offline_multi(),
        }
    }
}

impl<R: Rng> LocalSession<R> {
    /// Creates a game against the given computer strategy.
    pub fn solo_with_strategy(ai: AiStrategy<R>) -> Self {
        info!(difficulty = %ai.difficulty(), "Creating solo local session");
        Self::build(GameMode::Solo, Some(ai))
    }

    fn build(mode: GameMode, ai: Option<AiStrategy<R>>) -> Self {
        Self {
            mode,
            board: Board::new(),
            phase: Phase::AwaitingMove(Self::first_player(mode)),
            ai,
            history: Vec::new(),
        }
    }

    fn first_player(mode: GameMode) -> Player {
        match mode {
            GameMode::Solo => HUMAN,
            GameMode::OfflineMulti => Player::X,
        }
    }

    /// Applies a human move.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMove`] if the cell is taken or out of range, the game
    /// is over, or the computer's move is pending. State is unchanged.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn play(&mut self, index: usize) -> Result<Phase, InvalidMove> {
        let player = match self.phase {
            Phase::AwaitingMove(player) => player,
            Phase::Thinking(_) => {
                warn!(index, "Move attempted while computer is thinking");
                return Err(InvalidMove::AiThinking);
            }
            Phase::Terminal(_) => {
                warn!(index, "Move attempted after game over");
                return Err(InvalidMove::GameOver);
            }
        };

        self.board.place(index, player).inspect_err(|e| {
            warn!(index, error = %e, "Rejected move");
        })?;
        self.history.push((index, player));
        debug!(index, ?player, "Move applied");

        self.phase = match evaluate(&self.board) {
            Outcome::InProgress => match self.mode {
                GameMode::OfflineMulti => Phase::AwaitingMove(player.opponent()),
                GameMode::Solo => Phase::Thinking(COMPUTER),
            },
            outcome => self.finish(outcome),
        };
        Ok(self.phase)
    }

    /// Computes and applies the computer's pending move.
    ///
    /// This is the continuation scheduled after a human move in solo mode.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMove::NotYourTurn`] if no computer move is pending.
    #[instrument(skip(self))]
    pub fn complete_ai_turn(&mut self) -> Result<Phase, InvalidMove> {
        let (Phase::Thinking(mark), Some(ai)) = (self.phase, self.ai.as_mut()) else {
            return Err(InvalidMove::NotYourTurn);
        };

        let Some(index) = ai.select_move(&self.board, mark) else {
            let outcome = evaluate(&self.board);
            self.phase = self.finish(outcome);
            return Ok(self.phase);
        };
        self.board.place(index, mark)?;
        self.history.push((index, mark));
        debug!(index, ?mark, "Computer move applied");

        self.phase = match evaluate(&self.board) {
            Outcome::InProgress => Phase::AwaitingMove(HUMAN),
            outcome => self.finish(outcome),
        };
        Ok(self.phase)
    }

    fn finish(&self, outcome: Outcome) -> Phase {
        info!(%outcome, moves = self.history.len(), "Game over");
        Phase::Terminal(outcome)
    }

    /// Returns to the initial state. Always permitted.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!("Resetting local session");
        self.board = Board::new();
        self.history.clear();
        self.phase = Phase::AwaitingMove(Self::first_player(self.mode));
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Outcome of the current board.
    pub fn outcome(&self) -> Outcome {
        evaluate(&self.board)
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Moves played since the last reset, in order.
    pub fn history(&self) -> &[(usize, Player)] {
        &self.history
    }

    /// Play mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Computer strength, in solo mode.
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.ai.as_ref().map(|ai| ai.difficulty())
    }

    /// Mark whose move is awaited, human or computer.
    pub fn active_player(&self) -> Option<Player> {
        match self.phase {
            Phase::AwaitingMove(player) | Phase::Thinking(player) => Some(player),
            Phase::Terminal(_) => None,
        }
    }

    /// True until the board has an outcome.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Terminal(_))
    }
}
