//! Session and store error types.

use derive_more::{Display, Error};
use tracing::instrument;
use xando_engine::IllegalMove;

/// A move the session refused. Recovered locally; no state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum InvalidMove {
    /// The board refused the placement.
    #[display("{}", _0)]
    #[from]
    Illegal(IllegalMove),

    /// The other side owns the turn.
    #[display("It's not your turn")]
    NotYourTurn,

    /// The game already has an outcome.
    #[display("The game is already over")]
    GameOver,

    /// The computer's move is pending.
    #[display("Waiting for the computer to move")]
    AiThinking,

    /// The remote game is not active (no opponent yet, finished, or closed).
    #[display("The game is not active")]
    Inactive,
}

impl std::error::Error for InvalidMove {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvalidMove::Illegal(e) => Some(e),
            _ => None,
        }
    }
}

/// Document store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Serialization error: {}", err))
    }
}

/// Errors surfaced by local and remote sessions.
///
/// None of these are fatal: the session stays in its last known-good state.
#[derive(Debug, Clone, PartialEq, Eq, Display, derive_more::From)]
pub enum SessionError {
    /// Move rejected before anything was written.
    #[display("Invalid move: {}", _0)]
    #[from]
    InvalidMove(InvalidMove),

    /// Matchmaking query failed.
    #[display("Remote query failed: {}", _0)]
    RemoteQueryFailed(StoreError),

    /// A create, update or delete failed.
    #[display("Remote write failed: {}", _0)]
    RemoteWriteFailed(StoreError),

    /// Subscribing to the game record failed, or the subscription reported an error.
    #[display("Remote subscription failed: {}", _0)]
    RemoteSubscriptionFailed(StoreError),

    /// A snapshot could not be decoded into a game record.
    #[display("Malformed game record: {}", _0)]
    MalformedRecord(String),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::InvalidMove(e) => Some(e),
            SessionError::RemoteQueryFailed(e)
            | SessionError::RemoteWriteFailed(e)
            | SessionError::RemoteSubscriptionFailed(e) => Some(e),
            SessionError::MalformedRecord(_) => None,
        }
    }
}

impl From<IllegalMove> for SessionError {
    fn from(err: IllegalMove) -> Self {
        SessionError::InvalidMove(err.into())
    }
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

impl Eq for StoreError {}
