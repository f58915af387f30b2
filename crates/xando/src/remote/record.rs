//! The shared game record and its document encoding.
//!
//! Field names on the wire: `player1`, `player2`, `currentTurn`, `board`,
//! `status`. Cells are `""`, `"X"` or `"O"`; an empty `player2` means the
//! second seat is open.

use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use xando_engine::{Board, Player};

use super::store::{Document, Query};
use crate::error::{SessionError, StoreError};

/// Lifecycle of a shared game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordStatus {
    /// Created, second seat open.
    Waiting,
    /// Both seats filled.
    #[default]
    Active,
    /// A terminal outcome was detected.
    Finished,
}

/// The document two clients share for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Name of the creating client (plays X).
    #[serde(default)]
    pub player1: String,
    /// Name of the joining client (plays O); empty while open.
    #[serde(default)]
    pub player2: String,
    /// Mark whose move it is.
    #[serde(default = "first_turn")]
    pub current_turn: Player,
    /// The nine cells.
    pub board: Board,
    /// Lifecycle state.
    #[serde(default)]
    pub status: RecordStatus,
}

fn first_turn() -> Player {
    Player::X
}

impl GameRecord {
    /// A fresh record with the second seat open.
    pub fn waiting(player1: impl Into<String>) -> Self {
        Self {
            player1: player1.into(),
            player2: String::new(),
            current_turn: Player::X,
            board: Board::new(),
            status: RecordStatus::Waiting,
        }
    }

    /// True while a second client may join.
    pub fn is_open(&self) -> bool {
        self.player2.is_empty() && self.status == RecordStatus::Waiting
    }

    /// Applies a partial update in place, as the store would.
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(player2) = &patch.player2 {
            self.player2 = player2.clone();
        }
        if let Some(turn) = patch.current_turn {
            self.current_turn = turn;
        }
        if let Some(board) = patch.board {
            self.board = board;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    /// Encodes the record as a store document.
    pub fn to_document(&self) -> Result<Document, StoreError> {
        into_document(serde_json::to_value(self)?)
    }

    /// Decodes a store document.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MalformedRecord`] if the board is missing or
    /// not nine valid cells, or any present field has the wrong type.
    pub fn from_document(document: Document) -> Result<Self, SessionError> {
        serde_json::from_value(Value::Object(document))
            .map_err(|e| SessionError::MalformedRecord(e.to_string()))
    }
}

/// Query matching records a second client can join.
pub fn open_games_query() -> Query {
    Query::new()
        .where_eq("player2", "")
        .where_eq("status", RecordStatus::Waiting.to_string())
        .limit(1)
}

/// A partial record update. Only the fields that are set are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Setters)]
#[serde(rename_all = "camelCase")]
#[setters(prefix = "with_", strip_option)]
pub struct RecordPatch {
    /// New second seat holder.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[setters(into)]
    pub player2: Option<String>,
    /// New turn owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_turn: Option<Player>,
    /// New board.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

impl RecordPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes the set fields as a store document.
    pub fn to_document(&self) -> Result<Document, StoreError> {
        into_document(serde_json::to_value(self)?)
    }
}

fn into_document(value: Value) -> Result<Document, StoreError> {
    match value {
        Value::Object(document) => Ok(document),
        other => Err(StoreError::new(format!(
            "Expected a JSON object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_waiting_record_wire_shape() {
        let document = GameRecord::waiting("Player_ab12c").to_document().unwrap();
        assert_eq!(
            Value::Object(document),
            json!({
                "player1": "Player_ab12c",
                "player2": "",
                "currentTurn": "X",
                "board": ["", "", "", "", "", "", "", "", ""],
                "status": "waiting",
            })
        );
    }

    #[test]
    fn test_patch_only_writes_set_fields() {
        let patch = RecordPatch::new()
            .with_current_turn(Player::O)
            .with_status(RecordStatus::Finished);
        assert_eq!(
            Value::Object(patch.to_document().unwrap()),
            json!({"currentTurn": "O", "status": "finished"})
        );
    }

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        let document = match json!({"board": ["X", "", "", "", "", "", "", "", ""]}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let record = GameRecord::from_document(document).unwrap();
        assert_eq!(record.current_turn, Player::X);
        assert_eq!(record.status, RecordStatus::Active);
        assert_eq!(record.player2, "");
    }

    #[test]
    fn test_short_board_is_malformed() {
        let document = match json!({"board": ["X", "O"], "currentTurn": "X"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert!(matches!(
            GameRecord::from_document(document),
            Err(SessionError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_apply_patch() {
        let mut record = GameRecord::waiting("a");
        record.apply(&RecordPatch::new().with_player2("b").with_status(RecordStatus::Active));
        assert_eq!(record.player2, "b");
        assert_eq!(record.status, RecordStatus::Active);
        assert!(!record.is_open());
    }

    #[test]
    fn test_open_query_matches_waiting_record() {
        let document = GameRecord::waiting("a").to_document().unwrap();
        assert!(open_games_query().matches(&document));

        let mut joined = GameRecord::waiting("a");
        joined.apply(&RecordPatch::new().with_player2("b"));
        assert!(!open_games_query().matches(&joined.to_document().unwrap()));
    }
}
