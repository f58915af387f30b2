//! The 3x3 board.

use serde::{Deserialize, Serialize};

use crate::error::IllegalMove;
use crate::types::{Cell, Player};

/// Number of cells on the board.
pub const CELLS: usize = 9;

/// 3x3 tic-tac-toe board.
///
/// Cells are indexed 0-8 in row-major order (row = index / 3, column = index % 3).
/// Serialized as a sequence of nine `""`/`"X"`/`"O"` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; CELLS],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from raw cells.
    pub fn from_cells(cells: [Cell; CELLS]) -> Self {
        Self { cells }
    }

    /// Gets the cell at the given index, or `None` past the last cell.
    pub fn cell_at(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Returns true if the index is on the board and the cell is empty.
    pub fn is_vacant(&self, index: usize) -> bool {
        matches!(self.cell_at(index), Some(Cell::Empty))
    }

    /// Returns all cells in index order.
    pub fn cells(&self) -> &[Cell; CELLS] {
        &self.cells
    }

    /// Places a mark.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMove`] if the index is out of range or the cell is
    /// occupied. The board is untouched in both cases.
    pub fn place(&mut self, index: usize, player: Player) -> Result<(), IllegalMove> {
        match self.cells.get_mut(index) {
            None => Err(IllegalMove::OutOfBounds(index)),
            Some(Cell::Occupied(_)) => Err(IllegalMove::Occupied(index)),
            Some(cell) => {
                *cell = Cell::Occupied(player);
                Ok(())
            }
        }
    }

    /// Checks if every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Indices of empty cells in ascending order.
    pub fn empty_indices(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of marks the player has on the board.
    pub fn count(&self, player: Player) -> usize {
        self.cells
            .iter()
            .filter(|c| c.player() == Some(player))
            .count()
    }

    /// Temporarily places `player` at `index`, runs `f`, then clears the cell again.
    ///
    /// Lookahead goes through here so every probe is reverted before the
    /// caller sees the board again.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMove`] without calling `f` if the placement is illegal.
    pub fn probe<R>(
        &mut self,
        index: usize,
        player: Player,
        f: impl FnOnce(&mut Board) -> R,
    ) -> Result<R, IllegalMove> {
        self.place(index, player)?;
        let result = f(self);
        self.cells[index] = Cell::Empty;
        Ok(result)
    }

    /// Formats the board as a human-readable grid.
    ///
    /// Empty cells show their 1-based number.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let index = row * 3 + col;
                let symbol = match self.cells[index] {
                    Cell::Empty => (index + 1).to_string(),
                    Cell::Occupied(player) => player.symbol().to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_on_empty_cell() {
        let mut board = Board::new();
        board.place(4, Player::X).unwrap();
        assert_eq!(board.cell_at(4), Some(Cell::Occupied(Player::X)));
        assert_eq!(board.empty_indices(), vec![0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn test_place_occupied_leaves_board_unchanged() {
        let mut board = Board::new();
        board.place(0, Player::X).unwrap();
        let before = board;

        assert_eq!(board.place(0, Player::O), Err(IllegalMove::Occupied(0)));
        assert_eq!(board, before);
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut board = Board::new();
        assert_eq!(board.place(9, Player::X), Err(IllegalMove::OutOfBounds(9)));
        assert_eq!(board, Board::new());
        assert_eq!(board.cell_at(9), None);
    }

    #[test]
    fn test_probe_reverts() {
        let mut board = Board::new();
        board.place(0, Player::X).unwrap();

        let seen = board
            .probe(8, Player::O, |b| {
                b.probe(4, Player::X, |inner| inner.count(Player::X)).unwrap()
            })
            .unwrap();

        assert_eq!(seen, 2);
        assert_eq!(board.empty_indices().len(), 8);
        assert!(board.is_vacant(8));
        assert!(board.is_vacant(4));
    }

    #[test]
    fn test_probe_rejects_occupied() {
        let mut board = Board::new();
        board.place(3, Player::O).unwrap();
        let mut called = false;
        let result = board.probe(3, Player::X, |_| called = true);
        assert_eq!(result, Err(IllegalMove::Occupied(3)));
        assert!(!called);
        assert_eq!(board.cell_at(3), Some(Cell::Occupied(Player::O)));
    }

    #[test]
    fn test_display() {
        let mut board = Board::new();
        board.place(0, Player::X).unwrap();
        board.place(4, Player::O).unwrap();
        assert_eq!(board.display(), "X|2|3\n-+-+-\n4|O|6\n-+-+-\n7|8|9");
    }

    #[test]
    fn test_serializes_as_symbol_sequence() {
        let mut board = Board::new();
        board.place(1, Player::O).unwrap();
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"["","O","","","","","","",""]"#);
        assert_eq!(serde_json::from_str::<Board>(&json).unwrap(), board);
    }
}
