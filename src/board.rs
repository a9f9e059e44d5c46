//! Game board representation and collision detection

use crate::piece::Piece;

/// Board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// The grid of locked cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top, row increases downward
    cells: [[bool; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[false; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    fn in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < BOARD_WIDTH && (y as usize) < BOARD_HEIGHT
    }

    /// Whether the cell at column `x`, row `y` is locked.
    /// Out of bounds reads as unoccupied.
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        Self::in_bounds(x, y) && self.cells[y as usize][x as usize]
    }

    /// Set a cell at a position
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, occupied: bool) -> bool {
        if !Self::in_bounds(x, y) {
            return false;
        }
        self.cells[y as usize][x as usize] = occupied;
        true
    }

    /// Check that every cell of the piece is within bounds and not locked
    pub fn is_valid_position(&self, piece: &Piece) -> bool {
        piece
            .cells()
            .all(|(x, y)| Self::in_bounds(x, y) && !self.cells[y as usize][x as usize])
    }

    /// Lock a piece onto the board. Cells outside the grid are ignored.
    pub fn commit(&mut self, piece: &Piece) {
        for (x, y) in piece.cells() {
            self.set(x, y, true);
        }
    }

    /// Clear completed lines and return the number cleared
    pub fn clear_full_lines(&mut self) -> usize {
        let mut lines_cleared = 0;
        let mut write_row = BOARD_HEIGHT;

        for read_row in (0..BOARD_HEIGHT).rev() {
            if self.is_line_full(read_row) {
                lines_cleared += 1;
                continue;
            }
            // Keep this line, packed down under the survivors below it
            write_row -= 1;
            if write_row != read_row {
                self.cells[write_row] = self.cells[read_row];
            }
        }

        // Fill the top with empty rows
        for row in 0..write_row {
            self.cells[row] = [false; BOARD_WIDTH];
        }

        lines_cleared
    }

    /// Check if a line is completely filled
    fn is_line_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|&cell| cell)
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|row| row.iter().all(|&cell| !cell))
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool; BOARD_WIDTH]> {
        self.cells.iter()
    }
}
