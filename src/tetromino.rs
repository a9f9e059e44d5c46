//! Tetromino definitions and shapes
//!
//! The 7 standard tetrominoes stored as small boolean matrices, plus the
//! clockwise rotation used by the active piece.

/// Largest bounding box any shape (or its rotation) can occupy
pub const MAX_SHAPE_SIZE: usize = 4;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // long bar
    O, // square
    T, // T-shape
    S, // S-shape
    Z, // Z-shape
    J, // J-shape
    L, // L-shape
}

impl TetrominoType {
    /// All tetromino types, in catalog order
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Get the spawn template for this tetromino
    pub fn shape(&self) -> Shape {
        match self {
            TetrominoType::I => Shape::from_rows(&[&[1, 1, 1, 1]]),
            TetrominoType::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            TetrominoType::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
            // S: .SS
            //    SS.
            TetrominoType::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
            // Z: ZZ.
            //    .ZZ
            TetrominoType::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
            TetrominoType::J => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
            TetrominoType::L => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1]]),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TetrominoType::I => "I",
            TetrominoType::O => "O",
            TetrominoType::T => "T",
            TetrominoType::S => "S",
            TetrominoType::Z => "Z",
            TetrominoType::J => "J",
            TetrominoType::L => "L",
        }
    }
}

/// The catalog of shape templates, one per tetromino type
#[allow(dead_code)]
pub fn catalog() -> [Shape; 7] {
    TetrominoType::all().map(|kind| kind.shape())
}

/// A boolean occupancy matrix inside a `rows` x `cols` bounding box.
///
/// Cells outside the bounding box are always `false`, so two shapes compare
/// equal exactly when their boxes and occupied cells match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
    rows: usize,
    cols: usize,
}

impl Shape {
    /// Build a shape from rows of 0/1 values. All rows must be the same length.
    fn from_rows(rows: &[&[u8]]) -> Self {
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (i, row) in rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                cells[i][j] = value != 0;
            }
        }
        Self {
            cells,
            rows: rows.len(),
            cols: rows.first().map_or(0, |row| row.len()),
        }
    }

    /// Bounding box width (columns)
    pub fn width(&self) -> usize {
        self.cols
    }

    /// Bounding box height (rows)
    #[allow(dead_code)]
    pub fn height(&self) -> usize {
        self.rows
    }

    /// Iterate the occupied cells as (row, col) offsets inside the bounding box
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols)
                .filter(move |&col| self.cells[row][col])
                .map(move |col| (row, col))
        })
    }

    /// Rotate 90° clockwise: an R x C shape becomes C x R with
    /// `new[j][R - 1 - i] = old[i][j]`.
    pub fn rotated(&self) -> Shape {
        let mut out = Shape {
            cells: [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
            rows: self.cols,
            cols: self.rows,
        };
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.cells[j][self.rows - 1 - i] = self.cells[i][j];
            }
        }
        out
    }
}
