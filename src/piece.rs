//! Active falling piece logic

use crate::board::{Board, BOARD_WIDTH};
use crate::tetromino::{Shape, TetrominoType};

/// An active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino this piece was spawned from
    pub piece_type: TetrominoType,
    /// Private copy of the shape, rotated independently of the catalog
    pub shape: Shape,
    /// Position (x, y) of the top-left corner of the shape's bounding box
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Create a new piece at spawn position: horizontally centered on the top row
    pub fn new(piece_type: TetrominoType) -> Self {
        let shape = piece_type.shape();
        let x = (BOARD_WIDTH / 2) as i32 - (shape.width() / 2) as i32;
        Self::at(piece_type, shape, x, 0)
    }

    pub fn at(piece_type: TetrominoType, shape: Shape, x: i32, y: i32) -> Self {
        Self {
            piece_type,
            shape,
            x,
            y,
        }
    }

    /// Absolute (x, y) board coordinates of every occupied cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .filled()
            .map(|(row, col)| (self.x + col as i32, self.y + row as i32))
    }

    /// Copy of this piece moved by (dx, dy)
    pub fn shifted(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Copy of this piece rotated clockwise in place (no wall kick)
    pub fn rotated(self) -> Self {
        Self {
            shape: self.shape.rotated(),
            ..self
        }
    }
}

/// A speculative change to the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    MoveLeft,
    MoveRight,
    Rotate,
    Fall,
}

impl Transform {
    pub fn apply(self, piece: Piece) -> Piece {
        match self {
            Transform::MoveLeft => piece.shifted(-1, 0),
            Transform::MoveRight => piece.shifted(1, 0),
            Transform::Rotate => piece.rotated(),
            Transform::Fall => piece.shifted(0, 1),
        }
    }
}

/// Apply `transform` to a copy of `piece` and return it only if the board accepts it.
/// The original piece is never touched, so a rejected move leaves no trace.
pub fn try_apply(transform: Transform, piece: &Piece, board: &Board) -> Option<Piece> {
    let candidate = transform.apply(*piece);
    board.is_valid_position(&candidate).then_some(candidate)
}
