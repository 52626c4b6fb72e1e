//! Square game board.

use super::Mark;
use crate::GameError;
use serde::{Serialize, Serializer};

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Square {
    /// Nobody has played here.
    Empty,
    /// Cell holds a player's mark.
    Occupied(Mark),
}

/// `size × size` grid of squares, addressed as `(row, column)`.
///
/// The size is fixed at construction; cells are only ever filled, never cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    /// Squares in row-major order.
    squares: Vec<Square>,
}

impl Board {
    /// Creates an empty board.
    ///
    /// `size` is bounded by the caller; see `SessionService::create_game`.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            squares: vec![Square::Empty; size * size],
        }
    }

    /// Length of one side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `(x, y)` lies on the board.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    /// Returns the square at `(x, y)`, or `None` when off the board.
    pub fn get(&self, x: usize, y: usize) -> Option<Square> {
        self.contains(x, y).then(|| self.squares[x * self.size + y])
    }

    /// Checks if a square is on the board and empty.
    pub fn is_empty(&self, x: usize, y: usize) -> bool {
        matches!(self.get(x, y), Some(Square::Empty))
    }

    /// Writes `mark` into an empty in-bounds cell.
    ///
    /// # Errors
    ///
    /// [`GameError::OutOfBounds`] or [`GameError::OccupiedCell`]; the board is
    /// untouched in both cases.
    pub fn place(&mut self, x: usize, y: usize, mark: Mark) -> Result<(), GameError> {
        match self.get(x, y) {
            None => Err(GameError::OutOfBounds {
                x,
                y,
                size: self.size,
            }),
            Some(Square::Occupied(_)) => Err(GameError::OccupiedCell { x, y }),
            Some(Square::Empty) => {
                self.squares[x * self.size + y] = Square::Occupied(mark);
                Ok(())
            }
        }
    }

    /// All squares in row-major order.
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Iterates rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Square]> {
        self.squares.chunks(self.size.max(1))
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.squares.iter().filter(|s| **s != Square::Empty).count()
    }

    /// Formats the board as a human-readable grid, `.` for empty cells.
    pub fn display(&self) -> String {
        self.rows()
            .map(|row| {
                row.iter()
                    .map(|square| match square {
                        Square::Empty => ".",
                        Square::Occupied(mark) => mark.symbol(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Serialized as a list of rows, each a list of glyphs with `null` for empty.
impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows().map(|row| {
            row.iter()
                .map(|square| match square {
                    Square::Empty => None,
                    Square::Occupied(mark) => Some(*mark),
                })
                .collect::<Vec<_>>()
        }))
    }
}
