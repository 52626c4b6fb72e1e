//! Win detection local to the cell just played.
//!
//! A move can only complete a line that passes through it, so only the row,
//! the column and whichever diagonals contain `(x, y)` are inspected.

use super::super::{Board, Mark, Square};
use serde::Serialize;
use tracing::instrument;

/// A completed line on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Line {
    /// Every cell of the given row.
    Row(usize),
    /// Every cell of the given column.
    Column(usize),
    /// Top-left to bottom-right.
    MainDiagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

/// Returns the line through `(x, y)` that is filled entirely with `mark`.
#[instrument(skip(board), fields(size = board.size()))]
pub fn winning_line(board: &Board, x: usize, y: usize, mark: Mark) -> Option<Line> {
    if !board.contains(x, y) {
        return None;
    }
    let n = board.size();
    let owns = |r: usize, c: usize| board.get(r, c) == Some(Square::Occupied(mark));

    if (0..n).all(|c| owns(x, c)) {
        return Some(Line::Row(x));
    }
    if (0..n).all(|r| owns(r, y)) {
        return Some(Line::Column(y));
    }
    if x == y && (0..n).all(|i| owns(i, i)) {
        return Some(Line::MainDiagonal);
    }
    if x + y + 1 == n && (0..n).all(|i| owns(i, n - 1 - i)) {
        return Some(Line::AntiDiagonal);
    }
    None
}

/// Whether placing `mark` at `(x, y)` completed a row, column or diagonal.
pub fn check_win(board: &Board, x: usize, y: usize, mark: Mark) -> bool {
    winning_line(board, x, y, mark).is_some()
}
