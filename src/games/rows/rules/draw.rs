//! Draw detection.

use super::super::{Board, Square};
use tracing::instrument;

/// Checks if every square is occupied.
///
/// A full board after a move that completed no line is a draw.
#[instrument(skip(board), fields(size = board.size()))]
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Square::Empty)
}
