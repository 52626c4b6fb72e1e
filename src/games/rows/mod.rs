//! N-in-a-row on an arbitrary square board.

mod board;
mod mark;
pub mod rules;

pub use board::{Board, Square};
pub use mark::{MARKS, Mark};
pub use rules::{Line, check_win, is_full, winning_line};
