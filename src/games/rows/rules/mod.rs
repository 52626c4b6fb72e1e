//! Game rules for N-in-a-row.
//!
//! Pure functions over a [`Board`](super::Board); the session decides what a
//! result means for the game's status.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{Line, check_win, winning_line};
