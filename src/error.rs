//! Errors returned by game session operations.

use crate::{GameStatus, PlayerId, SessionId};

/// Why a session operation was refused.
///
/// Every variant is recoverable by the caller, and a refused operation never
/// leaves partial changes behind.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// No session is registered under this id.
    #[display("Game {} not found", _0)]
    NotFound(SessionId),

    /// Board size or player count outside the supported range.
    #[display("Invalid argument: {}", _0)]
    InvalidArgument(String),

    /// The session is not accepting more players.
    #[display("Game {} is full", _0)]
    SessionFull(SessionId),

    /// The player already holds a seat in the session.
    #[display("Player {} already joined this game", _0)]
    DuplicateMember(PlayerId),

    /// The player holds no seat in the session.
    #[display("Player {} is not in this game", _0)]
    NotMember(PlayerId),

    /// Another player holds the turn.
    #[display("Not your turn, waiting for player {}", _0)]
    OutOfTurn(PlayerId),

    /// Target cell already holds a mark.
    #[display("Cell ({x}, {y}) is already occupied")]
    OccupiedCell {
        /// Row.
        x: usize,
        /// Column.
        y: usize,
    },

    /// Target cell is off the board.
    #[display("Cell ({x}, {y}) is outside the {size}x{size} board")]
    OutOfBounds {
        /// Row.
        x: usize,
        /// Column.
        y: usize,
        /// Board side length.
        size: usize,
    },

    /// Moves are only accepted while the game is active.
    #[display("Game is {}, moves are not accepted", _0)]
    NotActive(GameStatus),
}

impl GameError {
    /// Whether the client should fall back to the lobby after this error.
    ///
    /// Set for errors that leave the caller without a usable game; unset for
    /// illegal moves, after which the caller keeps playing.
    pub fn redirect_home(&self) -> bool {
        match self {
            GameError::NotFound(_)
            | GameError::InvalidArgument(_)
            | GameError::SessionFull(_)
            | GameError::DuplicateMember(_)
            | GameError::NotMember(_) => true,
            GameError::OutOfTurn(_)
            | GameError::OccupiedCell { .. }
            | GameError::OutOfBounds { .. }
            | GameError::NotActive(_) => false,
        }
    }
}

impl std::error::Error for GameError {}
