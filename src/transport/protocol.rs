//! JSON messages exchanged over the game socket.

use crate::games::rows::{Board, Line};
use crate::{GameError, GameSnapshot, Player, PlayerId, SessionId};
use serde::{Deserialize, Serialize};

fn default_player_count() -> usize {
    2
}

/// A request from a connected player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open a new game and take its first seat.
    CreateGame {
        /// Board side length.
        board_size: usize,
        /// Display name.
        player_name: String,
        /// Seats needed before play starts.
        #[serde(default = "default_player_count")]
        player_count: usize,
    },
    /// Take a seat in a waiting game.
    JoinGame {
        /// Game to join.
        game_id: SessionId,
        /// Display name.
        player_name: String,
    },
    /// Place a mark.
    MakeMove {
        /// Game to play in.
        game_id: SessionId,
        /// Row.
        x: usize,
        /// Column.
        y: usize,
    },
    /// Give up a seat.
    LeaveGame {
        /// Game to leave.
        game_id: SessionId,
    },
    /// Fetch one game.
    GetGame {
        /// Game to fetch.
        game_id: SessionId,
    },
    /// Fetch every game.
    GetAllGames,
}

/// A notification pushed to a connected player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once when the socket opens.
    Welcome {
        /// Identity assigned to this connection.
        player_id: PlayerId,
    },
    /// The caller's game was created.
    GameCreated {
        /// New game.
        game: GameSnapshot,
    },
    /// Someone took a seat.
    GameJoined {
        /// Game after the join.
        game: GameSnapshot,
    },
    /// Someone gave up a seat and the game continues.
    GameLeft {
        /// Game after the departure.
        game: GameSnapshot,
        /// Who left.
        player_id: PlayerId,
    },
    /// A move was accepted.
    BoardUpdated {
        /// Game the move was made in.
        game_id: SessionId,
        /// Board after the move.
        board: Board,
        /// Who moves next.
        current_turn: Option<Player>,
        /// Session version after the move.
        version: u64,
    },
    /// The game finished.
    GameOver {
        /// Finished game.
        game_id: SessionId,
        /// Winner, or `None` for a draw.
        winner: Option<Player>,
        /// The completed line, for a win.
        line: Option<Line>,
    },
    /// The game was removed.
    GameDropped {
        /// Final state of the removed game.
        game: GameSnapshot,
    },
    /// Reply to `get_game`. An unknown id gets an `error` instead.
    Game {
        /// Requested game.
        game: GameSnapshot,
    },
    /// Reply to `get_all_games`.
    AllGames {
        /// Every live game.
        games: Vec<GameSnapshot>,
    },
    /// A request failed; only the caller receives this.
    Error {
        /// Human-readable reason.
        message: String,
        /// Whether the client should return to the lobby.
        redirect_home: bool,
    },
}

impl ServerMessage {
    /// Error notification for a refused operation.
    pub fn error(err: &GameError) -> Self {
        ServerMessage::Error {
            message: err.to_string(),
            redirect_home: err.redirect_home(),
        }
    }

    /// Error notification for an unreadable request.
    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        ServerMessage::Error {
            message: format!("Malformed request: {detail}"),
            redirect_home: false,
        }
    }
}
