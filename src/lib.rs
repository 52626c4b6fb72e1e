//! Strictly Rows library - concurrent N-in-a-row game sessions.
//!
//! Hosts many simultaneous games of generalized tic-tac-toe: any square
//! board, two to nine players, each with their own mark.
//!
//! # Architecture
//!
//! - **Games**: board, mark alphabet and win/draw rules
//! - **Session**: one game's state machine (roster, turn, status)
//! - **Registry**: concurrent id → session map with a guard per session
//! - **Service**: player-facing operations (create, join, move, leave, query)
//! - **Transport**: WebSocket/REST server that broadcasts results
//!
//! # Example
//!
//! ```
//! use strictly_rows::{GameStatus, SessionService};
//!
//! # fn example() -> Result<(), strictly_rows::GameError> {
//! let service = SessionService::new();
//! let game = service.create_game(3, "alice".into(), "Alice".into(), 2)?;
//! let game = service.join_game(&game.id, "bob".into(), "Bob".into())?;
//! assert_eq!(game.status, GameStatus::Active);
//!
//! let outcome = service.make_move(&game.id, "alice", 1, 1)?;
//! assert_eq!(outcome.snapshot.current_turn.unwrap().id(), "bob");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod error;
mod registry;
mod service;
mod session;

pub mod games;
pub mod transport;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Errors
pub use error::GameError;

// Crate-level exports - Session management
pub use registry::{SessionHandle, SessionRegistry, lock_session};
pub use service::{BOARD_SIZE_LIMIT, DEFAULT_MAX_BOARD_SIZE, LeaveOutcome, MoveOutcome, SessionService};
pub use session::{
    Departure, GameSession, GameSnapshot, GameStatus, MoveResult, Player, PlayerId, SessionId,
};

// Crate-level exports - Game types
pub use games::rows::{Board, Line, MARKS, Mark, Square};
