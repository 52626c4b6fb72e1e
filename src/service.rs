//! Player-facing game operations.
//!
//! [`SessionService`] is what the transport layer calls. It validates
//! arguments, finds sessions in the [`SessionRegistry`] and runs each
//! operation under the target session's own guard, so operations on one game
//! are serialized while different games never contend.

use crate::games::rows::{Line, Mark};
use crate::registry::lock_session;
use crate::{
    GameError, GameSession, GameSnapshot, MoveResult, PlayerId, SessionRegistry, SessionHandle,
};
use crate::session::Departure;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Default upper bound on the board side length.
pub const DEFAULT_MAX_BOARD_SIZE: usize = 32;

/// Largest board side length any configuration may allow.
pub const BOARD_SIZE_LIMIT: usize = 1024;

/// Outcome of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Session state after the move.
    pub snapshot: GameSnapshot,
    /// The completed line, when the move won the game.
    pub line: Option<Line>,
}

impl MoveOutcome {
    /// Whether this move ended the game.
    pub fn finished(&self) -> bool {
        self.snapshot.status == crate::GameStatus::Finished
    }
}

/// Outcome of a player leaving a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Session state after the departure. For a dropped session this is its
    /// final state: an active game that was abandoned keeps `status: Active`
    /// and its full roster, and `dropped` tells it apart from a live game.
    pub snapshot: GameSnapshot,
    /// Whether the session was removed from the registry.
    pub dropped: bool,
    /// Who was seated before the departure, leaver included.
    pub notify: Vec<PlayerId>,
    /// The player who left.
    pub player_id: PlayerId,
}

/// Game session service.
#[derive(Debug, Clone)]
pub struct SessionService {
    registry: SessionRegistry,
    max_board_size: usize,
}

impl SessionService {
    /// Creates a service with an empty registry.
    #[instrument]
    pub fn new() -> Self {
        Self::with_registry(SessionRegistry::new(), DEFAULT_MAX_BOARD_SIZE)
    }

    /// Creates a service over an existing registry.
    ///
    /// `max_board_size` is clamped to [`BOARD_SIZE_LIMIT`].
    #[instrument(skip(registry))]
    pub fn with_registry(registry: SessionRegistry, max_board_size: usize) -> Self {
        if max_board_size > BOARD_SIZE_LIMIT {
            warn!(max_board_size, limit = BOARD_SIZE_LIMIT, "Board size limit clamped");
        }
        let max_board_size = max_board_size.min(BOARD_SIZE_LIMIT);
        info!(max_board_size, "Creating session service");
        Self {
            registry,
            max_board_size,
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Largest accepted board side length.
    pub fn max_board_size(&self) -> usize {
        self.max_board_size
    }

    fn handle(&self, game_id: &str) -> Result<SessionHandle, GameError> {
        self.registry.get(game_id).ok_or_else(|| {
            debug!(game_id, "Unknown game");
            GameError::NotFound(game_id.to_string())
        })
    }

    /// Creates a waiting game with the caller seated as its first player.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidArgument`] when the board size is outside
    /// `1..=max_board_size` or the player count outside `2..=9`.
    #[instrument(skip(self, player_name))]
    pub fn create_game(
        &self,
        board_size: usize,
        player_id: PlayerId,
        player_name: String,
        player_count: usize,
    ) -> Result<GameSnapshot, GameError> {
        if board_size == 0 || board_size > self.max_board_size {
            warn!(board_size, "Rejected board size");
            return Err(GameError::InvalidArgument(format!(
                "board size must be between 1 and {}, got {board_size}",
                self.max_board_size
            )));
        }
        if !(2..=Mark::COUNT).contains(&player_count) {
            warn!(player_count, "Rejected player count");
            return Err(GameError::InvalidArgument(format!(
                "player count must be between 2 and {}, got {player_count}",
                Mark::COUNT
            )));
        }

        let id = Uuid::new_v4().to_string();
        let session = GameSession::new(id, board_size, player_count, player_id, player_name);
        let snapshot = session.snapshot();
        self.registry.create(session)?;
        info!(game_id = %snapshot.id, "Game created");
        Ok(snapshot)
    }

    /// Seats a player in a waiting game.
    ///
    /// # Errors
    ///
    /// [`GameError::NotFound`], [`GameError::SessionFull`] or
    /// [`GameError::DuplicateMember`]; nothing changes on failure.
    #[instrument(skip(self, player_name))]
    pub fn join_game(
        &self,
        game_id: &str,
        player_id: PlayerId,
        player_name: String,
    ) -> Result<GameSnapshot, GameError> {
        let handle = self.handle(game_id)?;
        let mut session = lock_session(&handle);
        session.join(player_id, player_name)?;
        Ok(session.snapshot())
    }

    /// Places the player's mark at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`GameError::NotFound`], [`GameError::NotActive`],
    /// [`GameError::NotMember`], [`GameError::OutOfTurn`],
    /// [`GameError::OutOfBounds`] or [`GameError::OccupiedCell`]; nothing
    /// changes on failure.
    #[instrument(skip(self))]
    pub fn make_move(
        &self,
        game_id: &str,
        player_id: &str,
        x: usize,
        y: usize,
    ) -> Result<MoveOutcome, GameError> {
        let handle = self.handle(game_id)?;
        let mut session = lock_session(&handle);
        let line = match session.make_move(player_id, x, y)? {
            MoveResult::Won(line) => Some(line),
            MoveResult::Draw | MoveResult::Continue => None,
        };
        Ok(MoveOutcome {
            snapshot: session.snapshot(),
            line,
        })
    }

    /// Takes a player out of a game.
    ///
    /// Leaving an active game ends it and removes it from the registry, as
    /// does the last player leaving a waiting or finished game.
    ///
    /// # Errors
    ///
    /// [`GameError::NotFound`] or [`GameError::NotMember`].
    #[instrument(skip(self))]
    pub fn leave_game(&self, game_id: &str, player_id: &str) -> Result<LeaveOutcome, GameError> {
        let handle = self.handle(game_id)?;
        let mut session = lock_session(&handle);
        let notify = session.member_ids();

        let dropped = match session.remove_player(player_id)? {
            Departure::Remains => false,
            Departure::Drop => {
                // Closed while still locked so that operations already holding
                // this handle see the drop once they get the guard.
                session.close();
                self.registry.remove(game_id);
                info!(game_id, "Game dropped");
                true
            }
        };

        Ok(LeaveOutcome {
            snapshot: session.snapshot(),
            dropped,
            notify,
            player_id: player_id.to_string(),
        })
    }

    /// Returns the current state of a game.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: &str) -> Result<GameSnapshot, GameError> {
        let handle = self.handle(game_id)?;
        let session = lock_session(&handle);
        if session.is_closed() {
            return Err(GameError::NotFound(game_id.to_string()));
        }
        Ok(session.snapshot())
    }

    /// Snapshots every live game.
    #[instrument(skip(self))]
    pub fn list_games(&self) -> Vec<GameSnapshot> {
        self.registry
            .list_all()
            .iter()
            .filter_map(|handle| {
                let session = lock_session(handle);
                (!session.is_closed()).then(|| session.snapshot())
            })
            .collect()
    }

    /// Removes a game regardless of its state. Returns `false` if it was
    /// already gone.
    #[instrument(skip(self))]
    pub fn drop_game(&self, game_id: &str) -> bool {
        let Some(handle) = self.registry.get(game_id) else {
            return false;
        };
        let mut session = lock_session(&handle);
        if session.is_closed() {
            return false;
        }
        session.close();
        self.registry.remove(game_id)
    }

    /// Runs [`leave_game`](Self::leave_game) for every game the player is
    /// seated in. Called when a player's connection goes away.
    #[instrument(skip(self))]
    pub fn disconnect(&self, player_id: &str) -> Vec<LeaveOutcome> {
        let seated: Vec<String> = self
            .registry
            .list_all()
            .iter()
            .filter_map(|handle| {
                let session = lock_session(handle);
                session
                    .is_member(player_id)
                    .then(|| session.id().to_string())
            })
            .collect();

        if seated.is_empty() {
            debug!("Disconnected player held no seats");
            return Vec::new();
        }
        if seated.len() > 1 {
            warn!(count = seated.len(), "Disconnected player was seated in several games");
        }

        seated
            .iter()
            .filter_map(|game_id| match self.leave_game(game_id, player_id) {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    // Lost a race with another leave or drop of the same game.
                    debug!(game_id = %game_id, error = %e, "Skipped game on disconnect");
                    None
                }
            })
            .collect()
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}
