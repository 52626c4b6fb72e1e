//! Game session state machine.
//!
//! A [`GameSession`] holds one game's board, roster, turn and status. It does
//! no locking of its own; the registry wraps every session in its own mutex
//! and callers mutate it only through that guard.

use crate::GameError;
use crate::games::rows::{Board, Line, Mark, is_full, winning_line};
use derive_getters::Getters;
use derive_new::new;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Unique identifier for a player (one per connection).
pub type PlayerId = String;

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, new)]
pub struct Player {
    /// Player's unique ID.
    id: PlayerId,
    /// Display name.
    name: String,
    /// Mark this player places on the board.
    mark: Mark,
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Waiting for the roster to fill.
    Waiting,
    /// Roster is full and moves are accepted.
    Active,
    /// Someone won or the board filled up.
    Finished,
}

/// What happened to a session after a player left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// The session lives on without the player.
    Remains,
    /// The session must be removed from the registry.
    Drop,
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// Play passes to the next player.
    Continue,
    /// The mover completed a line.
    Won(Line),
    /// The board is full with no line.
    Draw,
}

/// A game session: board, roster, turn and status.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    board: Board,
    target_players: usize,
    /// Join order, which is also turn order.
    players: Vec<Player>,
    current_turn: PlayerId,
    status: GameStatus,
    /// Copied at the winning move; stays set if the winner later leaves.
    winner: Option<Player>,
    /// Set once the session has been dropped from the registry.
    closed: bool,
    /// Bumped on every accepted change; orders snapshots of this session.
    version: u64,
}

impl GameSession {
    /// Creates a waiting session with the founder seated and holding the turn.
    ///
    /// Arguments are expected to be validated by the caller.
    #[instrument(skip(founder_name), fields(session_id = %id))]
    pub fn new(
        id: SessionId,
        board_size: usize,
        target_players: usize,
        founder_id: PlayerId,
        founder_name: String,
    ) -> Self {
        info!(board_size, target_players, "Creating new game session");
        let founder = Player::new(founder_id, founder_name, Mark::first());
        Self {
            id,
            board: Board::new(board_size),
            target_players,
            current_turn: founder.id.clone(),
            players: vec![founder],
            status: GameStatus::Waiting,
            winner: None,
            closed: false,
            version: 0,
        }
    }

    /// Session ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seated players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Number of seats the game needs before it starts.
    pub fn target_players(&self) -> usize {
        self.target_players
    }

    /// Current lifecycle phase.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Whether the session has been dropped.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of accepted changes so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Gets the player with the given ID.
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Whether the player holds a seat.
    pub fn is_member(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }

    /// Player holding the turn pointer.
    pub fn current_player(&self) -> Option<&Player> {
        self.player(&self.current_turn)
    }

    /// The winner, once finished; `None` for a draw or an unfinished game.
    pub fn winner(&self) -> Option<&Player> {
        self.winner.as_ref()
    }

    /// IDs of everyone currently seated.
    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    fn ensure_open(&self) -> Result<(), GameError> {
        if self.closed {
            debug!(session_id = %self.id, "Session already dropped");
            return Err(GameError::NotFound(self.id.clone()));
        }
        Ok(())
    }

    /// Seats a player and returns the mark they were given.
    ///
    /// The session becomes active when the last seat is taken.
    #[instrument(skip(self, name), fields(session_id = %self.id))]
    pub fn join(&mut self, player_id: PlayerId, name: String) -> Result<Mark, GameError> {
        self.ensure_open()?;

        if self.is_member(&player_id) {
            warn!(player_id = %player_id, "Player already seated");
            return Err(GameError::DuplicateMember(player_id));
        }
        if self.status != GameStatus::Waiting || self.players.len() >= self.target_players {
            warn!(
                player_id = %player_id,
                seated = self.players.len(),
                status = %self.status,
                "Session not accepting players"
            );
            return Err(GameError::SessionFull(self.id.clone()));
        }

        let mark = Mark::first_unused(self.players.iter().map(|p| p.mark))
            .ok_or_else(|| GameError::SessionFull(self.id.clone()))?;
        info!(player_id = %player_id, mark = %mark, "Seating player");
        self.players.push(Player::new(player_id, name, mark));
        self.version += 1;

        if self.players.len() == self.target_players {
            self.status = GameStatus::Active;
            info!(current_turn = %self.current_turn, "Roster full, game active");
        }
        self.check_invariants();
        Ok(mark)
    }

    /// Places the player's mark at `(x, y)`.
    ///
    /// On a refusal nothing changes. On acceptance the turn advances to the
    /// next player in join order unless the move finished the game.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn make_move(
        &mut self,
        player_id: &str,
        x: usize,
        y: usize,
    ) -> Result<MoveResult, GameError> {
        self.ensure_open()?;

        if self.status != GameStatus::Active {
            warn!(player_id, status = %self.status, "Move while not active");
            return Err(GameError::NotActive(self.status));
        }
        let mark = match self.player(player_id) {
            Some(player) => player.mark,
            None => {
                warn!(player_id, "Unknown player attempted move");
                return Err(GameError::NotMember(player_id.to_string()));
            }
        };
        if self.current_turn != player_id {
            warn!(
                player_id,
                current_turn = %self.current_turn,
                "Player tried to move out of turn"
            );
            return Err(GameError::OutOfTurn(self.current_turn.clone()));
        }

        self.board.place(x, y, mark).inspect_err(|e| {
            warn!(player_id, error = %e, "Invalid move");
        })?;
        self.version += 1;

        let result = if let Some(line) = winning_line(&self.board, x, y, mark) {
            self.status = GameStatus::Finished;
            self.winner = self.player(player_id).cloned();
            info!(player_id, ?line, "Game won");
            MoveResult::Won(line)
        } else if is_full(&self.board) {
            self.status = GameStatus::Finished;
            self.winner = None;
            info!("Board full, game drawn");
            MoveResult::Draw
        } else {
            self.advance_turn();
            MoveResult::Continue
        };

        debug!(board = %self.board.display(), "Board after move");
        self.check_invariants();
        Ok(result)
    }

    /// Passes the turn to the next player in join order, wrapping around.
    fn advance_turn(&mut self) {
        let current = self
            .players
            .iter()
            .position(|p| p.id == self.current_turn)
            .unwrap_or(0);
        let next = (current + 1) % self.players.len().max(1);
        if let Some(player) = self.players.get(next) {
            self.current_turn = player.id.clone();
        }
        debug!(current_turn = %self.current_turn, "Turn advanced");
    }

    /// Removes a player according to the current phase.
    ///
    /// - Waiting: the seat is freed; an empty roster drops the session.
    /// - Active: the game ends and the session is dropped, roster untouched.
    /// - Finished: the seat is freed; an empty roster drops the session.
    #[instrument(skip(self), fields(session_id = %self.id, status = %self.status))]
    pub fn remove_player(&mut self, player_id: &str) -> Result<Departure, GameError> {
        self.ensure_open()?;

        let Some(index) = self.players.iter().position(|p| p.id == player_id) else {
            warn!(player_id, "Leave by player not in session");
            return Err(GameError::NotMember(player_id.to_string()));
        };

        if self.status == GameStatus::Active {
            info!(player_id, "Player left active game, dropping session");
            return Ok(Departure::Drop);
        }

        let removed = self.players.remove(index);
        self.version += 1;
        info!(player_id, mark = %removed.mark, "Player left");

        if self.players.is_empty() {
            info!("Roster empty, dropping session");
            return Ok(Departure::Drop);
        }
        if self.current_turn == removed.id {
            self.current_turn = self.players[0].id.clone();
            debug!(current_turn = %self.current_turn, "Turn rebound after departure");
        }
        self.check_invariants();
        Ok(Departure::Remains)
    }

    /// Marks the session as dropped; later operations fail with `NotFound`.
    pub(crate) fn close(&mut self) {
        self.closed = true;
        self.version += 1;
    }

    /// Point-in-time copy of the session for callers outside the lock.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            id: self.id.clone(),
            board_size: self.board.size(),
            target_players: self.target_players,
            players: self.players.clone(),
            board: self.board.clone(),
            current_turn: self.current_player().cloned(),
            status: self.status,
            winner: self.winner().cloned(),
            version: self.version,
        }
    }

    fn check_invariants(&self) {
        let ok = !self.players.is_empty()
            && self.players.len() <= self.target_players
            && (self.status != GameStatus::Active || self.players.len() == self.target_players)
            && self.is_member(&self.current_turn);
        debug_assert!(ok, "session invariant violated: {self:?}");
        if !ok {
            error!(session_id = %self.id, "Session invariant violated");
        }
    }
}

/// Owned copy of a session, suitable for broadcasting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Session ID.
    pub id: SessionId,
    /// Board side length.
    pub board_size: usize,
    /// Seats needed to start.
    pub target_players: usize,
    /// Seated players in turn order.
    pub players: Vec<Player>,
    /// Board contents.
    pub board: Board,
    /// Player holding the turn.
    pub current_turn: Option<Player>,
    /// Lifecycle phase.
    pub status: GameStatus,
    /// Winner once finished; `None` for a draw.
    pub winner: Option<Player>,
    /// Per-session change counter. Notifications for one game may arrive out
    /// of order; the highest version is the current state.
    pub version: u64,
}

impl GameSnapshot {
    /// IDs of the players in this snapshot.
    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id().clone()).collect()
    }

    /// Whether the finished game ended without a winner.
    pub fn is_draw(&self) -> bool {
        self.status == GameStatus::Finished && self.winner.is_none()
    }
}
