//! Routes player requests into the session service and fans results out to
//! the affected players' connections.

use super::protocol::{ClientMessage, ServerMessage};
use crate::service::{LeaveOutcome, MoveOutcome};
use crate::{GameSnapshot, PlayerId, SessionService};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Outbound queue of one connection.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// Connection table plus the service it dispatches to.
#[derive(Debug, Clone)]
pub struct GameHub {
    service: SessionService,
    connections: Arc<RwLock<HashMap<PlayerId, Outbox>>>,
}

impl GameHub {
    /// Creates a hub over a session service.
    #[instrument(skip(service))]
    pub fn new(service: SessionService) -> Self {
        info!("Creating game hub");
        Self {
            service,
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The session service behind this hub.
    pub fn service(&self) -> &SessionService {
        &self.service
    }

    /// Registers a new connection under a fresh player id and greets it.
    #[instrument(skip(self))]
    pub fn connect(&self) -> (PlayerId, mpsc::UnboundedReceiver<ServerMessage>) {
        let player_id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        self.register(player_id.clone(), tx);
        self.send_to(
            &player_id,
            ServerMessage::Welcome {
                player_id: player_id.clone(),
            },
        );
        (player_id, rx)
    }

    /// Registers a connection under a known player id.
    #[instrument(skip(self, outbox))]
    pub fn register(&self, player_id: PlayerId, outbox: Outbox) {
        let mut connections = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        connections.insert(player_id, outbox);
        info!(count = connections.len(), "Player connected");
    }

    /// Forgets a connection and leaves every game it was seated in.
    #[instrument(skip(self))]
    pub fn disconnect(&self, player_id: &str) {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(player_id);
        info!("Player disconnected");

        for outcome in self.service.disconnect(player_id) {
            self.announce_leave(&outcome);
        }
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Queues a message for one player. Returns `false` if they are gone.
    pub fn send_to(&self, player_id: &str, msg: ServerMessage) -> bool {
        let connections = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match connections.get(player_id) {
            Some(outbox) => outbox.send(msg).is_ok(),
            None => {
                debug!(player_id, "No connection for player");
                false
            }
        }
    }

    /// Queues a message for each listed player.
    pub fn broadcast<'a, I>(&self, players: I, msg: &ServerMessage)
    where
        I: IntoIterator<Item = &'a PlayerId>,
    {
        for player_id in players {
            self.send_to(player_id, msg.clone());
        }
    }

    /// Parses and dispatches one text frame from a player.
    pub fn handle_text(&self, player_id: &str, text: &str) {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(msg) => self.handle(player_id, msg),
            Err(e) => {
                warn!(player_id, error = %e, "Received invalid JSON message");
                self.send_to(player_id, ServerMessage::malformed(e));
            }
        }
    }

    /// Runs a request and delivers the resulting notifications.
    #[instrument(skip(self))]
    pub fn handle(&self, player_id: &str, msg: ClientMessage) {
        let result = match msg {
            ClientMessage::CreateGame {
                board_size,
                player_name,
                player_count,
            } => self
                .service
                .create_game(board_size, player_id.to_string(), player_name, player_count)
                .map(|game| self.announce(&game, ServerMessage::GameCreated { game: game.clone() })),
            ClientMessage::JoinGame {
                game_id,
                player_name,
            } => self
                .service
                .join_game(&game_id, player_id.to_string(), player_name)
                .map(|game| self.announce(&game, ServerMessage::GameJoined { game: game.clone() })),
            ClientMessage::MakeMove { game_id, x, y } => self
                .service
                .make_move(&game_id, player_id, x, y)
                .map(|outcome| self.announce_move(&outcome)),
            ClientMessage::LeaveGame { game_id } => self
                .service
                .leave_game(&game_id, player_id)
                .map(|outcome| self.announce_leave(&outcome)),
            ClientMessage::GetGame { game_id } => self
                .service
                .get_game(&game_id)
                .map(|game| {
                    self.send_to(player_id, ServerMessage::Game { game });
                }),
            ClientMessage::GetAllGames => {
                let games = self.service.list_games();
                self.send_to(player_id, ServerMessage::AllGames { games });
                Ok(())
            }
        };

        if let Err(e) = result {
            debug!(player_id, error = %e, "Request refused");
            self.send_to(player_id, ServerMessage::error(&e));
        }
    }

    fn announce(&self, game: &GameSnapshot, msg: ServerMessage) {
        self.broadcast(&game.member_ids(), &msg);
    }

    fn announce_move(&self, outcome: &MoveOutcome) {
        let game = &outcome.snapshot;
        let members = game.member_ids();
        self.broadcast(
            &members,
            &ServerMessage::BoardUpdated {
                game_id: game.id.clone(),
                board: game.board.clone(),
                current_turn: game.current_turn.clone(),
                version: game.version,
            },
        );
        if outcome.finished() {
            self.broadcast(
                &members,
                &ServerMessage::GameOver {
                    game_id: game.id.clone(),
                    winner: game.winner.clone(),
                    line: outcome.line,
                },
            );
        }
    }

    fn announce_leave(&self, outcome: &LeaveOutcome) {
        if outcome.dropped {
            self.broadcast(
                &outcome.notify,
                &ServerMessage::GameDropped {
                    game: outcome.snapshot.clone(),
                },
            );
        } else {
            self.broadcast(
                &outcome.notify,
                &ServerMessage::GameLeft {
                    game: outcome.snapshot.clone(),
                    player_id: outcome.player_id.clone(),
                },
            );
        }
    }
}
