//! HTTP server: game socket plus read-only REST endpoints.

use super::hub::GameHub;
use super::protocol::ServerMessage;
use crate::{GameError, GameSnapshot, ServerConfig};
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Body,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// Builds the application router.
pub fn router(hub: GameHub) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/games", get(list_games))
        .route("/games/{id}", get(get_game))
        .route("/ws", get(ws_handler))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(hub)
}

/// Binds the configured address and serves until Ctrl-C.
#[instrument(skip(config, hub), fields(host = %config.host(), port = config.port()))]
pub async fn serve(config: &ServerConfig, hub: GameHub) -> Result<()> {
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server ready at http://{}/ (socket at /ws)", addr);

    axum::serve(listener, router(hub))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_games(State(hub): State<GameHub>) -> Json<Vec<GameSnapshot>> {
    Json(hub.service().list_games())
}

async fn get_game(
    State(hub): State<GameHub>,
    Path(id): Path<String>,
) -> Result<Json<GameSnapshot>, ApiError> {
    hub.service().get_game(&id).map(Json).map_err(ApiError)
}

/// A [`GameError`] rendered as an HTTP response.
struct ApiError(GameError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(ServerMessage::error(&self.0))).into_response()
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<GameHub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, hub))
}

async fn handle_connection(socket: WebSocket, hub: GameHub) {
    let (mut sender, mut receiver) = socket.split();
    let (player_id, mut outbox) = hub.connect();
    info!(player_id = %player_id, "WebSocket connection opened");

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbox.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to encode message");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_hub = hub.clone();
    let recv_player = player_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => recv_hub.handle_text(&recv_player, text.as_str()),
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // If either half stops, stop the other.
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    hub.disconnect(&player_id);
    info!(player_id = %player_id, "WebSocket connection closed");
}
