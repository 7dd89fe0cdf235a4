//! Scrawl WebSocket Relay Server
//!
//! Holds the authoritative ordered board state and fans draw/clear events
//! out to every connected client.
//!
//! ## Protocol
//!
//! Messages are JSON with the following format:
//! ```json
//! { "type": "draw", "x0": 0, "y0": 0, "x1": 10, "y1": 10, "color": "#000", "size": 2 }
//! { "type": "clear" }
//! { "type": "boardState", "segments": [ ... ] }
//! { "type": "currentUsers", "count": 3 }
//! ```
//!
//! A new connection is sent the full board state, then everyone is told the
//! new client count. Draws are relayed to every *other* client (the drawer
//! already rendered locally); clears go to everyone, sender included.

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use scrawl_core::{ClientMessage, Segment, ServerMessage};
use std::{
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

/// Oldest segments are dropped past this point to bound memory.
const MAX_BOARD_HISTORY: usize = 10_000;
const CHANNEL_CAPACITY: usize = 256;

/// A fan-out message tagged with the peer that caused it.
type Envelope = (Uuid, ServerMessage);

/// Shared application state.
struct AppState {
    /// Fan-out channel to every connected client.
    tx: broadcast::Sender<Envelope>,
    /// Authoritative ordered board history.
    board: Mutex<Vec<Segment>>,
    /// Connected client count.
    users: AtomicUsize,
}

impl AppState {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            board: Mutex::new(Vec::new()),
            users: AtomicUsize::new(0),
        }
    }

    /// Snapshot the board and subscribe to the fan-out under one board
    /// lock, so a segment relayed concurrently lands either in the
    /// snapshot or on the subscription, never both.
    fn join(&self) -> (broadcast::Receiver<Envelope>, ServerMessage, usize) {
        let board = self.board.lock().expect("board lock poisoned");
        let rx = self.tx.subscribe();
        let board_state = ServerMessage::BoardState {
            segments: board.clone(),
        };
        drop(board);
        let count = self.client_joined();
        (rx, board_state, count)
    }

    /// Append a drawn segment (dropping the oldest past the history cap)
    /// and relay it, both under the board lock.
    fn append_and_relay(&self, from: Uuid, segment: Segment) {
        let mut board = self.board.lock().expect("board lock poisoned");
        board.push(segment.clone());
        if board.len() > MAX_BOARD_HISTORY {
            board.remove(0);
        }
        let _ = self.tx.send((from, ServerMessage::Draw { segment }));
    }

    /// Empty the board and fan the clear out, both under the board lock.
    fn clear_and_relay(&self, from: Uuid) {
        let mut board = self.board.lock().expect("board lock poisoned");
        board.clear();
        let _ = self.tx.send((from, ServerMessage::Clear));
    }

    fn client_joined(&self) -> usize {
        self.users.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn client_left(&self) -> usize {
        self.users.fetch_sub(1, Ordering::SeqCst) - 1
    }

    /// Broadcast a message to every connected client.
    fn broadcast(&self, from: Uuid, msg: ServerMessage) {
        let _ = self.tx.send((from, msg));
    }
}

/// Whether a fan-out message should be delivered back to its originator.
/// Draws are not echoed; clears and user counts reach everyone.
fn delivers_to(msg: &ServerMessage, from: Uuid, peer_id: Uuid) -> bool {
    from != peer_id || !matches!(msg, ServerMessage::Draw { .. })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrawl_server=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::new());
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3030));
    info!("Scrawl relay server listening on {}", addr);
    info!("WebSocket endpoint: ws://localhost:3030/ws");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Index page
async fn index() -> &'static str {
    "Scrawl Relay Server - Connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let peer_id = Uuid::new_v4();
    info!("New connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();

    // Snapshot and subscription are taken atomically, so a draw landing
    // in the board right now reaches this client exactly once.
    let (mut rx, board_state, count) = state.join();

    if sender
        .send(Message::Text(
            serde_json::to_string(&board_state).unwrap().into(),
        ))
        .await
        .is_err()
    {
        state.client_left();
        return;
    }
    state.broadcast(peer_id, ServerMessage::CurrentUsers { count });
    info!("Client {} joined, {} connected", peer_id, count);

    loop {
        tokio::select! {
            // Inbound frames from this client.
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Draw { segment }) => {
                                state.append_and_relay(peer_id, segment);
                            }
                            Ok(ClientMessage::Clear) => {
                                state.clear_and_relay(peer_id);
                                info!("Client {} cleared the board", peer_id);
                            }
                            Err(e) => {
                                // Fire-and-forget channel: bad frames are
                                // logged and dropped, the connection lives on.
                                warn!("Invalid message from {}: {}", peer_id, e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {} // Ignore binary/ping/pong.
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", peer_id, e);
                        break;
                    }
                }
            }

            // Fan-out traffic from other handlers.
            envelope = rx.recv() => {
                match envelope {
                    Ok((from, server_msg)) => {
                        if delivers_to(&server_msg, from, peer_id) {
                            let json = serde_json::to_string(&server_msg).unwrap();
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    // Lagged receivers just lose messages; delivery is
                    // fire-and-forget.
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Client {} lagged, dropped {} messages", peer_id, n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    let count = state.client_left();
    state.broadcast(peer_id, ServerMessage::CurrentUsers { count });
    info!("Connection closed: {}, {} connected", peer_id, count);
}
