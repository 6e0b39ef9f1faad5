//! services/app/src/web/ws_handler.rs
//!
//! The control loop for a view's WebSocket connection.
//! Every connection gets the current snapshot on connect and a fresh one after
//! each store change, no matter which client caused it.

use crate::web::{
    protocol::{error_message, ClientMessage},
    state::ServerState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use summarizer_core::SelectionError;
use tracing::{error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("New WebSocket connection established.");

    let (mut sender, mut receiver) = socket.split();
    let mut snapshots = state.snapshots.clone();

    // --- 1. Initial Snapshot ---
    let initial = snapshots.borrow_and_update().clone();
    if send_text(&mut sender, initial).await.is_err() {
        error!("Failed to send initial snapshot.");
        return;
    }

    // --- 2. Main Loop ---
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    info!("Snapshot feed closed.");
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if send_text(&mut sender, snapshot).await.is_err() {
                    warn!("Failed to push snapshot; closing connection.");
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reply) = handle_text_message(text.as_str(), &state).await {
                        if send_text(&mut sender, reply).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    info!("Client sent close message.");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
                None => {
                    info!("Client disconnected.");
                    break;
                }
            }
        }
    }

    info!("WebSocket connection closed.");
}

/// Applies a client message. Returns an error message to send back, if any.
async fn handle_text_message(text: &str, state: &ServerState) -> Option<String> {
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            return Some(error_message(format!("Invalid message: {}", e)));
        }
    };

    let mut store = state.store.lock().await;
    match client_msg {
        ClientMessage::ToggleTheme => store.toggle_theme(),
        ClientMessage::ToggleSidebar => store.toggle_sidebar(),
        ClientMessage::ToggleFavorite { id } => store.toggle_favorite(&id),
        ClientMessage::DeleteSummary { id } => store.delete_summary(&id),
        ClientMessage::SelectSummary { id } => {
            if let Err(SelectionError::UnknownSummary(id)) = store.set_current_summary(id.as_deref())
            {
                return Some(error_message(format!("No summary with id {:?}", id)));
            }
        }
    }
    None
}

async fn send_text(
    sender: &mut SplitSink<WebSocket, Message>,
    text: String,
) -> Result<(), axum::Error> {
    sender.send(Message::Text(text.into())).await
}
