//! services/app/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between a view client and the server.

use serde::{Deserialize, Serialize};
use summarizer_core::{AppState, Snapshot};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// The mutations a connected view may issue without going through REST.
#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ToggleTheme,
    ToggleSidebar,
    ToggleFavorite { id: String },
    DeleteSummary { id: String },
    /// Selects a summary, or returns to the "create new" view with `null`.
    SelectSummary { id: Option<String> },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage<'a> {
    /// The full state, sent on connect and after every change.
    Snapshot { state: Snapshot<'a> },

    /// Reports a rejected or unreadable client message.
    Error { message: String },
}

/// Serializes a snapshot message for `state`.
pub fn snapshot_message(state: &AppState) -> serde_json::Result<String> {
    serde_json::to_string(&ServerMessage::Snapshot {
        state: state.snapshot(),
    })
}

pub fn error_message(message: impl Into<String>) -> String {
    serde_json::to_string(&ServerMessage::Error {
        message: message.into(),
    })
    .unwrap_or_else(|_| r#"{"type":"error","message":"unknown error"}"#.to_string())
}
