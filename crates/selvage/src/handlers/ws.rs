//! real-time channel endpoint.
//!
//! `GET /ws?key=<license key>` upgrades to a websocket and attaches the
//! socket to the relay actor for that key. a plain GET without upgrade
//! headers is refused with 426.

use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket, rejection::WebSocketUpgradeRejection},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::AppState;
use crate::handlers::ApiError;
use crate::relay::RelayRegistry;

/// query parameters for the real-time channel.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// license key the session subscribes under
    pub key: Option<String>,
}

/// upgrade handler for the real-time channel.
pub async fn handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::debug!(%rejection, "refusing non-upgrade request on /ws");
            return Err(ApiError::upgrade_required(
                "real-time channel requires a websocket upgrade",
            ));
        }
    };
    let key = match params.key {
        Some(key) if !key.is_empty() => key,
        _ => return Err(ApiError::bad_request("missing key query parameter")),
    };

    let relay = state.relay.clone();
    Ok(ws.on_upgrade(move |socket| async move {
        handle_socket(socket, relay, key).await;
    }))
}

/// pump one upgraded socket against the relay.
///
/// outbound traffic flows actor -> channel -> sink in a writer task;
/// inbound text is forwarded to the actor. either side closing tears the
/// session down and detaches it.
async fn handle_socket(socket: WebSocket, relay: RelayRegistry, key: String) {
    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let session_id = relay.attach_session(&key, out_tx);
    tracing::debug!(key, session_id, "real-time session attached");

    let writer = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => relay.inbound(&key, session_id, text.to_string()),
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    relay.detach_session(&key, session_id);
    writer.abort();
    tracing::debug!(key, session_id, "real-time session closed");
}
