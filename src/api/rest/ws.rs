use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::SinkExt;
use futures::StreamExt;
use tracing::{info, warn};

use crate::engine::tracking::subscribe;
use crate::error::AppError;
use crate::live::Subscription;
use crate::state::AppState;

pub async fn live_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(tracking_number): Path<String>,
) -> Result<Response, AppError> {
    let subscription = subscribe(&state, &tracking_number)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, subscription)))
}

async fn handle_socket(socket: WebSocket, mut subscription: Subscription) {
    let (mut sender, mut receiver) = socket.split();
    let tracking_number = subscription.tracking_number().to_string();

    info!(tracking_number = %tracking_number, "live tracking client connected");

    let mut send_task = tokio::spawn(async move {
        while let Some(point) = subscription.recv().await {
            let json = match serde_json::to_string(&point) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize route point for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                return;
            }
        }

        let _ = sender.send(Message::Close(None)).await;
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    // whichever side finishes first takes the other down with it, which
    // drops the subscription and detaches it from the fan-out set
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!(tracking_number = %tracking_number, "live tracking client disconnected");
}
