use crate::game_manager::{AppState, RoomError};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use shared::{ErrorCode, GameMessage, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Forward queued events to the socket.
    let forward = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to encode server message");
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let player_id = uuid::Uuid::new_v4().to_string();
    state.add_connection(player_id.clone(), tx);

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        if !state.check_rate_limit(&player_id) {
            state.send_to(&player_id, RoomError::RateLimited.to_message());
            continue;
        }

        match serde_json::from_str::<GameMessage>(&text) {
            Ok(game_msg) => state.dispatch(&player_id, game_msg).await,
            Err(err) => {
                tracing::debug!(player_id = %player_id, error = %err, "Malformed message");
                state.send_to(
                    &player_id,
                    ServerMessage::Error {
                        code: ErrorCode::MalformedMessage,
                        message: err.to_string(),
                    },
                );
            }
        }
    }

    state.disconnect(&player_id).await;
    forward.abort();
}
