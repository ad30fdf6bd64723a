use crate::config::RegistryConfig;
use dashmap::DashMap;
use shared::{GameMessage, ServerMessage};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod error;
pub mod lifecycle;
pub mod move_handler;
pub mod room;
pub mod session;

pub use error::RoomError;
pub use room::{Room, RoomConfig};
pub use session::{Connection, Tx};

pub type RoomHandle = Arc<Mutex<Room>>;

/// Process-wide room registry. Each room sits behind its own lock so intents
/// for different rooms never wait on each other.
pub struct AppState {
    pub connections: DashMap<String, Connection>,
    pub rooms: DashMap<String, RoomHandle>,
    /// Rooms each connection currently belongs to.
    pub memberships: DashMap<String, HashSet<String>>,
    pub config: RegistryConfig,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            connections: DashMap::new(),
            rooms: DashMap::new(),
            memberships: DashMap::new(),
            config,
        }
    }

    pub fn check_rate_limit(&self, player_id: &str) -> bool {
        use std::time::Instant;
        let Some(mut conn) = self.connections.get_mut(player_id) else {
            return false;
        };
        let now = Instant::now();
        if let Some(last) = conn.last_msg_at {
            if now.duration_since(last) < self.config.min_message_interval {
                return false;
            }
        }
        conn.last_msg_at = Some(now);
        true
    }

    pub fn get_room(&self, room_id: &str) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(room_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RoomError::RoomNotFound(room_id.to_string()))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn send_to(&self, player_id: &str, msg: ServerMessage) {
        if let Some(conn) = self.connections.get(player_id) {
            if conn.tx.send(msg).is_err() {
                tracing::debug!(player_id = %player_id, "Dropping message for closed connection");
            }
        }
    }

    /// Fans one event out to every current member of `room`.
    pub fn broadcast(&self, room: &Room, msg: &ServerMessage) {
        for player_id in room.member_ids() {
            self.send_to(player_id, msg.clone());
        }
    }

    /// Routes one intent and reports a rejection to its sender only.
    pub async fn dispatch(&self, player_id: &str, msg: GameMessage) {
        let result = match msg {
            GameMessage::CreateRoom {
                room_id,
                mode,
                display_name,
                grid_size,
                mine_count,
                capacity,
            } => {
                let config = RoomConfig {
                    mode,
                    grid_size,
                    mine_count,
                    capacity,
                };
                self.create_room(player_id, &room_id, config, &display_name)
                    .await
                    .map(drop)
            }
            GameMessage::JoinRoom {
                room_id,
                display_name,
            } => self
                .join_room(player_id, &room_id, &display_name)
                .await
                .map(drop),
            GameMessage::LeaveRoom { room_id } => self.leave_room(player_id, &room_id).await,
            GameMessage::StartGame { room_id } => self.start_game(player_id, &room_id).await,
            GameMessage::RevealCell { room_id, x, y } => {
                self.reveal_cell(player_id, &room_id, x, y).await
            }
            GameMessage::ToggleFlag { room_id, x, y } => {
                self.toggle_flag(player_id, &room_id, x, y).await
            }
            GameMessage::NewGame { room_id } => self.new_game(player_id, &room_id).await,
        };

        if let Err(err) = result {
            tracing::debug!(player_id = %player_id, error = %err, "Intent rejected");
            self.send_to(player_id, err.to_message());
        }
    }
}
