use crate::game_manager::{AppState, Connection, Room, RoomConfig, RoomError, RoomHandle};
use dashmap::mapref::entry::Entry;
use shared::ServerMessage;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

impl AppState {
    pub fn add_connection(&self, id: String, tx: crate::game_manager::Tx) {
        tracing::info!(player_id = %id, "Connection registered");
        self.connections.insert(id, Connection::new(tx));
    }

    /// Registers a new room with its creator as the first member.
    pub async fn create_room(
        &self,
        player_id: &str,
        room_id: &str,
        config: RoomConfig,
        display_name: &str,
    ) -> Result<RoomHandle, RoomError> {
        let mut room = Room::new(room_id.to_string(), config)?;
        room.add_member(player_id, display_name)?;
        let handle = Arc::new(Mutex::new(room));

        match self.rooms.entry(room_id.to_string()) {
            Entry::Occupied(_) => {
                tracing::debug!(room_id = %room_id, player_id = %player_id, "Room id already taken");
                return Err(RoomError::DuplicateRoomId(room_id.to_string()));
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&handle));
            }
        }
        self.track_membership(player_id, room_id);

        tracing::info!(
            room_id = %room_id,
            player_id = %player_id,
            mode = ?config.mode,
            grid_size = config.grid_size,
            mine_count = config.mine_count,
            "Room created"
        );

        let room = handle.lock().await;
        self.send_to(
            player_id,
            ServerMessage::RoomCreated {
                room_id: room_id.to_string(),
            },
        );
        self.broadcast(&room, &ServerMessage::GameUpdate(Box::new(room.snapshot(None))));
        drop(room);

        Ok(handle)
    }

    pub async fn join_room(
        &self,
        player_id: &str,
        room_id: &str,
        display_name: &str,
    ) -> Result<RoomHandle, RoomError> {
        let handle = self.get_room(room_id)?;
        let mut room = handle.lock().await;
        room.add_member(player_id, display_name)?;
        self.track_membership(player_id, room_id);

        tracing::info!(
            room_id = %room_id,
            player_id = %player_id,
            members = room.member_count(),
            "Player joined room"
        );

        self.broadcast(
            &room,
            &ServerMessage::RoomJoined {
                room_id: room_id.to_string(),
                members: room.member_infos(),
            },
        );
        self.broadcast(&room, &ServerMessage::GameUpdate(Box::new(room.snapshot(None))));
        drop(room);

        Ok(handle)
    }

    pub async fn leave_room(&self, player_id: &str, room_id: &str) -> Result<(), RoomError> {
        self.remove_member(room_id, player_id).await?;
        if let Some(mut rooms) = self.memberships.get_mut(player_id) {
            rooms.remove(room_id);
        }
        self.memberships
            .remove_if(player_id, |_, rooms| rooms.is_empty());
        Ok(())
    }

    /// Drops `player_id` from one room. Other members keep playing; the room
    /// itself goes away once empty if reaping is enabled.
    pub async fn remove_member(&self, room_id: &str, player_id: &str) -> Result<(), RoomError> {
        let handle = self.get_room(room_id)?;
        let mut room = handle.lock().await;
        room.ensure_member(player_id)?;
        room.remove_member(player_id);

        tracing::info!(room_id = %room_id, player_id = %player_id, "Player left room");

        if room.is_empty() && self.config.reap_empty_rooms {
            room.close();
            drop(room);
            self.rooms
                .remove_if(room_id, |_, current| Arc::ptr_eq(current, &handle));
            tracing::info!(room_id = %room_id, "Removed empty room");
            return Ok(());
        }

        self.broadcast(
            &room,
            &ServerMessage::PlayerLeft {
                room_id: room_id.to_string(),
                player_id: player_id.to_string(),
                members: room.member_infos(),
            },
        );
        self.broadcast(&room, &ServerMessage::GameUpdate(Box::new(room.snapshot(None))));
        Ok(())
    }

    /// Forgets a closed socket and takes it out of every room it joined.
    pub async fn disconnect(&self, player_id: &str) {
        tracing::info!(player_id = %player_id, "Connection closed");
        self.connections.remove(player_id);

        let rooms = self
            .memberships
            .remove(player_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default();

        for room_id in rooms {
            if let Err(err) = self.remove_member(&room_id, player_id).await {
                tracing::debug!(room_id = %room_id, player_id = %player_id, error = %err, "Nothing to clean up");
            }
        }
    }

    /// Removes rooms whose last intent is older than the idle timeout.
    pub async fn reap_idle_rooms(&self, now: Instant) -> usize {
        let handles: Vec<(String, RoomHandle)> = self
            .rooms
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut reaped = 0;
        for (room_id, handle) in handles {
            let mut room = handle.lock().await;
            if room.is_closed()
                || now.saturating_duration_since(room.last_activity())
                    <= self.config.idle_room_timeout
            {
                continue;
            }
            self.broadcast(
                &room,
                &ServerMessage::RoomClosed {
                    room_id: room_id.clone(),
                },
            );
            room.close();
            let members: Vec<String> = room.member_ids().map(str::to_string).collect();
            drop(room);

            self.rooms
                .remove_if(&room_id, |_, current| Arc::ptr_eq(current, &handle));
            for player_id in members {
                if let Some(mut rooms) = self.memberships.get_mut(&player_id) {
                    rooms.remove(&room_id);
                }
            }
            tracing::info!(room_id = %room_id, "Cleaning up inactive room");
            reaped += 1;
        }
        reaped
    }

    pub fn spawn_cleanup_task(self: Arc<Self>, every: Duration) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let reaped = self.reap_idle_rooms(Instant::now()).await;
                if reaped > 0 {
                    tracing::info!(reaped, rooms = self.room_count(), "Idle room sweep finished");
                }
            }
        });
    }

    fn track_membership(&self, player_id: &str, room_id: &str) {
        self.memberships
            .entry(player_id.to_string())
            .or_default()
            .insert(room_id.to_string());
    }
}
