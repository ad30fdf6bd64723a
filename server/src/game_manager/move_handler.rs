use crate::game_manager::room::MoveOutcome;
use crate::game_manager::{AppState, Room, RoomError};
use minesweeper_core::SessionStatus;
use shared::{GameMode, ServerMessage};

#[derive(Debug, Clone, Copy)]
enum CellAction {
    Reveal,
    Flag,
}

impl AppState {
    pub async fn start_game(&self, player_id: &str, room_id: &str) -> Result<(), RoomError> {
        let handle = self.get_room(room_id)?;
        let mut room = handle.lock().await;
        room.ensure_member(player_id)?;
        let restarted = room.is_started();
        room.start()?;

        tracing::info!(
            room_id = %room_id,
            player_id = %player_id,
            mode = ?room.mode(),
            restarted,
            "Game started"
        );

        self.broadcast(
            &room,
            &ServerMessage::GameStarted {
                room_id: room_id.to_string(),
                mode: room.mode(),
            },
        );
        self.broadcast(&room, &ServerMessage::GameUpdate(Box::new(room.snapshot(None))));
        Ok(())
    }

    pub async fn reveal_cell(
        &self,
        player_id: &str,
        room_id: &str,
        x: usize,
        y: usize,
    ) -> Result<(), RoomError> {
        self.play_cell(player_id, room_id, x, y, CellAction::Reveal)
            .await
    }

    pub async fn toggle_flag(
        &self,
        player_id: &str,
        room_id: &str,
        x: usize,
        y: usize,
    ) -> Result<(), RoomError> {
        self.play_cell(player_id, room_id, x, y, CellAction::Flag)
            .await
    }

    pub async fn new_game(&self, player_id: &str, room_id: &str) -> Result<(), RoomError> {
        let handle = self.get_room(room_id)?;
        let mut room = handle.lock().await;
        room.ensure_member(player_id)?;
        room.reset()?;

        tracing::info!(room_id = %room_id, player_id = %player_id, "Game reset");

        self.broadcast(
            &room,
            &ServerMessage::GameReset {
                room_id: room_id.to_string(),
            },
        );
        self.broadcast(&room, &ServerMessage::GameUpdate(Box::new(room.snapshot(None))));
        Ok(())
    }

    async fn play_cell(
        &self,
        player_id: &str,
        room_id: &str,
        x: usize,
        y: usize,
        action: CellAction,
    ) -> Result<(), RoomError> {
        let handle = self.get_room(room_id)?;
        // Held until every resulting event is queued, so all members observe
        // moves in the same order.
        let mut room = handle.lock().await;
        let outcome = match action {
            CellAction::Reveal => room.reveal(player_id, x, y)?,
            CellAction::Flag => room.toggle_flag(player_id, x, y)?,
        };

        tracing::debug!(
            room_id = %room_id,
            player_id = %player_id,
            x,
            y,
            ?action,
            status = ?outcome.status,
            opened = outcome.opened,
            "Move applied"
        );

        self.publish_move(&room, player_id, outcome);
        Ok(())
    }

    fn publish_move(&self, room: &Room, player_id: &str, outcome: MoveOutcome) {
        let lost = outcome.status == SessionStatus::Lost;
        let loser = (outcome.finished && lost).then(|| player_id.to_string());
        self.broadcast(room, &ServerMessage::GameUpdate(Box::new(room.snapshot(loser))));

        if !outcome.finished {
            return;
        }
        tracing::info!(room_id = %room.id(), player_id = %player_id, status = ?outcome.status, "Session finished");

        if room.mode() != GameMode::Coop {
            return;
        }
        let event = if lost {
            ServerMessage::GameOver {
                room_id: room.id().to_string(),
                loser: player_id.to_string(),
            }
        } else {
            ServerMessage::GameWon {
                room_id: room.id().to_string(),
                scores: room.member_infos(),
            }
        };
        self.broadcast(room, &event);
    }
}
