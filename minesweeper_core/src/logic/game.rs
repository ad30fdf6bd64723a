use crate::logic::board::Board;
use crate::logic::error::BoardError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Playing,
    Lost,
    Won,
}

impl SessionStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Lost | Self::Won)
    }
}

/// One board plus its timing. Owned by a race-mode member or shared by a
/// co-op room.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    status: SessionStatus,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
}

impl GameSession {
    pub fn new(size: usize, mine_count: usize) -> Result<Self, BoardError> {
        Ok(Self::from_board(Board::new(size, mine_count)?))
    }

    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            status: SessionStatus::Pending,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Time between the first reveal and the terminal move.
    pub fn elapsed(&self) -> Option<Duration> {
        Some(self.ended_at?.duration_since(self.started_at?))
    }

    pub fn reveal(&mut self, x: usize, y: usize) -> Result<usize, BoardError> {
        self.reveal_at(x, y, Instant::now())
    }

    /// Reveals with an explicit clock reading. Returns the safe cells opened.
    pub fn reveal_at(&mut self, x: usize, y: usize, now: Instant) -> Result<usize, BoardError> {
        let opened = self.board.reveal(x, y)?;
        if self.status == SessionStatus::Pending && self.board.mines_placed() {
            self.status = SessionStatus::Playing;
            self.started_at = Some(now);
        }
        self.sync_status(now);
        Ok(opened)
    }

    pub fn toggle_flag(&mut self, x: usize, y: usize) -> Result<bool, BoardError> {
        self.toggle_flag_at(x, y, Instant::now())
    }

    pub fn toggle_flag_at(&mut self, x: usize, y: usize, now: Instant) -> Result<bool, BoardError> {
        let changed = self.board.toggle_flag(x, y)?;
        self.sync_status(now);
        Ok(changed)
    }

    fn sync_status(&mut self, now: Instant) {
        if self.status != SessionStatus::Playing {
            return;
        }
        if self.board.is_lost() {
            self.status = SessionStatus::Lost;
        } else if self.board.is_won() {
            self.status = SessionStatus::Won;
        } else {
            return;
        }
        self.ended_at = Some(now);
    }
}
