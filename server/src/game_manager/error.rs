use minesweeper_core::BoardError;
use shared::{ErrorCode, ServerMessage};
use thiserror::Error;

/// Rejections reported back to the connection that sent the intent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room {0} already exists")]
    DuplicateRoomId(String),
    #[error("room {0} not found")]
    RoomNotFound(String),
    #[error("room {0} is full")]
    RoomFull(String),
    #[error("name {0} is already taken in this room")]
    NameTaken(String),
    #[error("not a member of room {0}")]
    NotAMember(String),
    #[error("already a member of room {0}")]
    AlreadyMember(String),
    #[error("game in room {0} has not started")]
    GameNotStarted(String),
    #[error("game is already over")]
    SessionFinished,
    #[error("coordinate ({x}, {y}) is outside the grid")]
    InvalidCoordinate { x: usize, y: usize },
    #[error("invalid room configuration: {0}")]
    InvalidConfig(String),
    #[error("too many messages, slow down")]
    RateLimited,
}

impl RoomError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateRoomId(_) => ErrorCode::DuplicateRoomId,
            Self::RoomNotFound(_) => ErrorCode::RoomNotFound,
            Self::RoomFull(_) => ErrorCode::RoomFull,
            Self::NameTaken(_) => ErrorCode::NameTaken,
            Self::NotAMember(_) => ErrorCode::NotAMember,
            Self::AlreadyMember(_) => ErrorCode::AlreadyMember,
            Self::GameNotStarted(_) => ErrorCode::GameNotStarted,
            Self::SessionFinished => ErrorCode::SessionFinished,
            Self::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::RateLimited => ErrorCode::RateLimited,
        }
    }

    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::Error {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

impl From<BoardError> for RoomError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::InvalidCoordinate { x, y, .. } => Self::InvalidCoordinate { x, y },
            other => Self::InvalidConfig(other.to_string()),
        }
    }
}
