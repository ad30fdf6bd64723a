use minesweeper_core::{Cell, GameSession, Rankings, SessionStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Every member plays a private board.
    Race,
    /// All members share one board.
    Coop,
}

/// Intents sent by a client. The connection identity is attached by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameMessage {
    CreateRoom {
        room_id: String,
        mode: GameMode,
        display_name: String,
        grid_size: usize,
        mine_count: usize,
        #[serde(default)]
        capacity: Option<usize>,
    },
    JoinRoom {
        room_id: String,
        display_name: String,
    },
    LeaveRoom {
        room_id: String,
    },
    StartGame {
        room_id: String,
    },
    RevealCell {
        room_id: String,
        x: usize,
        y: usize,
    },
    ToggleFlag {
        room_id: String,
        x: usize,
        y: usize,
    },
    NewGame {
        room_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    DuplicateRoomId,
    RoomNotFound,
    RoomFull,
    NameTaken,
    NotAMember,
    GameNotStarted,
    InvalidCoordinate,
    InvalidConfig,
    AlreadyMember,
    SessionFinished,
    RateLimited,
    MalformedMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Lobby,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub player_id: String,
    pub name: String,
    /// Cells this member opened on a shared board.
    pub revealed_cells: usize,
}

/// Client-facing projection of one board. Cell values stay hidden (`None`)
/// until revealed, or until the session is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridView {
    pub size: usize,
    pub mines: usize,
    pub cells: Vec<Vec<Option<Cell>>>,
    pub revealed: Vec<Vec<bool>>,
    pub flagged: Vec<Vec<bool>>,
    /// Number of flags placed, for the remaining-mines counter.
    pub flags: usize,
    /// The mine that ended the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploded: Option<(usize, usize)>,
    pub status: SessionStatus,
    pub elapsed: Option<f64>,
}

impl GridView {
    pub fn from_session(session: &GameSession) -> Self {
        let board = session.board();
        let finished = session.is_finished();
        let cells = board
            .cells()
            .iter()
            .zip(board.revealed())
            .map(|(row, revealed)| {
                row.iter()
                    .zip(revealed)
                    .map(|(&cell, &open)| (open || finished).then_some(cell))
                    .collect()
            })
            .collect();

        Self {
            size: board.size(),
            mines: board.mine_count(),
            cells,
            revealed: board.revealed().to_vec(),
            flagged: board.flagged().to_vec(),
            flags: board.flagged_count(),
            exploded: board.exploded(),
            status: session.status(),
            elapsed: session.elapsed().map(|d| d.as_secs_f64()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGrid {
    pub player_id: String,
    pub name: String,
    pub grid: GridView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub mode: GameMode,
    pub status: RoomStatus,
    pub members: Vec<MemberInfo>,
    /// Race mode: one board per member, in join order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grids: Vec<PlayerGrid>,
    /// Co-op mode: the shared board, once the game has started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridView>,
    pub rankings: Rankings,
    /// Member whose move just hit a mine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loser: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated {
        room_id: String,
    },
    RoomJoined {
        room_id: String,
        members: Vec<MemberInfo>,
    },
    GameStarted {
        room_id: String,
        mode: GameMode,
    },
    GameUpdate(Box<RoomSnapshot>),
    GameOver {
        room_id: String,
        loser: String,
    },
    GameWon {
        room_id: String,
        scores: Vec<MemberInfo>,
    },
    GameReset {
        room_id: String,
    },
    PlayerLeft {
        room_id: String,
        player_id: String,
        members: Vec<MemberInfo>,
    },
    /// The room was removed after sitting idle; its members are no longer in it.
    RoomClosed {
        room_id: String,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}
