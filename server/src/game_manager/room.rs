use crate::game_manager::error::RoomError;
use minesweeper_core::{BoardError, GameSession, Rankings, SessionStatus, MAX_GRID_SIZE};
use shared::{GameMode, GridView, MemberInfo, PlayerGrid, RoomSnapshot, RoomStatus};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomConfig {
    pub mode: GameMode,
    pub grid_size: usize,
    pub mine_count: usize,
    /// Maximum number of members; `None` leaves the room open-ended.
    pub capacity: Option<usize>,
}

impl RoomConfig {
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(RoomError::InvalidConfig(format!(
                "grid size must be between 1 and {MAX_GRID_SIZE}"
            )));
        }
        if self.mine_count >= self.grid_size * self.grid_size {
            return Err(RoomError::InvalidConfig(format!(
                "{} mines do not fit on a {}x{} grid",
                self.mine_count, self.grid_size, self.grid_size
            )));
        }
        if self.capacity == Some(0) {
            return Err(RoomError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn new_session(&self) -> Result<GameSession, BoardError> {
        GameSession::new(self.grid_size, self.mine_count)
    }
}

#[derive(Debug)]
pub struct Member {
    pub player_id: String,
    pub name: String,
    /// Private board, race mode only.
    pub session: Option<GameSession>,
    pub revealed_cells: usize,
}

/// Result of one accepted reveal or flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub status: SessionStatus,
    /// The move put its session into a terminal state.
    pub finished: bool,
    pub opened: usize,
}

#[derive(Debug)]
pub struct Room {
    id: String,
    config: RoomConfig,
    // Join order.
    members: Vec<Member>,
    shared: Option<GameSession>,
    started: bool,
    rankings: Rankings,
    last_activity: Instant,
    closed: bool,
}

impl Room {
    pub fn new(id: String, config: RoomConfig) -> Result<Self, RoomError> {
        config.validate()?;
        Ok(Self {
            id,
            config,
            members: Vec::new(),
            shared: None,
            started: false,
            rankings: Rankings::new(),
            last_activity: Instant::now(),
            closed: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    #[cfg(test)]
    pub fn rankings(&self) -> &Rankings {
        &self.rankings
    }

    #[cfg(test)]
    pub fn shared_session(&self) -> Option<&GameSession> {
        self.shared.as_ref()
    }

    pub fn member(&self, player_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.player_id == player_id)
    }

    pub fn is_member(&self, player_id: &str) -> bool {
        self.member(player_id).is_some()
    }

    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.player_id.as_str())
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Marks the room as removed from the registry. Handles still held by
    /// in-flight intents then behave as if the room never existed.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn member_infos(&self) -> Vec<MemberInfo> {
        self.members
            .iter()
            .map(|m| MemberInfo {
                player_id: m.player_id.clone(),
                name: m.name.clone(),
                revealed_cells: m.revealed_cells,
            })
            .collect()
    }

    pub fn ensure_member(&self, player_id: &str) -> Result<(), RoomError> {
        if self.closed {
            return Err(RoomError::RoomNotFound(self.id.clone()));
        }
        if self.is_member(player_id) {
            Ok(())
        } else {
            Err(RoomError::NotAMember(self.id.clone()))
        }
    }

    pub fn add_member(&mut self, player_id: &str, name: &str) -> Result<(), RoomError> {
        if self.closed {
            return Err(RoomError::RoomNotFound(self.id.clone()));
        }
        if self.is_member(player_id) {
            return Err(RoomError::AlreadyMember(self.id.clone()));
        }
        // One standing per race member until the game is reset.
        if self.started
            && self.config.mode == GameMode::Race
            && self.rankings.contains(player_id)
        {
            return Err(RoomError::SessionFinished);
        }
        if self
            .config
            .capacity
            .is_some_and(|cap| self.members.len() >= cap)
        {
            return Err(RoomError::RoomFull(self.id.clone()));
        }
        // Co-op members share a board, so their names must tell them apart.
        if self.config.mode == GameMode::Coop && self.members.iter().any(|m| m.name == name) {
            return Err(RoomError::NameTaken(name.to_string()));
        }

        let session = match self.config.mode {
            GameMode::Race => Some(self.config.new_session()?),
            GameMode::Coop => None,
        };
        self.members.push(Member {
            player_id: player_id.to_string(),
            name: name.to_string(),
            session,
            revealed_cells: 0,
        });
        self.touch();
        Ok(())
    }

    pub fn remove_member(&mut self, player_id: &str) -> Option<Member> {
        let idx = self.members.iter().position(|m| m.player_id == player_id)?;
        self.touch();
        Some(self.members.remove(idx))
    }

    /// Starts (or restarts) the game with fresh boards for everyone.
    pub fn start(&mut self) -> Result<(), RoomError> {
        self.renew_sessions()?;
        self.shared = match self.config.mode {
            GameMode::Race => None,
            GameMode::Coop => Some(self.config.new_session()?),
        };
        self.started = true;
        self.touch();
        Ok(())
    }

    /// Back to the lobby: boards replaced, standings cleared.
    pub fn reset(&mut self) -> Result<(), RoomError> {
        self.renew_sessions()?;
        self.shared = None;
        self.started = false;
        self.touch();
        Ok(())
    }

    fn renew_sessions(&mut self) -> Result<(), RoomError> {
        // Build every board before touching state so a failure leaves the room as it was.
        let fresh = match self.config.mode {
            GameMode::Race => self
                .members
                .iter()
                .map(|_| self.config.new_session().map(Some))
                .collect::<Result<Vec<_>, _>>()?,
            GameMode::Coop => self.members.iter().map(|_| None).collect(),
        };
        for (member, session) in self.members.iter_mut().zip(fresh) {
            member.session = session;
            member.revealed_cells = 0;
        }
        self.rankings.clear();
        Ok(())
    }

    pub fn reveal(&mut self, player_id: &str, x: usize, y: usize) -> Result<MoveOutcome, RoomError> {
        self.play(player_id, |session, now| session.reveal_at(x, y, now))
    }

    pub fn toggle_flag(
        &mut self,
        player_id: &str,
        x: usize,
        y: usize,
    ) -> Result<MoveOutcome, RoomError> {
        self.play(player_id, |session, now| {
            session.toggle_flag_at(x, y, now).map(|_| 0)
        })
    }

    fn play<F>(&mut self, player_id: &str, action: F) -> Result<MoveOutcome, RoomError>
    where
        F: FnOnce(&mut GameSession, Instant) -> Result<usize, BoardError>,
    {
        self.ensure_member(player_id)?;
        if !self.started {
            return Err(RoomError::GameNotStarted(self.id.clone()));
        }
        let idx = self
            .members
            .iter()
            .position(|m| m.player_id == player_id)
            .ok_or_else(|| RoomError::NotAMember(self.id.clone()))?;

        let now = Instant::now();
        let mode = self.config.mode;
        let session = match mode {
            GameMode::Race => self.members[idx].session.as_mut(),
            GameMode::Coop => self.shared.as_mut(),
        }
        .ok_or_else(|| RoomError::GameNotStarted(self.id.clone()))?;

        if session.is_finished() {
            return Err(RoomError::SessionFinished);
        }
        let opened = action(session, now)?;
        let status = session.status();
        let elapsed = session.elapsed();
        let finished = status.is_finished();

        let member = &mut self.members[idx];
        match mode {
            GameMode::Coop => member.revealed_cells += opened,
            GameMode::Race if finished => match status {
                SessionStatus::Won => self.rankings.record_completed(
                    &member.player_id,
                    &member.name,
                    elapsed.unwrap_or_default(),
                ),
                _ => self.rankings.record_dnf(&member.player_id, &member.name),
            },
            GameMode::Race => {}
        }
        self.last_activity = now;

        Ok(MoveOutcome {
            status,
            finished,
            opened,
        })
    }

    pub fn status(&self) -> RoomStatus {
        if !self.started {
            return RoomStatus::Lobby;
        }
        let finished = match self.config.mode {
            GameMode::Race => {
                !self.members.is_empty()
                    && self
                        .members
                        .iter()
                        .all(|m| m.session.as_ref().is_some_and(GameSession::is_finished))
            }
            GameMode::Coop => self.shared.as_ref().is_some_and(GameSession::is_finished),
        };
        if finished {
            RoomStatus::Finished
        } else {
            RoomStatus::InProgress
        }
    }

    pub fn snapshot(&self, loser: Option<String>) -> RoomSnapshot {
        let grids = self
            .members
            .iter()
            .filter_map(|m| {
                m.session.as_ref().map(|session| PlayerGrid {
                    player_id: m.player_id.clone(),
                    name: m.name.clone(),
                    grid: GridView::from_session(session),
                })
            })
            .collect();

        RoomSnapshot {
            room_id: self.id.clone(),
            mode: self.config.mode,
            status: self.status(),
            members: self.member_infos(),
            grids,
            grid: self.shared.as_ref().map(GridView::from_session),
            rankings: self.rankings.clone(),
            loser,
        }
    }
}
