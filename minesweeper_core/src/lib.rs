//! Server-side minesweeper rules: board generation, reveal/flag mechanics,
//! per-player game sessions and race rankings.
//!
//! Nothing in this crate performs I/O or knows about rooms or connections.

pub mod logic;

pub use logic::board::{Board, Cell, MAX_GRID_SIZE, MINE};
pub use logic::error::BoardError;
pub use logic::game::{GameSession, SessionStatus};
pub use logic::ranking::{Outcome, RankingEntry, Rankings};
