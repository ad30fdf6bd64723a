pub mod board;
pub mod error;
pub mod game;
pub mod generator;
pub mod ranking;
