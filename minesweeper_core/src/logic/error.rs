use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("coordinate ({x}, {y}) is outside the {size}x{size} grid")]
    InvalidCoordinate { x: usize, y: usize, size: usize },
    #[error("grid size must be between 1 and {max}, got {size}")]
    InvalidSize { size: usize, max: usize },
    #[error("{mines} mines do not fit on a {size}x{size} grid")]
    TooManyMines { mines: usize, size: usize },
}
