use crate::logic::error::BoardError;
use crate::logic::generator::{build_cells, sample_mines};
use rand::Rng;

/// Cell value: `MINE` or the number of mines in the 8-neighbourhood.
pub type Cell = i8;

pub const MINE: Cell = -1;

/// Largest accepted side length. Keeps every grid scan cheap enough to run
/// under a room lock.
pub const MAX_GRID_SIZE: usize = 100;

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// In-bounds neighbours of `(x, y)` on a `size`x`size` grid. No wraparound.
pub fn neighbors(size: usize, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
    DISPLACEMENTS.iter().filter_map(move |&(dx, dy)| {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < size && ny < size).then_some((nx, ny))
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    mine_count: usize,
    // Indexed [y][x].
    cells: Vec<Vec<Cell>>,
    revealed: Vec<Vec<bool>>,
    flagged: Vec<Vec<bool>>,
    mines_placed: bool,
    exploded: Option<(usize, usize)>,
    won: bool,
}

impl Board {
    /// Creates an empty board. Mines are placed on the first reveal.
    pub fn new(size: usize, mine_count: usize) -> Result<Self, BoardError> {
        if size == 0 || size > MAX_GRID_SIZE {
            return Err(BoardError::InvalidSize {
                size,
                max: MAX_GRID_SIZE,
            });
        }
        if mine_count >= size * size {
            return Err(BoardError::TooManyMines {
                mines: mine_count,
                size,
            });
        }

        Ok(Self {
            size,
            mine_count,
            cells: vec![vec![0; size]; size],
            revealed: vec![vec![false; size]; size],
            flagged: vec![vec![false; size]; size],
            mines_placed: false,
            exploded: None,
            won: false,
        })
    }

    /// Creates a board with a fixed mine layout, skipping lazy placement.
    pub fn with_mines(size: usize, mines: &[(usize, usize)]) -> Result<Self, BoardError> {
        let mut board = Self::new(size, mines.len())?;
        for &(x, y) in mines {
            board.validate(x, y)?;
        }
        board.cells = build_cells(size, mines);
        board.mine_count = board.cells.iter().flatten().filter(|&&c| c == MINE).count();
        board.mines_placed = true;
        Ok(board)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn revealed(&self) -> &[Vec<bool>] {
        &self.revealed
    }

    pub fn flagged(&self) -> &[Vec<bool>] {
        &self.flagged
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        self.cells.get(y)?.get(x).copied()
    }

    pub fn is_revealed(&self, x: usize, y: usize) -> bool {
        self.revealed
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    pub fn is_flagged(&self, x: usize, y: usize) -> bool {
        self.flagged
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    /// The mine that ended the game, if any.
    pub fn exploded(&self) -> Option<(usize, usize)> {
        self.exploded
    }

    pub fn is_lost(&self) -> bool {
        self.exploded.is_some()
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().flatten().filter(|&&r| r).count()
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.iter().flatten().filter(|&&f| f).count()
    }

    pub fn validate(&self, x: usize, y: usize) -> Result<(), BoardError> {
        if x < self.size && y < self.size {
            Ok(())
        } else {
            Err(BoardError::InvalidCoordinate {
                x,
                y,
                size: self.size,
            })
        }
    }

    /// Lays out mines keeping `(first_x, first_y)` and its neighbours clear.
    /// Does nothing once mines are placed.
    pub fn place_mines<R: Rng + ?Sized>(&mut self, first_x: usize, first_y: usize, rng: &mut R) {
        if self.mines_placed {
            return;
        }
        let mines = sample_mines(self.size, self.mine_count, (first_x, first_y), rng);
        self.mine_count = mines.len();
        self.cells = build_cells(self.size, &mines);
        self.mines_placed = true;
    }

    /// Reveals a cell, cascading through zero-valued cells. Returns the number
    /// of safe cells opened by this call.
    pub fn reveal(&mut self, x: usize, y: usize) -> Result<usize, BoardError> {
        self.reveal_with(x, y, &mut rand::thread_rng())
    }

    pub fn reveal_with<R: Rng + ?Sized>(
        &mut self,
        x: usize,
        y: usize,
        rng: &mut R,
    ) -> Result<usize, BoardError> {
        self.validate(x, y)?;
        if self.revealed[y][x] || self.flagged[y][x] {
            return Ok(0);
        }

        self.place_mines(x, y, rng);

        if self.cells[y][x] == MINE {
            self.revealed[y][x] = true;
            self.exploded = Some((x, y));
            return Ok(0);
        }

        let mut opened = 0;
        let mut stack = vec![(x, y)];
        while let Some((cx, cy)) = stack.pop() {
            if self.revealed[cy][cx] || self.flagged[cy][cx] {
                continue;
            }
            self.revealed[cy][cx] = true;
            opened += 1;

            // Only zero cells expand, so a mine is never pushed.
            if self.cells[cy][cx] == 0 {
                stack.extend(
                    neighbors(self.size, cx, cy)
                        .filter(|&(nx, ny)| !self.revealed[ny][nx] && !self.flagged[ny][nx]),
                );
            }
        }

        self.refresh_win();
        Ok(opened)
    }

    /// Flips the flag on an unrevealed cell. Returns whether anything changed.
    pub fn toggle_flag(&mut self, x: usize, y: usize) -> Result<bool, BoardError> {
        self.validate(x, y)?;
        if self.revealed[y][x] {
            return Ok(false);
        }
        self.flagged[y][x] = !self.flagged[y][x];
        self.refresh_win();
        Ok(true)
    }

    /// True iff every mine is flagged and every other cell is revealed.
    pub fn check_win(&self) -> bool {
        self.cells.iter().enumerate().all(|(y, row)| {
            row.iter().enumerate().all(|(x, &cell)| {
                if cell == MINE {
                    self.flagged[y][x]
                } else {
                    self.revealed[y][x]
                }
            })
        })
    }

    fn refresh_win(&mut self) {
        if self.mines_placed && !self.won && !self.is_lost() {
            self.won = self.check_win();
        }
    }
}
