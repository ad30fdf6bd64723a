use crate::logic::board::{neighbors, Cell, MINE};
use rand::seq::SliceRandom;
use rand::Rng;

/// Every cell whose Chebyshev distance from `first` exceeds one, in row-major order.
pub fn safe_zone_candidates(size: usize, first: (usize, usize)) -> Vec<(usize, usize)> {
    let (fx, fy) = first;
    (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .filter(|&(x, y)| x.abs_diff(fx) > 1 || y.abs_diff(fy) > 1)
        .collect()
}

/// Picks `mine_count` distinct mine positions outside the 3x3 neighbourhood of
/// the first click. The request is clamped to the candidate pool when the grid
/// is too small to honour it.
pub fn sample_mines<R: Rng + ?Sized>(
    size: usize,
    mine_count: usize,
    first: (usize, usize),
    rng: &mut R,
) -> Vec<(usize, usize)> {
    let pool = safe_zone_candidates(size, first);
    let count = if mine_count > pool.len() {
        log::warn!(
            "Requested {} mines but only {} cells lie outside the first-click safe zone, clamping",
            mine_count,
            pool.len()
        );
        pool.len()
    } else {
        mine_count
    };

    pool.choose_multiple(rng, count).copied().collect()
}

/// Builds a fresh `size`x`size` grid holding `mines` and the adjacency count of
/// every other cell.
pub fn build_cells(size: usize, mines: &[(usize, usize)]) -> Vec<Vec<Cell>> {
    let mut cells = vec![vec![0; size]; size];
    for &(x, y) in mines {
        cells[y][x] = MINE;
    }

    for y in 0..size {
        for x in 0..size {
            if cells[y][x] == MINE {
                continue;
            }
            let count = neighbors(size, x, y)
                .filter(|&(nx, ny)| cells[ny][nx] == MINE)
                .count();
            // At most eight neighbours, always fits.
            cells[y][x] = count as Cell;
        }
    }

    cells
}
