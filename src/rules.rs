//! Rules module for Conway's Game of Life simulation
//!
//! This module contains the generation step, neighbour counting on the torus,
//! and (in `patterns`) a handful of classic shapes that can be stamped onto a grid.

pub mod patterns;

use crate::grid::{Grid, ALIVE, DEAD};

/// Game of Life standard rules:
/// 1. Any live cell with fewer than two live neighbors dies (underpopulation)
/// 2. Any live cell with two or three live neighbors lives (survival)
/// 3. Any live cell with more than three live neighbors dies (overpopulation)
/// 4. Any dead cell with exactly three live neighbors becomes alive (reproduction)
#[inline]
pub fn next_state(alive: bool, neighbors: u32) -> bool {
    matches!((alive, neighbors), (true, 2) | (true, 3) | (false, 3))
}

/// Given a grid position, count the number of live neighbors using wrapping boundaries.
/// Coordinates outside the grid are reduced onto the torus first.
pub fn count_neighbors(grid: &Grid, x: u32, y: u32) -> u32 {
    let cells = grid.words();
    let (x, y) = (i64::from(x), i64::from(y));
    let mut count = 0;

    for dy in 0..3 {
        for dx in 0..3 {
            // Skip the cell itself
            if dx == 1 && dy == 1 {
                continue;
            }

            // Each axis wraps on its own
            let (nx, ny) = grid.wrap(x + dx - 1, y + dy - 1);

            if cells[grid.index(nx, ny)] != DEAD {
                count += 1;
            }
        }
    }

    count
}

/// Apply Game of Life rules to `input`, writing one generation into `output`.
///
/// `output` must have the same dimensions; it is fully overwritten, so it can be
/// the previous generation's buffer.
pub fn step_into(input: &Grid, output: &mut Grid) {
    assert!(
        input.same_dimensions(output),
        "step_into needs equal grids, got {}x{} and {}x{}",
        input.width(),
        input.height(),
        output.width(),
        output.height()
    );

    let width = input.width();
    let height = input.height();
    let out = output.words_mut();
    for y in 0..height {
        for x in 0..width {
            let idx = input.index(x, y);
            let alive = input.words()[idx] != DEAD;
            let neighbors = count_neighbors(input, x, y);
            out[idx] = if next_state(alive, neighbors) { ALIVE } else { DEAD };
        }
    }
}

/// Compute the next generation as a fresh grid. The input is left untouched.
pub fn step(grid: &Grid) -> Grid {
    let mut next = grid.clone();
    step_into(grid, &mut next);
    next
}
