use crate::error::{LifeError, Result};

pub const DEAD: u32 = 0;
pub const ALIVE: u32 = 1;

/// Toroidal cell store.
///
/// Cells live in one flat row-major buffer of `u32` words (`0` dead, `1` alive)
/// so the renderer can copy it to a GPU storage buffer without conversion.
/// Every coordinate is reduced modulo the grid dimensions before lookup, which
/// makes `get`/`set`/`toggle` total over all integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<u32>,
}

impl Grid {
    /// Create an all-dead grid.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LifeError::InvalidDimension { width, height });
        }
        let size = (width as usize)
            .checked_mul(height as usize)
            .ok_or(LifeError::InvalidDimension { width, height })?;
        Ok(Self {
            width,
            height,
            cells: vec![DEAD; size],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn same_dimensions(&self, other: &Grid) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Index into the flat buffer for already-normalized coordinates.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Reduce arbitrary coordinates onto the torus.
    #[inline]
    pub fn wrap(&self, x: i64, y: i64) -> (u32, u32) {
        (
            x.rem_euclid(self.width as i64) as u32,
            y.rem_euclid(self.height as i64) as u32,
        )
    }

    pub fn get(&self, x: i64, y: i64) -> bool {
        let (x, y) = self.wrap(x, y);
        self.cells[self.index(x, y)] != DEAD
    }

    pub fn set(&mut self, x: i64, y: i64, alive: bool) {
        let (x, y) = self.wrap(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = if alive { ALIVE } else { DEAD };
    }

    pub fn toggle(&mut self, x: i64, y: i64) {
        let (x, y) = self.wrap(x, y);
        let idx = self.index(x, y);
        self.cells[idx] ^= ALIVE;
    }

    pub fn clear(&mut self) {
        self.cells.fill(DEAD);
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != DEAD).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == DEAD)
    }

    /// Alive cells as `(x, y)`, row-major.
    pub fn live_cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &c)| c != DEAD)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }

    /// One row of the grid, `y` already normalized.
    pub fn row(&self, y: u32) -> &[u32] {
        let start = self.index(0, y);
        &self.cells[start..start + self.width as usize]
    }

    /// Raw row-major buffer, for GPU upload.
    pub fn words(&self) -> &[u32] {
        &self.cells
    }

    pub(crate) fn words_mut(&mut self) -> &mut [u32] {
        &mut self.cells
    }
}
