//! Fixed-size grid of tile values.
//!
//! Cells are stored in a flat row-major `Vec`; `0` is an empty cell and
//! every other value is a power of two. Coordinates are `(row, col)` with
//! row 0 at the top.
//!
//! # Lanes
//!
//! Both engines linearise a 2-D pass into independent 1-D passes. A
//! *lane* is one row or column read in the direction of travel:
//!
//! | Direction | Lane `i` | Read order |
//! |-----------|----------|------------|
//! | `Left` | row `i` | left to right |
//! | `Right` | row `i` | right to left |
//! | `Up` | column `i` | top to bottom |
//! | `Down` | column `i` | bottom to top |
//!
//! [`Board::set_line`] writes a lane back in the same order, so reading,
//! transforming and writing a lane leaves the board's orientation intact.

use evoplay_types::Direction;

use crate::error::GameError;

/// A `width x height` grid of tile values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major cells (`row * width + col`).
    cells: Vec<u64>,
}

impl Board {
    /// Create an empty board.
    ///
    /// Zero dimensions are clamped to 1 so that every board has at least
    /// one cell.
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![0; width.saturating_mul(height)],
        }
    }

    /// Build a board from rows, top row first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EmptyBoard`] for no rows or empty rows,
    /// [`GameError::RaggedRows`] if row lengths differ, and
    /// [`GameError::InvalidTile`] for values that are not zero or a power
    /// of two.
    pub fn from_rows(rows: &[Vec<u64>]) -> Result<Self, GameError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(GameError::EmptyBoard { width, height });
        }
        let mut board = Self::new(width, height);
        board.cells.clear();
        for row in rows {
            if row.len() != width {
                return Err(GameError::RaggedRows {
                    expected: width,
                    found: row.len(),
                });
            }
            if let Some(&bad) = row.iter().find(|&&v| v != 0 && !v.is_power_of_two()) {
                return Err(GameError::InvalidTile(bad));
            }
            board.cells.extend_from_slice(row);
        }
        Ok(board)
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.height || col >= self.width {
            return None;
        }
        row.checked_mul(self.width)?.checked_add(col)
    }

    /// Value at `(row, col)`, or `None` if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<u64> {
        self.index(row, col)
            .and_then(|idx| self.cells.get(idx))
            .copied()
    }

    /// Write `value` at `(row, col)`. Returns `false` if out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: u64) -> bool {
        match self.index(row, col).and_then(|idx| self.cells.get_mut(idx)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Whether `(row, col)` is inside the board and empty.
    pub fn is_empty_cell(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Some(0)
    }

    /// Reset every cell to empty.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Copy of row `row`, or `None` if out of bounds.
    pub fn row(&self, row: usize) -> Option<Vec<u64>> {
        let start = self.index(row, 0)?;
        let end = start.checked_add(self.width)?;
        self.cells.get(start..end).map(<[u64]>::to_vec)
    }

    /// All rows, top row first.
    pub fn rows(&self) -> Vec<Vec<u64>> {
        self.cells
            .chunks(self.width)
            .map(<[u64]>::to_vec)
            .collect()
    }

    /// Coordinates of every empty cell in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 0)
            .filter_map(|(idx, _)| Some((idx.checked_div(self.width)?, idx.checked_rem(self.width)?)))
            .collect()
    }

    /// Largest cell value (`0` on an empty board).
    pub fn max_value(&self) -> u64 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Whether every cell is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&v| v == 0)
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    // -----------------------------------------------------------------------
    // Lanes
    // -----------------------------------------------------------------------

    /// Number of lanes when travelling in `direction`.
    pub const fn lane_count(&self, direction: Direction) -> usize {
        match direction {
            Direction::Left | Direction::Right => self.height,
            Direction::Up | Direction::Down => self.width,
        }
    }

    /// Number of cells in each lane when travelling in `direction`.
    pub const fn lane_len(&self, direction: Direction) -> usize {
        match direction {
            Direction::Left | Direction::Right => self.width,
            Direction::Up | Direction::Down => self.height,
        }
    }

    /// Board coordinate of position `pos` in lane `lane`.
    fn lane_coord(&self, direction: Direction, lane: usize, pos: usize) -> Option<(usize, usize)> {
        let last_col = self.width.checked_sub(1)?;
        let last_row = self.height.checked_sub(1)?;
        match direction {
            Direction::Left => Some((lane, pos)),
            Direction::Right => Some((lane, last_col.checked_sub(pos)?)),
            Direction::Up => Some((pos, lane)),
            Direction::Down => Some((last_row.checked_sub(pos)?, lane)),
        }
    }

    /// Read lane `lane` in the direction of travel.
    ///
    /// Returns an empty vector if `lane` is out of range.
    pub fn line(&self, direction: Direction, lane: usize) -> Vec<u64> {
        if lane >= self.lane_count(direction) {
            return Vec::new();
        }
        (0..self.lane_len(direction))
            .filter_map(|pos| {
                let (row, col) = self.lane_coord(direction, lane, pos)?;
                self.get(row, col)
            })
            .collect()
    }

    /// Write `values` into lane `lane`, in the same order [`line`] reads it.
    ///
    /// Returns `false` (leaving the board untouched) if the lane is out of
    /// range or `values` has the wrong length.
    ///
    /// [`line`]: Board::line
    pub fn set_line(&mut self, direction: Direction, lane: usize, values: &[u64]) -> bool {
        if lane >= self.lane_count(direction) || values.len() != self.lane_len(direction) {
            return false;
        }
        for (pos, &value) in values.iter().enumerate() {
            let Some((row, col)) = self.lane_coord(direction, lane, pos) else {
                return false;
            };
            self.set(row, col, value);
        }
        true
    }
}
