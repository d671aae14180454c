//! `MergeFall`: drop tiles into a well and chain absorptions.
//!
//! The board carries one hidden row above the visible well (row 0
//! internally). A drop lands in the lowest empty cell of its column and
//! becomes the *active* tile. Resolution then alternates gravity and
//! absorption until the active tile has no equal orthogonal neighbour:
//!
//! 1. Every column compacts downwards, preserving order.
//! 2. The active tile removes all `k` equal neighbours and its value is
//!    multiplied by `2^ceil(log2(k + 1))`. That is one combo step.
//!
//! A turn scores `final_value * combo`. The game ends when, after a drop
//! has fully resolved, anything is left in the hidden row.

use evoplay_types::{Action, GameKind, MergeFallView, StateSnapshot};

use crate::board::Board;
use crate::engine::{ActionOutcome, GAME_OVER_MESSAGE, GameEngine, invalid_action_message};
use crate::error::GameError;
use crate::tiles::{MergeFallTiles, RandomTileSource, ceil_log2};

/// Default number of columns.
pub const DEFAULT_WIDTH: usize = 5;

/// Default number of visible rows.
pub const DEFAULT_HEIGHT: usize = 6;

/// Internal index of the hidden overflow row.
const OVERFLOW_ROW: usize = 0;

/// Summary of the most recent resolved drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    /// Column the tile was dropped into.
    pub column: usize,
    /// Number of absorption steps.
    pub combo: u32,
    /// Points added to the score.
    pub gained: u64,
    /// Value of the active tile once resolution stopped.
    pub final_value: u64,
}

/// One `MergeFall` session.
#[derive(Debug, Clone)]
pub struct MergeFall {
    /// `height + 1` rows; row 0 is the overflow row.
    board: Board,
    score: u64,
    game_over: bool,
    next_tile: u64,
    /// Position of the tile being resolved. Only set during a drop.
    active: Option<(usize, usize)>,
    tiles: RandomTileSource<MergeFallTiles>,
    last_turn: Option<TurnReport>,
}

impl MergeFall {
    /// A freshly reset game on the default 5x6 well.
    pub fn new(seed: u64) -> Self {
        Self::with_dimensions(DEFAULT_WIDTH, DEFAULT_HEIGHT, seed)
    }

    /// A freshly reset game with `width` columns and `height` visible rows.
    ///
    /// Zero dimensions fall back to the defaults.
    pub fn with_dimensions(width: usize, height: usize, seed: u64) -> Self {
        let width = if width == 0 { DEFAULT_WIDTH } else { width };
        let height = if height == 0 { DEFAULT_HEIGHT } else { height };
        let mut game = Self {
            board: Board::new(width, height.saturating_add(1)),
            score: 0,
            game_over: false,
            next_tile: 2,
            active: None,
            tiles: RandomTileSource::seeded(seed, MergeFallTiles),
            last_turn: None,
        };
        game.reset();
        game
    }

    /// Resume from the visible rows (top row first) with a chosen next tile.
    ///
    /// Rows are taken as-is; callers are expected to pass a settled well.
    ///
    /// # Errors
    ///
    /// Returns the [`Board::from_rows`] errors for malformed rows, and
    /// [`GameError::InvalidTile`] if `next_tile` is not a power of two
    /// of at least 2.
    pub fn from_rows(rows: &[Vec<u64>], next_tile: u64, seed: u64) -> Result<Self, GameError> {
        if next_tile < 2 || !next_tile.is_power_of_two() {
            return Err(GameError::InvalidTile(next_tile));
        }
        let width = rows.first().map_or(0, Vec::len);
        let mut padded = Vec::with_capacity(rows.len().saturating_add(1));
        padded.push(vec![0; width]);
        padded.extend_from_slice(rows);
        let board = Board::from_rows(&padded)?;

        Ok(Self {
            board,
            score: 0,
            game_over: false,
            next_tile,
            active: None,
            tiles: RandomTileSource::seeded(seed, MergeFallTiles),
            last_turn: None,
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.board.width()
    }

    /// Number of visible rows.
    pub const fn height(&self) -> usize {
        self.board.height().saturating_sub(1)
    }

    /// Cumulative score.
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// The tile the next drop will place.
    pub const fn next_tile(&self) -> u64 {
        self.next_tile
    }

    /// Report for the most recent drop that resolved, if any since reset.
    pub const fn last_turn(&self) -> Option<TurnReport> {
        self.last_turn
    }

    /// Visible rows, top row first. The overflow row is never included.
    pub fn visible_rows(&self) -> Vec<Vec<u64>> {
        self.board.rows().into_iter().skip(1).collect()
    }

    fn overflowed(&self) -> bool {
        self.board
            .row(OVERFLOW_ROW)
            .is_some_and(|row| row.iter().any(|&v| v != 0))
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Compact every column downwards, carrying the active marker along.
    fn apply_gravity(&mut self) {
        let rows = self.board.height();
        let mut active = None;

        for col in 0..self.board.width() {
            let stack: Vec<(usize, u64)> = (0..rows)
                .filter_map(|row| {
                    self.board
                        .get(row, col)
                        .filter(|&v| v != 0)
                        .map(|v| (row, v))
                })
                .collect();
            let offset = rows.saturating_sub(stack.len());

            for row in 0..offset {
                self.board.set(row, col, 0);
            }
            for (row, &(from, value)) in (offset..).zip(&stack) {
                self.board.set(row, col, value);
                if self.active == Some((from, col)) {
                    active = Some((row, col));
                }
            }
        }

        self.active = active;
    }

    /// Orthogonal neighbours of `(row, col)` holding `value`.
    fn matching_neighbours(&self, row: usize, col: usize, value: u64) -> Vec<(usize, usize)> {
        [
            row.checked_sub(1).map(|r| (r, col)),
            row.checked_add(1).map(|r| (r, col)),
            col.checked_sub(1).map(|c| (row, c)),
            col.checked_add(1).map(|c| (row, c)),
        ]
        .into_iter()
        .flatten()
        .filter(|&(r, c)| self.board.get(r, c) == Some(value))
        .collect()
    }

    /// Run gravity and absorption until the active tile settles.
    fn resolve(&mut self, column: usize) -> Result<TurnReport, GameError> {
        let mut combo: u32 = 0;

        loop {
            self.apply_gravity();
            let Some((row, col)) = self.active else {
                break;
            };
            let Some(value) = self.board.get(row, col).filter(|&v| v != 0) else {
                break;
            };
            let absorbed = self.matching_neighbours(row, col, value);
            if absorbed.is_empty() {
                break;
            }

            for &(r, c) in &absorbed {
                self.board.set(r, c, 0);
            }
            let merged_count = absorbed.len().checked_add(1).ok_or(GameError::ArithmeticOverflow)?;
            let factor = 1_u64
                .checked_shl(ceil_log2(merged_count))
                .ok_or(GameError::ArithmeticOverflow)?;
            let upgraded = value.checked_mul(factor).ok_or(GameError::ArithmeticOverflow)?;
            self.board.set(row, col, upgraded);
            combo = combo.checked_add(1).ok_or(GameError::ArithmeticOverflow)?;
        }

        let final_value = self
            .active
            .take()
            .and_then(|(row, col)| self.board.get(row, col))
            .unwrap_or(0);
        let gained = if combo == 0 {
            0
        } else {
            final_value
                .checked_mul(u64::from(combo))
                .ok_or(GameError::ArithmeticOverflow)?
        };

        Ok(TurnReport {
            column,
            combo,
            gained,
            final_value,
        })
    }

    /// Drop `next_tile` into `column` and resolve the turn.
    fn drop_tile(&mut self, column: usize) -> Result<TurnReport, GameError> {
        let landing = (0..self.board.height())
            .rev()
            .find(|&row| self.board.is_empty_cell(row, column))
            .ok_or(GameError::ColumnFull(column))?;
        self.board.set(landing, column, self.next_tile);
        self.active = Some((landing, column));

        let report = self.resolve(column)?;
        self.score = self
            .score
            .checked_add(report.gained)
            .ok_or(GameError::ArithmeticOverflow)?;
        self.last_turn = Some(report);

        if self.overflowed() {
            self.game_over = true;
        } else {
            self.next_tile = self.tiles.sample(&self.board);
        }
        Ok(report)
    }
}

impl GameEngine for MergeFall {
    fn kind(&self) -> GameKind {
        GameKind::MergeFall
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::MergeFall(MergeFallView {
            board: self.visible_rows(),
            width: self.width(),
            height: self.height(),
            score: self.score,
            next_tile: self.next_tile,
            game_over: self.game_over,
            valid_actions: self
                .valid_actions()
                .iter()
                .map(ToString::to_string)
                .collect(),
            error: None,
        })
    }

    fn valid_actions(&self) -> Vec<Action> {
        if self.game_over {
            return Vec::new();
        }
        (0..self.width()).map(Action::drop_into).collect()
    }

    fn apply(&mut self, action: &Action) -> ActionOutcome {
        if self.game_over {
            return ActionOutcome::rejected(self.snapshot(), GAME_OVER_MESSAGE);
        }
        let column = match *action {
            Action::Drop { column } if column < self.width() => column,
            _ => return ActionOutcome::rejected(self.snapshot(), invalid_action_message(action)),
        };

        match self.drop_tile(column) {
            Ok(report) => {
                tracing::trace!(
                    column,
                    combo = report.combo,
                    gained = report.gained,
                    "mergefall drop resolved"
                );
                ActionOutcome::applied(self.snapshot())
            }
            Err(err) => {
                if matches!(err, GameError::ColumnFull(_)) {
                    tracing::debug!(column, "drop into a full column; ending game");
                } else {
                    tracing::warn!(error = %err, column, "mergefall drop failed; ending game");
                }
                self.active = None;
                self.game_over = true;
                ActionOutcome::applied(self.snapshot().with_error(err.to_string()))
            }
        }
    }

    fn reset(&mut self) -> StateSnapshot {
        self.board.clear();
        self.score = 0;
        self.game_over = false;
        self.active = None;
        self.last_turn = None;
        self.next_tile = self.tiles.sample(&self.board);
        self.snapshot()
    }

    fn is_over(&self) -> bool {
        self.game_over
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    /// A 5x6 well that is empty apart from `stack` in column `col`, listed
    /// top to bottom and resting on the floor.
    fn well_with_column(col: usize, stack: &[u64]) -> Vec<Vec<u64>> {
        let mut rows = vec![vec![0; DEFAULT_WIDTH]; DEFAULT_HEIGHT];
        let start = DEFAULT_HEIGHT - stack.len();
        for (offset, &value) in stack.iter().enumerate() {
            rows[start + offset][col] = value;
        }
        rows
    }

    fn drop_into(game: &mut MergeFall, column: usize) -> ActionOutcome {
        game.apply(&Action::drop_into(column))
    }

    #[test]
    fn reset_offers_a_two_on_an_empty_well() {
        let game = MergeFall::new(3);
        assert_eq!(game.next_tile(), 2);
        assert_eq!(game.score(), 0);
        assert!(game.visible_rows().iter().flatten().all(|&v| v == 0));
        assert_eq!(game.visible_rows().len(), DEFAULT_HEIGHT);
        assert_eq!(game.valid_actions().len(), DEFAULT_WIDTH);
    }

    #[test]
    fn lone_drop_scores_nothing_and_stays() {
        let mut game = MergeFall::from_rows(&well_with_column(0, &[4]), 8, 1).unwrap();
        let outcome = drop_into(&mut game, 3);
        assert!(outcome.applied);
        assert_eq!(
            game.last_turn(),
            Some(TurnReport {
                column: 3,
                combo: 0,
                gained: 0,
                final_value: 8,
            })
        );
        assert_eq!(game.score(), 0);
        assert_eq!(game.visible_rows()[DEFAULT_HEIGHT - 1][3], 8);
        assert!(!game.is_over());
    }

    #[test]
    fn single_match_doubles() {
        let mut game = MergeFall::from_rows(&well_with_column(0, &[2, 2]), 2, 1).unwrap();
        drop_into(&mut game, 0);
        let turn = game.last_turn().unwrap();
        assert_eq!((turn.final_value, turn.combo, turn.gained), (4, 1, 4));
        assert_eq!(game.score(), 4);
        let rows = game.visible_rows();
        assert_eq!(rows[DEFAULT_HEIGHT - 2][0], 4);
        assert_eq!(rows[DEFAULT_HEIGHT - 1][0], 2);
    }

    #[test]
    fn absorbing_two_neighbours_quadruples() {
        let mut rows = vec![vec![0; DEFAULT_WIDTH]; DEFAULT_HEIGHT];
        rows[DEFAULT_HEIGHT - 1] = vec![2, 0, 2, 0, 0];
        let mut game = MergeFall::from_rows(&rows, 2, 1).unwrap();
        drop_into(&mut game, 1);
        let turn = game.last_turn().unwrap();
        assert_eq!((turn.final_value, turn.combo, turn.gained), (8, 1, 8));
        assert_eq!(game.visible_rows()[DEFAULT_HEIGHT - 1], vec![0, 8, 0, 0, 0]);
    }

    #[test]
    fn chain_through_a_full_column_avoids_overflow() {
        let rows = well_with_column(2, &[4, 8, 4, 8, 4, 8]);
        let mut game = MergeFall::from_rows(&rows, 4, 1).unwrap();
        let outcome = drop_into(&mut game, 2);
        assert!(outcome.applied);
        assert!(outcome.state.error().is_none());
        let turn = game.last_turn().unwrap();
        assert_eq!((turn.final_value, turn.combo, turn.gained), (16, 2, 32));
        assert!(!game.is_over());
        let column: Vec<u64> = game.visible_rows().iter().map(|row| row[2]).collect();
        assert_eq!(column, vec![0, 16, 4, 8, 4, 8]);
    }

    #[test]
    fn tile_left_in_overflow_row_ends_the_game() {
        let rows = well_with_column(1, &[8, 4, 8, 4, 8, 4]);
        let mut game = MergeFall::from_rows(&rows, 2, 1).unwrap();
        let outcome = drop_into(&mut game, 1);
        assert!(outcome.applied);
        assert!(game.is_over());
        assert!(outcome.state.game_over());
        assert!(outcome.state.valid_actions().is_empty());
        // The hidden row is never part of the visible board.
        assert_eq!(outcome.state.board().len(), DEFAULT_HEIGHT);
    }

    #[test]
    fn column_without_any_space_forces_game_over() {
        let rows = well_with_column(0, &[8, 4, 8, 4, 8, 4]);
        let mut game = MergeFall::from_rows(&rows, 2, 1).unwrap();
        game.board.set(OVERFLOW_ROW, 0, 16);

        let outcome = drop_into(&mut game, 0);
        assert!(outcome.applied);
        assert!(game.is_over());
        assert_eq!(outcome.state.error(), Some("Column 0 is full. Game over."));
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn out_of_range_and_slide_actions_are_rejected() {
        let mut game = MergeFall::new(1);
        let before = game.snapshot();

        let outcome = drop_into(&mut game, DEFAULT_WIDTH);
        assert!(!outcome.applied);
        assert_eq!(outcome.state.error(), Some("Invalid action: drop 5"));

        let outcome = game.apply(&Action::slide(evoplay_types::Direction::Left));
        assert!(!outcome.applied);
        assert_eq!(outcome.state.board(), before.board());
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn actions_after_game_over_are_rejected() {
        let rows = well_with_column(1, &[8, 4, 8, 4, 8, 4]);
        let mut game = MergeFall::from_rows(&rows, 2, 1).unwrap();
        drop_into(&mut game, 1);
        assert!(game.is_over());

        let outcome = drop_into(&mut game, 0);
        assert!(!outcome.applied);
        assert_eq!(outcome.state.error(), Some(GAME_OVER_MESSAGE));
    }

    #[test]
    fn next_tile_never_exceeds_board_maximum() {
        let mut game = MergeFall::new(17);
        for turn in 0..200 {
            if game.is_over() {
                game.reset();
            }
            drop_into(&mut game, turn % DEFAULT_WIDTH);
            if !game.is_over() {
                let max = game.visible_rows().into_iter().flatten().max().unwrap_or(0);
                let next = game.next_tile();
                assert!(next.is_power_of_two() && next >= 2);
                assert!(next <= max.max(2), "next tile {next} above board max {max}");
            }
        }
    }

    #[test]
    fn from_rows_validates_next_tile() {
        let rows = vec![vec![0; 3]; 3];
        assert_eq!(
            MergeFall::from_rows(&rows, 3, 0).unwrap_err(),
            GameError::InvalidTile(3)
        );
        assert_eq!(
            MergeFall::from_rows(&rows, 1, 0).unwrap_err(),
            GameError::InvalidTile(1)
        );
        let game = MergeFall::from_rows(&rows, 4, 0).unwrap();
        assert_eq!((game.width(), game.height()), (3, 3));
    }
}
