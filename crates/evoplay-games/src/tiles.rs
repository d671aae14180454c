//! Randomised tile generation.
//!
//! [`RandomTileSource`] pairs a seeded PRNG with a [`TileDistribution`].
//! Each session owns its own source; nothing is shared across sessions, so
//! a fixed seed reproduces the same game.
//!
//! # Distributions
//!
//! - [`ClassicTiles`]: 2048's rule, `2` with probability 0.9 and `4`
//!   otherwise.
//! - [`MergeFallTiles`]: a soft bell curve over the powers of two up to
//!   the board's current maximum `M`, centred on `floor_pow2(max(4, M/32))`,
//!   with damping for small tiles and for `M/2` and `M` once `M >= 64`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::Board;

/// A board-dependent distribution over tile values.
pub trait TileDistribution {
    /// Draw a tile value for `board`.
    fn sample<R: Rng>(&self, board: &Board, rng: &mut R) -> u64;
}

// ---------------------------------------------------------------------------
// 2048
// ---------------------------------------------------------------------------

/// Probability that a classic spawn is a `4` rather than a `2`.
pub const CLASSIC_FOUR_PROBABILITY: f64 = 0.1;

/// 2048's spawn rule: `2` (90%) or `4` (10%), independent of the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicTiles;

impl TileDistribution for ClassicTiles {
    fn sample<R: Rng>(&self, _board: &Board, rng: &mut R) -> u64 {
        if rng.random::<f64>() < CLASSIC_FOUR_PROBABILITY {
            4
        } else {
            2
        }
    }
}

// ---------------------------------------------------------------------------
// MergeFall
// ---------------------------------------------------------------------------

/// `MergeFall`'s next-tile distribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeFallTiles;

/// Weight multiplier for candidates `<= 8`.
const SMALL_TILE_DAMPING: f64 = 0.55;
/// Weight multiplier for the candidate equal to `M / 2` (once `M >= 64`).
const HALF_MAX_DAMPING: f64 = 0.12;
/// Weight multiplier for the candidate equal to `M` (once `M >= 64`).
const MAX_DAMPING: f64 = 0.02;
/// Board maximum from which `M/2` and `M` are damped.
const DAMPING_THRESHOLD: u64 = 64;
/// Board maximum from which the bell curve sharpens.
const SHARP_THRESHOLD: u64 = 128;

impl MergeFallTiles {
    /// Unnormalised `(value, weight)` pairs for a board whose largest tile
    /// is `max_tile`.
    ///
    /// `max_tile` below 2 (an empty board) is treated as 2, yielding the
    /// single candidate `2`.
    pub fn weights(max_tile: u64) -> Vec<(u64, f64)> {
        let max_tile = max_tile.max(2);
        let max_exp = max_tile.ilog2();

        let center_exp = floor_pow2(max_tile.checked_shr(5).unwrap_or(0).max(4)).ilog2();
        let half_max = max_tile.checked_shr(1).unwrap_or(0);
        let temperature = if max_tile >= SHARP_THRESHOLD { 0.85 } else { 1.0 };

        (1..=max_exp)
            .filter_map(|exp| {
                let value = 1_u64.checked_shl(exp)?;
                let distance = f64::from(exp.abs_diff(center_exp));
                let mut weight = (-distance / temperature).exp();
                if value <= 8 {
                    weight *= SMALL_TILE_DAMPING;
                }
                if max_tile >= DAMPING_THRESHOLD && value == half_max {
                    weight *= HALF_MAX_DAMPING;
                }
                if max_tile >= DAMPING_THRESHOLD && value == max_tile {
                    weight *= MAX_DAMPING;
                }
                Some((value, weight))
            })
            .collect()
    }
}

impl TileDistribution for MergeFallTiles {
    fn sample<R: Rng>(&self, board: &Board, rng: &mut R) -> u64 {
        let weights = Self::weights(board.max_value());
        let total: f64 = weights.iter().map(|&(_, w)| w).sum();
        if total <= 0.0 {
            return 2;
        }

        let roll = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        for &(value, weight) in &weights {
            cumulative += weight;
            if roll <= cumulative {
                return value;
            }
        }
        weights.last().map_or(2, |&(value, _)| value)
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A per-session, seedable stream of tile values and spawn positions.
#[derive(Debug, Clone)]
pub struct RandomTileSource<D> {
    rng: StdRng,
    distribution: D,
}

impl<D: TileDistribution> RandomTileSource<D> {
    /// Create a source whose stream is fully determined by `seed`.
    pub fn seeded(seed: u64, distribution: D) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            distribution,
        }
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Draw the next tile value for `board`.
    pub fn sample(&mut self, board: &Board) -> u64 {
        self.distribution.sample(board, &mut self.rng)
    }

    /// Pick an empty cell uniformly at random, or `None` on a full board.
    pub fn pick_empty(&mut self, board: &Board) -> Option<(usize, usize)> {
        let empty = board.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..empty.len());
        empty.get(idx).copied()
    }
}

// ---------------------------------------------------------------------------
// Power-of-two helpers
// ---------------------------------------------------------------------------

/// `ceil(log2(n))`: 0 for `n <= 1`, otherwise the bit length of `n - 1`.
pub const fn ceil_log2(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS.saturating_sub(n.saturating_sub(1).leading_zeros())
    }
}

/// Largest power of two `<= x` (0 for `x == 0`).
pub const fn floor_pow2(x: u64) -> u64 {
    if x == 0 {
        return 0;
    }
    match 1_u64.checked_shl(x.ilog2()) {
        Some(pow) => pow,
        None => 0,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn board_with_max(max: u64) -> Board {
        let mut board = Board::new(5, 7);
        board.set(6, 0, max);
        board
    }

    #[test]
    fn ceil_log2_matches_bit_length_rule() {
        assert_eq!(ceil_log2(0), 0);
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(4), 2);
        assert_eq!(ceil_log2(5), 3);
    }

    #[test]
    fn floor_pow2_rounds_down() {
        assert_eq!(floor_pow2(1), 1);
        assert_eq!(floor_pow2(4), 4);
        assert_eq!(floor_pow2(33), 32);
    }

    #[test]
    fn empty_board_only_offers_two() {
        let weights = MergeFallTiles::weights(0);
        assert_eq!(weights.len(), 1);
        assert_eq!(weights.first().map(|&(v, _)| v), Some(2));
    }

    #[test]
    fn candidates_span_two_to_max() {
        let values: Vec<u64> = MergeFallTiles::weights(256).iter().map(|&(v, _)| v).collect();
        assert_eq!(values, vec![2, 4, 8, 16, 32, 64, 128, 256]);
    }

    #[test]
    fn large_boards_damp_half_max_and_max() {
        // M = 1024: centre = floor_pow2(32) = 32, so 512 and 1024 sit far
        // from the centre and are additionally damped.
        let weights = MergeFallTiles::weights(1024);
        let weight_of = |value: u64| {
            weights
                .iter()
                .find(|&&(v, _)| v == value)
                .map(|&(_, w)| w)
                .unwrap()
        };
        assert!(weight_of(32) > weight_of(16));
        assert!(weight_of(32) > weight_of(64));
        assert!(weight_of(1024) < weight_of(2));
        let expected_max = (-(5.0_f64) / 0.85).exp() * MAX_DAMPING;
        assert!((weight_of(1024) - expected_max).abs() < 1e-12);
    }

    #[test]
    fn small_tiles_are_damped_below_threshold() {
        // M = 32: centre = 4, temperature 1.0; 4 is the centre but <= 8.
        let weights = MergeFallTiles::weights(32);
        let four = weights.iter().find(|&&(v, _)| v == 4).map(|&(_, w)| w).unwrap();
        assert!((four - SMALL_TILE_DAMPING).abs() < 1e-12);
    }

    #[test]
    fn samples_are_powers_of_two_within_range() {
        let mut source = RandomTileSource::seeded(7, MergeFallTiles);
        for max in [2_u64, 8, 64, 512, 4096] {
            let board = board_with_max(max);
            for _ in 0..200 {
                let value = source.sample(&board);
                assert!(value.is_power_of_two());
                assert!((2..=max).contains(&value), "{value} outside [2, {max}]");
            }
        }
    }

    #[test]
    fn classic_tiles_are_two_or_four() {
        let board = Board::new(4, 4);
        let mut source = RandomTileSource::seeded(11, ClassicTiles);
        let draws: Vec<u64> = (0..500).map(|_| source.sample(&board)).collect();
        assert!(draws.iter().all(|&v| v == 2 || v == 4));
        assert!(draws.contains(&2));
        assert!(draws.contains(&4));
    }

    #[test]
    fn same_seed_same_stream() {
        let board = board_with_max(256);
        let mut a = RandomTileSource::seeded(99, MergeFallTiles);
        let mut b = RandomTileSource::seeded(99, MergeFallTiles);
        let xs: Vec<u64> = (0..50).map(|_| a.sample(&board)).collect();
        let ys: Vec<u64> = (0..50).map(|_| b.sample(&board)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn pick_empty_only_returns_empty_cells() {
        let mut board = Board::new(2, 2);
        board.set(0, 0, 2);
        board.set(1, 1, 2);
        let mut source = RandomTileSource::seeded(3, ClassicTiles);
        for _ in 0..50 {
            let (row, col) = source.pick_empty(&board).unwrap();
            assert!(board.is_empty_cell(row, col));
        }
        board.set(0, 1, 2);
        board.set(1, 0, 2);
        assert_eq!(source.pick_empty(&board), None);
    }
}
