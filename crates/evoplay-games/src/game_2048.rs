//! Classic 2048 on a square board.
//!
//! Each move is resolved lane by lane (see [`crate::board`]): every lane is
//! compressed towards the front, equal neighbours are merged once, and the
//! lane is padded back to full length. A legal move spawns one
//! [`ClassicTiles`] tile; the game ends when no direction changes the board.

use evoplay_types::{Action, Direction, Game2048View, GameKind, StateSnapshot};

use crate::board::Board;
use crate::engine::{ActionOutcome, GAME_OVER_MESSAGE, GameEngine, invalid_action_message};
use crate::error::GameError;
use crate::tiles::{ClassicTiles, RandomTileSource};

/// Side length of the default board.
pub const DEFAULT_SIZE: usize = 4;

/// Tile value that sets the `won` flag.
pub const WINNING_TILE: u64 = 2048;

/// Number of tiles placed by [`GameEngine::reset`].
const INITIAL_TILES: usize = 2;

// ---------------------------------------------------------------------------
// Lane resolution
// ---------------------------------------------------------------------------

/// One lane after a slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneSlide {
    /// Lane values after compressing and merging, padded with zeros.
    pub values: Vec<u64>,
    /// Sum of every merged tile's value.
    pub gained: u64,
    /// Whether any merge produced [`WINNING_TILE`].
    pub reached_win: bool,
}

/// Slide one lane towards its front.
///
/// A tile produced by a merge never merges again in the same pass, so
/// `[2, 2, 2, 2]` becomes `[4, 4, 0, 0]`.
///
/// # Errors
///
/// Returns [`GameError::ArithmeticOverflow`] if a merge or the lane's gain
/// exceeds `u64`.
pub fn slide_lane(lane: &[u64]) -> Result<LaneSlide, GameError> {
    let mut values = Vec::with_capacity(lane.len());
    let mut gained: u64 = 0;
    let mut reached_win = false;

    let mut tiles = lane.iter().copied().filter(|&v| v != 0).peekable();
    while let Some(tile) = tiles.next() {
        if tiles.next_if_eq(&tile).is_some() {
            let merged = tile.checked_mul(2).ok_or(GameError::ArithmeticOverflow)?;
            gained = gained
                .checked_add(merged)
                .ok_or(GameError::ArithmeticOverflow)?;
            reached_win |= merged == WINNING_TILE;
            values.push(merged);
        } else {
            values.push(tile);
        }
    }
    values.resize(lane.len(), 0);

    Ok(LaneSlide {
        values,
        gained,
        reached_win,
    })
}

/// A whole-board slide that changed at least one cell.
#[derive(Debug)]
struct Slide {
    board: Board,
    gained: u64,
    reached_win: bool,
}

/// Simulate sliding `board` towards `direction` without touching it.
///
/// Returns `Ok(None)` when the slide would leave the board unchanged.
fn simulate(board: &Board, direction: Direction) -> Result<Option<Slide>, GameError> {
    let mut next = board.clone();
    let mut gained: u64 = 0;
    let mut reached_win = false;

    for lane in 0..board.lane_count(direction) {
        let slid = slide_lane(&board.line(direction, lane))?;
        gained = gained
            .checked_add(slid.gained)
            .ok_or(GameError::ArithmeticOverflow)?;
        reached_win |= slid.reached_win;
        next.set_line(direction, lane, &slid.values);
    }

    if next == *board {
        return Ok(None);
    }
    Ok(Some(Slide {
        board: next,
        gained,
        reached_win,
    }))
}

/// Whether sliding towards `direction` changes `board`.
fn can_slide(board: &Board, direction: Direction) -> bool {
    matches!(simulate(board, direction), Ok(Some(_)))
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// One 2048 session.
#[derive(Debug, Clone)]
pub struct Game2048 {
    board: Board,
    score: u64,
    game_over: bool,
    won: bool,
    tiles: RandomTileSource<ClassicTiles>,
}

impl Game2048 {
    /// A freshly reset game on the default 4x4 board.
    pub fn new(seed: u64) -> Self {
        Self::with_size(DEFAULT_SIZE, seed)
    }

    /// A freshly reset game on a `size x size` board.
    ///
    /// A size of zero falls back to [`DEFAULT_SIZE`].
    pub fn with_size(size: usize, seed: u64) -> Self {
        let size = if size == 0 { DEFAULT_SIZE } else { size };
        let mut game = Self {
            board: Board::new(size, size),
            score: 0,
            game_over: false,
            won: false,
            tiles: RandomTileSource::seeded(seed, ClassicTiles),
        };
        game.reset();
        game
    }

    /// Resume from an existing board with a score of zero.
    ///
    /// The board need not be square. `game_over` is derived from the
    /// board; `won` is set if it already holds [`WINNING_TILE`] or more.
    pub fn from_board(board: Board, seed: u64) -> Self {
        let mut game = Self {
            won: board.max_value() >= WINNING_TILE,
            board,
            score: 0,
            game_over: false,
            tiles: RandomTileSource::seeded(seed, ClassicTiles),
        };
        game.game_over = !game.has_moves();
        game
    }

    /// The current board.
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Cumulative score.
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Whether a merge has ever produced [`WINNING_TILE`].
    pub const fn won(&self) -> bool {
        self.won
    }

    /// Directions that would change the board, in `up, down, left, right`
    /// order. Empty once the game is over.
    pub fn legal_directions(&self) -> Vec<Direction> {
        if self.game_over {
            return Vec::new();
        }
        Direction::ALL
            .into_iter()
            .filter(|&d| can_slide(&self.board, d))
            .collect()
    }

    fn has_moves(&self) -> bool {
        Direction::ALL.into_iter().any(|d| can_slide(&self.board, d))
    }

    fn spawn_tile(&mut self) -> bool {
        let Some((row, col)) = self.tiles.pick_empty(&self.board) else {
            return false;
        };
        let value = self.tiles.sample(&self.board);
        self.board.set(row, col, value)
    }

    /// Slide, score, spawn, and check for the end of the game.
    ///
    /// Returns `Ok(false)` without mutating anything if the slide would not
    /// change the board.
    fn execute(&mut self, direction: Direction) -> Result<bool, GameError> {
        let Some(slide) = simulate(&self.board, direction)? else {
            return Ok(false);
        };
        let score = self
            .score
            .checked_add(slide.gained)
            .ok_or(GameError::ArithmeticOverflow)?;

        self.board = slide.board;
        self.score = score;
        self.won |= slide.reached_win;
        self.spawn_tile();
        self.game_over = !self.has_moves();
        Ok(true)
    }
}

impl GameEngine for Game2048 {
    fn kind(&self) -> GameKind {
        GameKind::Game2048
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::Game2048(Game2048View {
            board: self.board.rows(),
            score: self.score,
            game_over: self.game_over,
            won: self.won,
            valid_actions: self
                .legal_directions()
                .into_iter()
                .map(|d| d.as_str().to_owned())
                .collect(),
            error: None,
        })
    }

    fn valid_actions(&self) -> Vec<Action> {
        self.legal_directions()
            .into_iter()
            .map(Action::slide)
            .collect()
    }

    fn apply(&mut self, action: &Action) -> ActionOutcome {
        if self.game_over {
            return ActionOutcome::rejected(self.snapshot(), GAME_OVER_MESSAGE);
        }
        let Action::Slide { direction } = *action else {
            return ActionOutcome::rejected(self.snapshot(), invalid_action_message(action));
        };

        match self.execute(direction) {
            Ok(true) => ActionOutcome::applied(self.snapshot()),
            Ok(false) => ActionOutcome::rejected(self.snapshot(), invalid_action_message(action)),
            Err(err) => {
                tracing::warn!(error = %err, %direction, "2048 move failed; ending game");
                self.game_over = true;
                ActionOutcome::applied(self.snapshot().with_error(err.to_string()))
            }
        }
    }

    fn reset(&mut self) -> StateSnapshot {
        self.board.clear();
        self.score = 0;
        self.won = false;
        for _ in 0..INITIAL_TILES {
            self.spawn_tile();
        }
        self.game_over = !self.has_moves();
        self.snapshot()
    }

    fn is_over(&self) -> bool {
        self.game_over
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn game(rows: &[Vec<u64>]) -> Game2048 {
        Game2048::from_board(Board::from_rows(rows).unwrap(), 5)
    }

    #[test]
    fn merged_tiles_do_not_merge_again() {
        let slid = slide_lane(&[2, 2, 2, 2]).unwrap();
        assert_eq!(slid.values, vec![4, 4, 0, 0]);
        assert_eq!(slid.gained, 8);

        let slid = slide_lane(&[4, 4, 8, 0]).unwrap();
        assert_eq!(slid.values, vec![8, 8, 0, 0]);
        assert_eq!(slid.gained, 8);
    }

    #[test]
    fn lanes_compress_across_gaps() {
        let slid = slide_lane(&[0, 2, 0, 2]).unwrap();
        assert_eq!(slid.values, vec![4, 0, 0, 0]);
        let slid = slide_lane(&[2, 0, 4, 0]).unwrap();
        assert_eq!(slid.values, vec![2, 4, 0, 0]);
        assert_eq!(slid.gained, 0);
    }

    #[test]
    fn merge_overflow_is_reported() {
        let huge = 1_u64 << 63;
        assert_eq!(
            slide_lane(&[huge, huge]),
            Err(GameError::ArithmeticOverflow)
        );
    }

    #[test]
    fn reset_places_two_small_tiles() {
        for seed in 0..20 {
            let game = Game2048::new(seed);
            let tiles: Vec<u64> = game
                .board()
                .rows()
                .into_iter()
                .flatten()
                .filter(|&v| v != 0)
                .collect();
            assert_eq!(tiles.len(), 2);
            assert!(tiles.iter().all(|&v| v == 2 || v == 4));
            assert_eq!(game.score(), 0);
            assert!(!game.is_over());
        }
    }

    #[test]
    fn every_direction_slides_towards_its_edge() {
        let rows = vec![
            vec![2, 0, 0, 2],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![2, 0, 0, 0],
        ];
        let expectations = [
            (Direction::Left, (0, 0), 4),
            (Direction::Right, (0, 3), 4),
            (Direction::Up, (0, 0), 4),
            (Direction::Down, (3, 0), 4),
        ];
        for (direction, (row, col), value) in expectations {
            let mut g = game(&rows);
            let outcome = g.apply(&Action::slide(direction));
            assert!(outcome.applied, "{direction} was rejected");
            assert_eq!(g.board().get(row, col), Some(value), "{direction}");
            assert_eq!(g.score(), 4);
        }
    }

    #[test]
    fn illegal_direction_leaves_board_untouched() {
        let mut g = game(&[
            vec![2, 4, 8, 16],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ]);
        let before = g.board().clone();
        assert!(!g.legal_directions().contains(&Direction::Left));
        assert!(!g.legal_directions().contains(&Direction::Up));

        let outcome = g.apply(&Action::slide(Direction::Left));
        assert!(!outcome.applied);
        assert_eq!(outcome.state.error(), Some("Invalid action: left"));
        assert_eq!(g.board(), &before);
        assert_eq!(outcome.state.board(), before.rows().as_slice());
    }

    #[test]
    fn illegal_directions_never_change_reachable_boards() {
        for seed in [3, 17, 2048] {
            let mut g = Game2048::new(seed);
            let mut step = 0_usize;
            while !g.is_over() && step < 2_000 {
                let legal = g.legal_directions();
                for direction in Direction::ALL.into_iter().filter(|d| !legal.contains(d)) {
                    let before = g.board().clone();
                    let score = g.score();
                    let outcome = g.apply(&Action::slide(direction));
                    assert!(!outcome.applied, "seed {seed} step {step}: {direction} applied");
                    assert_eq!(g.board(), &before, "seed {seed} step {step}: {direction}");
                    assert_eq!(g.score(), score);
                }

                let chosen = legal.iter().copied().cycle().nth(step).unwrap();
                assert!(g.apply(&Action::slide(chosen)).applied);
                step += 1;
            }

            if g.is_over() {
                let before = g.board().clone();
                for direction in Direction::ALL {
                    assert!(!g.apply(&Action::slide(direction)).applied);
                }
                assert_eq!(g.board(), &before);
            }
        }
    }

    #[test]
    fn drop_actions_are_rejected() {
        let mut g = Game2048::new(1);
        let outcome = g.apply(&Action::drop_into(0));
        assert!(!outcome.applied);
        assert_eq!(outcome.state.error(), Some("Invalid action: drop 0"));
    }

    #[test]
    fn valid_actions_follow_fixed_order() {
        let g = game(&[
            vec![0, 0, 0, 0],
            vec![0, 2, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ]);
        let names: Vec<String> = g.valid_actions().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["up", "down", "left", "right"]);
    }

    #[test]
    fn reaching_2048_wins_without_ending() {
        let mut g = game(&[
            vec![1024, 1024, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ]);
        assert!(!g.won());
        let outcome = g.apply(&Action::slide(Direction::Left));
        assert!(outcome.applied);
        assert!(g.won());
        assert!(!g.is_over());
        assert_eq!(g.score(), 2048);
        assert!(matches!(outcome.state, StateSnapshot::Game2048(ref v) if v.won));
    }

    #[test]
    fn last_move_ends_the_game() {
        // Only `left`/`right` merge the two 2s; afterwards the spawned tile
        // lands in the single free cell of a board with no merges left.
        let mut g = game(&[
            vec![2, 2, 8, 4],
            vec![4, 8, 16, 32],
            vec![8, 16, 32, 64],
            vec![16, 32, 64, 128],
        ]);
        assert_eq!(g.legal_directions(), vec![Direction::Left, Direction::Right]);
        let outcome = g.apply(&Action::slide(Direction::Right));
        assert!(outcome.applied);
        assert_eq!(g.score(), 4);
        assert_eq!(g.board().row(0).unwrap().get(1..), Some(&[4, 8, 4][..]));
        // The spawned tile (2 or 4) sits at (0, 0) next to a 4 on each side.
        let spawned = g.board().get(0, 0).unwrap();
        assert!(spawned == 2 || spawned == 4);
        assert_eq!(g.is_over(), spawned == 2);
    }

    #[test]
    fn actions_after_game_over_are_rejected() {
        let mut g = game(&[vec![2, 4], vec![4, 2]]);
        assert!(g.is_over());
        assert!(g.valid_actions().is_empty());
        let outcome = g.apply(&Action::slide(Direction::Up));
        assert!(!outcome.applied);
        assert_eq!(outcome.state.error(), Some(GAME_OVER_MESSAGE));
        assert!(outcome.state.game_over());
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut a = Game2048::new(42);
        let mut b = Game2048::new(42);
        for direction in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
            let sa = a.apply(&Action::slide(direction)).state;
            let sb = b.apply(&Action::slide(direction)).state;
            assert_eq!(sa, sb);
        }
    }
}
