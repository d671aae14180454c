//! Externally visible state snapshots.
//!
//! A [`StateSnapshot`] is an immutable projection of one session, produced
//! fresh on every read. Internal markers (`MergeFall`'s active cell, its
//! hidden overflow row) never appear here.
//!
//! The JSON shape is tagged by the `game` field:
//!
//! ```text
//! {"game":"2048","board":[[..]],"score":0,"game_over":false,"won":false,"valid_actions":["up",..]}
//! {"game":"mergefall","board":[[..]],"width":5,"height":6,"score":0,"next_tile":2,"game_over":false,"valid_actions":["drop 0",..]}
//! ```
//!
//! An `error` string is added, without altering other fields, when an
//! action is rejected.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::GameKind;

/// Snapshot of a 2048 session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Game2048View {
    /// Rows of cell values, top row first; `0` is empty.
    pub board: Vec<Vec<u64>>,
    /// Cumulative score.
    pub score: u64,
    /// Whether the session has reached its terminal state.
    pub game_over: bool,
    /// Whether a 2048 tile has ever been produced.
    pub won: bool,
    /// Directions that would change the board.
    pub valid_actions: Vec<String>,
    /// Why the last action was rejected, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

/// Snapshot of a `MergeFall` session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MergeFallView {
    /// Visible rows of cell values, top row first; `0` is empty.
    pub board: Vec<Vec<u64>>,
    /// Number of columns.
    pub width: usize,
    /// Number of visible rows.
    pub height: usize,
    /// Cumulative score.
    pub score: u64,
    /// Value of the tile the next drop will place.
    pub next_tile: u64,
    /// Whether the session has reached its terminal state.
    pub game_over: bool,
    /// Drop actions currently accepted.
    pub valid_actions: Vec<String>,
    /// Why the last action was rejected, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

/// A state snapshot from either engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "game")]
#[ts(export, export_to = "bindings/")]
pub enum StateSnapshot {
    /// A 2048 session.
    #[serde(rename = "2048")]
    Game2048(Game2048View),
    /// A `MergeFall` session.
    #[serde(rename = "mergefall")]
    MergeFall(MergeFallView),
}

impl StateSnapshot {
    /// Which game produced this snapshot.
    pub const fn kind(&self) -> GameKind {
        match self {
            Self::Game2048(_) => GameKind::Game2048,
            Self::MergeFall(_) => GameKind::MergeFall,
        }
    }

    /// Visible board rows.
    pub fn board(&self) -> &[Vec<u64>] {
        match self {
            Self::Game2048(view) => &view.board,
            Self::MergeFall(view) => &view.board,
        }
    }

    /// Cumulative score.
    pub const fn score(&self) -> u64 {
        match self {
            Self::Game2048(view) => view.score,
            Self::MergeFall(view) => view.score,
        }
    }

    /// Whether the session is over.
    pub const fn game_over(&self) -> bool {
        match self {
            Self::Game2048(view) => view.game_over,
            Self::MergeFall(view) => view.game_over,
        }
    }

    /// Actions the engine currently accepts.
    pub fn valid_actions(&self) -> &[String] {
        match self {
            Self::Game2048(view) => &view.valid_actions,
            Self::MergeFall(view) => &view.valid_actions,
        }
    }

    /// Rejection message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Game2048(view) => view.error.as_deref(),
            Self::MergeFall(view) => view.error.as_deref(),
        }
    }

    /// Annotate the snapshot with a rejection message.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        let slot = match &mut self {
            Self::Game2048(view) => &mut view.error,
            Self::MergeFall(view) => &mut view.error,
        };
        *slot = Some(message.into());
        self
    }
}
