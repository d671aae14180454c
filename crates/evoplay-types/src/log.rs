//! Move log records.
//!
//! A session's move log is append-only: every state-changing action adds
//! one [`LogEntry`] with a 1-based step counter. Rejected actions are not
//! logged. The log artifact begins with a fixed [`LogHeader`] line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::GameKind;
use crate::ids::SessionId;

/// Format marker written into every log header.
pub const LOG_FORMAT: &str = "evoplay-move-log";

/// Current log format version.
pub const LOG_FORMAT_VERSION: u32 = 1;

/// One logged action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEntry {
    /// 1-based, strictly increasing per session.
    pub step: u64,
    /// Seconds elapsed since the session's first logged action.
    pub time: f64,
    /// Canonical action text (e.g. `"left"`, `"drop 2"`).
    pub action: String,
    /// Score after the action.
    pub score: u64,
    /// Whether the action ended the game.
    pub game_over: bool,
    /// Visible board after the action.
    pub board: Vec<Vec<u64>>,
}

/// Read view over a session's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogInfo {
    /// Number of logged steps.
    pub steps: u64,
    /// Seconds since the first logged action (0 when nothing is logged).
    pub elapsed_seconds: f64,
    /// Every entry, oldest first, untruncated.
    pub log: Vec<LogEntry>,
}

/// First record of every log artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogHeader {
    /// Always [`LOG_FORMAT`].
    pub format: String,
    /// Always [`LOG_FORMAT_VERSION`] for files written by this build.
    pub version: u32,
    /// Game played in this session.
    pub game: GameKind,
    /// Session identifier.
    pub session: SessionId,
    /// Wall-clock time of the first logged action.
    pub started_at: DateTime<Utc>,
}

impl LogHeader {
    /// Build the header for a session whose first action happened at `started_at`.
    pub fn new(game: GameKind, session: SessionId, started_at: DateTime<Utc>) -> Self {
        Self {
            format: LOG_FORMAT.to_owned(),
            version: LOG_FORMAT_VERSION,
            game,
            session,
            started_at,
        }
    }
}
