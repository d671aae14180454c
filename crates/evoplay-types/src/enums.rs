//! Enumeration types shared by the engines and the API.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Game kinds
// ---------------------------------------------------------------------------

/// The games the server can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GameKind {
    /// Classic 2048 sliding-tile game.
    #[serde(rename = "2048")]
    Game2048,
    /// `MergeFall` drop-and-absorb puzzle.
    #[serde(rename = "mergefall")]
    MergeFall,
}

impl GameKind {
    /// Every hostable game, in listing order.
    pub const ALL: [Self; 2] = [Self::Game2048, Self::MergeFall];

    /// The wire name used in URLs, snapshots and log files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Game2048 => "2048",
            Self::MergeFall => "mergefall",
        }
    }
}

impl core::fmt::Display for GameKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a game name does not match any hosted game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown game: {0}")]
pub struct UnknownGame(pub String);

impl FromStr for GameKind {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2048" => Ok(Self::Game2048),
            "mergefall" | "merge_fall" | "merge-fall" => Ok(Self::MergeFall),
            _ => Err(UnknownGame(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// One of the four orthogonal directions of travel.
///
/// Used by 2048 as the move alphabet and by the board to linearise a
/// 2-D pass into 1-D lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column 0.
    Left,
    /// Towards the last column.
    Right,
}

impl Direction {
    /// All directions in the order legal moves are reported.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(other.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_kind_parses_wire_names() {
        assert_eq!("2048".parse::<GameKind>(), Ok(GameKind::Game2048));
        assert_eq!(" MergeFall ".parse::<GameKind>(), Ok(GameKind::MergeFall));
        assert!("tetris".parse::<GameKind>().is_err());
    }

    #[test]
    fn game_kind_serializes_to_wire_name() {
        let json = serde_json::to_string(&GameKind::Game2048).ok();
        assert_eq!(json.as_deref(), Some("\"2048\""));
        assert_eq!(GameKind::MergeFall.to_string(), "mergefall");
    }

    #[test]
    fn direction_parse_is_case_insensitive() {
        assert_eq!("UP".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("\tleft\n".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("north".parse::<Direction>(), Err(String::from("north")));
    }
}
