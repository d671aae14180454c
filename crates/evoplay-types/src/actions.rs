//! Structured game actions and the tolerant text parser in front of them.
//!
//! Front-ends and LLM agents send actions as free text (`"up"`, `" Left"`,
//! `"drop 3"`, `"3"`, `"drop:3"`). [`Action::parse`] converts that text
//! into a typed [`Action`] before it ever reaches an engine; engines only
//! see validated, structured actions.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Direction, GameKind};

/// A single move in one of the hosted games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Action {
    /// 2048: slide every tile towards `direction`.
    Slide {
        /// Direction of travel.
        direction: Direction,
    },
    /// `MergeFall`: drop the next tile into `column` (0-based).
    Drop {
        /// Target column index.
        column: usize,
    },
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Slide { direction } => write!(f, "{direction}"),
            Self::Drop { column } => write!(f, "drop {column}"),
        }
    }
}

/// Why a textual action could not be converted into an [`Action`].
///
/// Every variant carries the normalised (trimmed, lowercased) input so the
/// caller can echo it back in an `Invalid action: ...` message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionParseError {
    /// The text is not one of `up`, `down`, `left`, `right`.
    #[error("unknown direction: {input}")]
    UnknownDirection {
        /// Normalised input text.
        input: String,
    },

    /// The text is not a recognisable `drop <column>` form.
    #[error("malformed drop action: {input}")]
    MalformedDrop {
        /// Normalised input text.
        input: String,
    },
}

impl ActionParseError {
    /// The normalised text that failed to parse.
    pub fn input(&self) -> &str {
        match self {
            Self::UnknownDirection { input } | Self::MalformedDrop { input } => input,
        }
    }
}

/// Separators accepted between `drop` and the column index.
const DROP_SEPARATORS: [char; 4] = [' ', ':', '=', '\t'];

impl Action {
    /// Parse free text into the action alphabet of `game`.
    ///
    /// Range checks (column within the board) are left to the engine,
    /// which knows its own dimensions.
    pub fn parse(game: GameKind, raw: &str) -> Result<Self, ActionParseError> {
        let normalised = normalise(raw);
        match game {
            GameKind::Game2048 => normalised
                .parse::<Direction>()
                .map(|direction| Self::Slide { direction })
                .map_err(|input| ActionParseError::UnknownDirection { input }),
            GameKind::MergeFall => parse_column(&normalised)
                .map(|column| Self::Drop { column })
                .ok_or(ActionParseError::MalformedDrop { input: normalised }),
        }
    }

    /// Convenience constructor for a slide.
    pub const fn slide(direction: Direction) -> Self {
        Self::Slide { direction }
    }

    /// Convenience constructor for a drop.
    pub const fn drop_into(column: usize) -> Self {
        Self::Drop { column }
    }
}

/// Trim and lowercase raw action text.
pub fn normalise(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Accepts `"3"`, `"drop 3"`, `"drop3"`, `"drop:3"`, `"drop=3"`, `"drop\t3"`.
fn parse_column(action: &str) -> Option<usize> {
    if is_digits(action) {
        return action.parse().ok();
    }

    let tail = action.strip_prefix("drop")?.trim();
    if tail.is_empty() {
        return None;
    }

    for sep in DROP_SEPARATORS {
        if tail.contains(sep) {
            let first = tail.split(sep).find(|part| !part.is_empty())?;
            if is_digits(first) {
                return first.parse().ok();
            }
        }
    }

    if is_digits(tail) { tail.parse().ok() } else { None }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_parses_trimmed_mixed_case() {
        let action = Action::parse(GameKind::Game2048, "  Left ");
        assert_eq!(action, Ok(Action::slide(Direction::Left)));
    }

    #[test]
    fn slide_rejects_unknown_word() {
        let err = Action::parse(GameKind::Game2048, "Diagonal").err();
        assert_eq!(err.as_ref().map(ActionParseError::input), Some("diagonal"));
    }

    #[test]
    fn drop_accepts_documented_variants() {
        for text in ["3", "drop 3", "DROP 3", "drop3", "drop:3", "drop=3", "drop\t3", " drop   3 "] {
            assert_eq!(
                Action::parse(GameKind::MergeFall, text),
                Ok(Action::drop_into(3)),
                "variant {text:?}"
            );
        }
    }

    #[test]
    fn drop_rejects_malformed_text() {
        for text in ["drop", "drop x", "drop -1", "left", "", "+3", "drop 3a"] {
            assert!(
                Action::parse(GameKind::MergeFall, text).is_err(),
                "variant {text:?} should be rejected"
            );
        }
    }

    #[test]
    fn drop_on_2048_is_not_a_direction() {
        assert!(Action::parse(GameKind::Game2048, "drop 1").is_err());
    }

    #[test]
    fn display_matches_valid_action_strings() {
        assert_eq!(Action::slide(Direction::Down).to_string(), "down");
        assert_eq!(Action::drop_into(4).to_string(), "drop 4");
    }
}
