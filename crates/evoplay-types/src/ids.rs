//! Session identifiers.
//!
//! A session is addressed by the pair of a [`GameKind`] and an opaque
//! [`SessionId`]. Callers choose their own identifiers (a browser tab, an
//! agent run, a benchmark episode); the server only mints one when asked.
//! Freshly minted identifiers use UUID v7 so that they sort by creation
//! time in log directories.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::enums::GameKind;

/// Identifier used when a caller does not name a session.
///
/// Every request that omits a session shares this one, so a single-player
/// client never has to think about sessions at all.
pub const DEFAULT_SESSION: &str = "default";

/// Opaque, caller-supplied session identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a caller-supplied identifier.
    ///
    /// Surrounding whitespace is trimmed. An empty identifier falls back
    /// to [`DEFAULT_SESSION`].
    pub fn new(id: impl AsRef<str>) -> Self {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            Self::default_session()
        } else {
            Self(trimmed.to_owned())
        }
    }

    /// Mint a fresh identifier using UUID v7 (time-ordered).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// The implicit session used when a caller does not name one.
    pub fn default_session() -> Self {
        Self(DEFAULT_SESSION.to_owned())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::default_session()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Registry key: exactly one live engine exists per key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionKey {
    /// Which game this session plays.
    pub game: GameKind,
    /// The caller-facing session identifier.
    pub session: SessionId,
}

impl SessionKey {
    /// Build a key from its parts.
    pub const fn new(game: GameKind, session: SessionId) -> Self {
        Self { game, session }
    }

    /// Key for the implicit default session of a game.
    pub fn default_for(game: GameKind) -> Self {
        Self::new(game, SessionId::default_session())
    }
}

impl core::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.game, self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_id_falls_back_to_default() {
        assert_eq!(SessionId::new("   "), SessionId::default_session());
        assert_eq!(SessionId::new(" tab-1 ").as_str(), "tab-1");
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn session_id_serializes_as_plain_string() {
        let id = SessionId::new("agent-7");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"agent-7\""));
    }

    #[test]
    fn key_display_joins_game_and_session() {
        let key = SessionKey::new(GameKind::MergeFall, SessionId::new("run"));
        assert_eq!(key.to_string(), "mergefall/run");
    }
}
