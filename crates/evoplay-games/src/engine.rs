//! The engine contract shared by every game.
//!
//! A [`GameEngine`] owns one session's state. Its operations never fail
//! outward: an illegal or late action returns the unchanged snapshot with
//! an `error` annotation, and an internal invariant violation is reported
//! as a forced game over plus an `error`.

use evoplay_types::{Action, GameKind, StateSnapshot};

use crate::game_2048::Game2048;
use crate::mergefall::MergeFall;

/// Result of [`GameEngine::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Snapshot after the action (annotated with `error` when rejected).
    pub state: StateSnapshot,
    /// Whether the engine's state changed. Only applied actions are logged.
    pub applied: bool,
}

impl ActionOutcome {
    /// An action that changed the session.
    pub const fn applied(state: StateSnapshot) -> Self {
        Self {
            state,
            applied: true,
        }
    }

    /// A rejected action: `state` is the unchanged snapshot, annotated.
    pub fn rejected(state: StateSnapshot, message: impl Into<String>) -> Self {
        Self {
            state: state.with_error(message),
            applied: false,
        }
    }
}

/// Message returned for any action after the game has ended.
pub const GAME_OVER_MESSAGE: &str = "Game is already over.";

/// Message returned for an action outside the engine's current alphabet.
pub fn invalid_action_message(action: impl core::fmt::Display) -> String {
    format!("Invalid action: {action}")
}

/// One session's game.
///
/// Implementations are driven exclusively through this trait by the
/// session registry, which serialises calls per session.
pub trait GameEngine: Send + core::fmt::Debug {
    /// Which game this engine plays.
    fn kind(&self) -> GameKind;

    /// Current externally visible state.
    fn snapshot(&self) -> StateSnapshot;

    /// Actions the engine would currently accept. Empty once the game is over.
    fn valid_actions(&self) -> Vec<Action>;

    /// Apply a validated action.
    fn apply(&mut self, action: &Action) -> ActionOutcome;

    /// Restart the game and return the initial snapshot.
    fn reset(&mut self) -> StateSnapshot;

    /// Static, human-readable rules for this game.
    fn rules(&self) -> &'static str {
        crate::rules::rules_for(self.kind())
    }

    /// Whether the game has ended.
    fn is_over(&self) -> bool {
        self.snapshot().game_over()
    }
}

/// Dimensions used when the registry builds engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Side length of the square 2048 board.
    pub board_size_2048: usize,
    /// `MergeFall` column count.
    pub mergefall_width: usize,
    /// `MergeFall` visible row count.
    pub mergefall_height: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            board_size_2048: crate::game_2048::DEFAULT_SIZE,
            mergefall_width: crate::mergefall::DEFAULT_WIDTH,
            mergefall_height: crate::mergefall::DEFAULT_HEIGHT,
        }
    }
}

/// Build a freshly reset engine for `kind`.
///
/// Invalid dimensions (zero) fall back to the game's defaults.
pub fn new_engine(kind: GameKind, settings: &EngineSettings, seed: u64) -> Box<dyn GameEngine> {
    match kind {
        GameKind::Game2048 => Box::new(Game2048::with_size(settings.board_size_2048, seed)),
        GameKind::MergeFall => Box::new(MergeFall::with_dimensions(
            settings.mergefall_width,
            settings.mergefall_height,
            seed,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_requested_kind() {
        let settings = EngineSettings::default();
        for kind in GameKind::ALL {
            let engine = new_engine(kind, &settings, 1);
            assert_eq!(engine.kind(), kind);
            assert_eq!(engine.snapshot().kind(), kind);
            assert!(!engine.is_over());
        }
    }

    #[test]
    fn rules_are_game_specific() {
        let settings = EngineSettings::default();
        let a = new_engine(GameKind::Game2048, &settings, 1);
        let b = new_engine(GameKind::MergeFall, &settings, 1);
        assert!(a.rules().contains("2048"));
        assert!(b.rules().contains("MergeFall"));
    }
}
