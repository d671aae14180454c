//! The operations every front-end and agent drives.
//!
//! [`GameService`] resolves a session through the [`SessionRegistry`], runs
//! one engine operation under that session's lock, records applied actions
//! in the session's move log, and returns the resulting snapshot. None of
//! its operations fail: bad input comes back as an `error` field.

use std::sync::Arc;

use tracing::{debug, info};

use evoplay_games::engine::invalid_action_message;
use evoplay_games::{GAME_OVER_MESSAGE, rules};
use evoplay_types::actions::normalise;
use evoplay_types::{Action, GameKind, LogInfo, SessionKey, StateSnapshot};

use crate::config::EvoPlayConfig;
use crate::registry::SessionRegistry;
use crate::sink::LogSink;

/// Session-aware facade over the game engines.
#[derive(Debug)]
pub struct GameService {
    registry: SessionRegistry,
}

impl GameService {
    /// Wrap an existing registry.
    pub const fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    /// Build a service from configuration, logging moves to `sink`.
    pub fn from_config(config: &EvoPlayConfig, sink: Arc<dyn LogSink>) -> Self {
        Self::new(SessionRegistry::new(
            config.games.engine_settings(),
            config.games.seed,
            sink,
        ))
    }

    /// The underlying registry.
    pub const fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Every hosted game.
    pub const fn list_games(&self) -> &'static [GameKind] {
        &GameKind::ALL
    }

    /// Current state of `key`'s session.
    pub fn get_state(&self, key: &SessionKey) -> StateSnapshot {
        self.registry.with_session(key, |session| session.engine.snapshot())
    }

    /// Actions `key`'s session would accept right now, as action text.
    pub fn valid_actions(&self, key: &SessionKey) -> Vec<String> {
        self.registry.with_session(key, |session| {
            session
                .engine
                .valid_actions()
                .iter()
                .map(ToString::to_string)
                .collect()
        })
    }

    /// Parse `raw` and apply it to `key`'s session.
    ///
    /// Actions that change the game are appended to the move log under
    /// their canonical text. Anything else returns the unchanged state
    /// annotated with an `error` that echoes the caller's normalised text.
    pub fn apply_action(&self, key: &SessionKey, raw: &str) -> StateSnapshot {
        self.registry.with_session(key, |session| {
            if session.engine.is_over() {
                debug!(session = %key, action = raw, "action after game over");
                return session.engine.snapshot().with_error(GAME_OVER_MESSAGE);
            }

            let action = match Action::parse(key.game, raw) {
                Ok(action) => action,
                Err(e) => {
                    debug!(session = %key, error = %e, "unparseable action");
                    return session
                        .engine
                        .snapshot()
                        .with_error(invalid_action_message(e.input()));
                }
            };

            if !session.engine.valid_actions().contains(&action) {
                debug!(session = %key, %action, "action not currently valid");
                return session
                    .engine
                    .snapshot()
                    .with_error(invalid_action_message(normalise(raw)));
            }

            let outcome = session.engine.apply(&action);
            if outcome.applied {
                let step = session.log.record(&action.to_string(), &outcome.state);
                info!(
                    game = %key.game,
                    session = %key.session,
                    %action,
                    step,
                    score = outcome.state.score(),
                    game_over = outcome.state.game_over(),
                    "action applied"
                );
            } else {
                debug!(
                    session = %key,
                    %action,
                    error = outcome.state.error().unwrap_or_default(),
                    "action rejected"
                );
            }
            outcome.state
        })
    }

    /// Restart `key`'s game and its move log.
    ///
    /// A reset is not a logged step; the next applied action starts a new
    /// log at step 1.
    pub fn reset(&self, key: &SessionKey) -> StateSnapshot {
        self.registry.with_session(key, |session| {
            session.log.restart();
            let state = session.engine.reset();
            info!(game = %key.game, session = %key.session, "session reset");
            state
        })
    }

    /// Static rule text for `game`.
    pub const fn get_rules(&self, game: GameKind) -> &'static str {
        rules::rules_for(game)
    }

    /// The move log of `key`'s session.
    pub fn get_log_info(&self, key: &SessionKey) -> LogInfo {
        self.registry.with_session(key, |session| session.log.info())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use evoplay_games::EngineSettings;
    use evoplay_types::SessionId;

    use super::*;
    use crate::sink::{LogRecord, MemorySink};

    fn service_with_sink() -> (GameService, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let registry = SessionRegistry::new(EngineSettings::default(), Some(11), sink.clone());
        (GameService::new(registry), sink)
    }

    fn key(game: GameKind) -> SessionKey {
        SessionKey::new(game, SessionId::new("svc"))
    }

    #[test]
    fn lists_both_games() {
        let (service, _) = service_with_sink();
        assert_eq!(service.list_games(), &[GameKind::Game2048, GameKind::MergeFall]);
    }

    #[test]
    fn tolerant_text_reaches_the_engine() {
        let (service, _) = service_with_sink();
        let k = key(GameKind::MergeFall);
        for raw in ["drop 0", " DROP:1 ", "2", "drop=3", "drop\t4"] {
            let state = service.apply_action(&k, raw);
            assert!(state.error().is_none(), "{raw:?} was rejected");
        }
        assert_eq!(service.get_log_info(&k).steps, 5);
        let actions: Vec<String> = service
            .get_log_info(&k)
            .log
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec!["drop 0", "drop 1", "drop 2", "drop 3", "drop 4"]);
    }

    #[test]
    fn malformed_text_is_reported_with_normalised_input() {
        let (service, _) = service_with_sink();
        let k = key(GameKind::Game2048);
        let before = service.get_state(&k);
        let state = service.apply_action(&k, "  Sideways ");
        assert_eq!(state.error(), Some("Invalid action: sideways"));
        assert_eq!(state.board(), before.board());
        assert_eq!(service.get_log_info(&k).steps, 0);
    }

    #[test]
    fn out_of_range_drop_echoes_the_caller_text() {
        let (service, _) = service_with_sink();
        let k = key(GameKind::MergeFall);
        let state = service.apply_action(&k, " Drop:7 ");
        assert_eq!(state.error(), Some("Invalid action: drop:7"));
        assert_eq!(service.get_log_info(&k).steps, 0);
    }

    #[test]
    fn rejected_actions_are_not_logged() {
        let (service, sink) = service_with_sink();
        let k = key(GameKind::MergeFall);
        service.apply_action(&k, "drop 99");
        service.apply_action(&k, "nonsense");
        assert!(sink.records().is_empty());

        service.apply_action(&k, "drop 0");
        let info = service.get_log_info(&k);
        assert_eq!(info.steps, 1);
        assert_eq!(info.log[0].step, 1);
        assert_eq!(sink.records_for(&k).len(), 2);
        assert!(matches!(sink.records_for(&k)[0], LogRecord::Header(_)));
    }

    #[test]
    fn reset_restarts_game_and_log() {
        let (service, _) = service_with_sink();
        let k = key(GameKind::MergeFall);
        service.apply_action(&k, "drop 0");
        service.apply_action(&k, "drop 0");
        assert_eq!(service.get_log_info(&k).steps, 2);

        let state = service.reset(&k);
        assert_eq!(state.score(), 0);
        assert!(state.board().iter().flatten().all(|&v| v == 0));
        assert_eq!(service.get_log_info(&k).steps, 0);

        service.apply_action(&k, "drop 1");
        assert_eq!(service.get_log_info(&k).log[0].step, 1);
    }

    #[test]
    fn valid_actions_use_action_text() {
        let (service, _) = service_with_sink();
        let actions = service.valid_actions(&key(GameKind::MergeFall));
        assert_eq!(actions, vec!["drop 0", "drop 1", "drop 2", "drop 3", "drop 4"]);
    }

    #[test]
    fn sessions_are_isolated() {
        let (service, _) = service_with_sink();
        let a = SessionKey::new(GameKind::MergeFall, SessionId::new("a"));
        let b = SessionKey::new(GameKind::MergeFall, SessionId::new("b"));
        service.apply_action(&a, "drop 2");
        assert_eq!(service.get_log_info(&a).steps, 1);
        assert_eq!(service.get_log_info(&b).steps, 0);
        assert!(service.get_state(&b).board().iter().flatten().all(|&v| v == 0));
    }

    #[test]
    fn rules_are_served_per_game() {
        let (service, _) = service_with_sink();
        assert!(service.get_rules(GameKind::Game2048).starts_with("2048 Game Rules"));
        assert!(service.get_rules(GameKind::MergeFall).starts_with("MergeFall Game Rules"));
    }
}
