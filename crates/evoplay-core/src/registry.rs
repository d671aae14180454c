//! Session registry: one engine and one move log per session key.
//!
//! The map itself sits behind an `RwLock` that is held only long enough to
//! find or insert a session. Each session has its own `Mutex`, held for the
//! full duration of one engine operation, so calls on one session are
//! linearised while different sessions never wait on each other.
//!
//! Sessions live until the registry is dropped; there is no eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::info;

use evoplay_games::{EngineSettings, GameEngine, new_engine};
use evoplay_types::SessionKey;

use crate::move_log::MoveLog;
use crate::sink::LogSink;

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// One running game and its move log.
#[derive(Debug)]
pub struct Session {
    /// The session's engine.
    pub engine: Box<dyn GameEngine>,
    /// Applied actions since the last reset.
    pub log: MoveLog,
}

/// Shared handle to a session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Concurrent map from session key to session.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionKey, SessionHandle>>,
    settings: EngineSettings,
    base_seed: Option<u64>,
    sink: Arc<dyn LogSink>,
}

impl SessionRegistry {
    /// An empty registry.
    ///
    /// With a `base_seed`, every session's PRNG seed is derived from it and
    /// the session key, so a given session replays identically across runs.
    pub fn new(settings: EngineSettings, base_seed: Option<u64>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            settings,
            base_seed,
            sink,
        }
    }

    /// Find the session for `key`, creating a freshly reset one if needed.
    pub fn session(&self, key: &SessionKey) -> SessionHandle {
        if let Some(handle) = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Arc::clone(handle);
        }

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            sessions
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(self.create(key)))),
        )
    }

    /// Run `f` with exclusive access to `key`'s session.
    pub fn with_session<R>(&self, key: &SessionKey, f: impl FnOnce(&mut Session) -> R) -> R {
        let handle = self.session(key);
        let mut session = handle.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    /// Whether a session exists for `key`.
    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no session has been created yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of every live session, sorted.
    pub fn keys(&self) -> Vec<SessionKey> {
        let mut keys: Vec<SessionKey> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn create(&self, key: &SessionKey) -> Session {
        let seed = session_seed(key, self.base_seed);
        info!(game = %key.game, session = %key.session, "Created new session");
        Session {
            engine: new_engine(key.game, &self.settings, seed),
            log: MoveLog::new(key.clone(), Arc::clone(&self.sink)),
        }
    }
}

/// PRNG seed for `key`.
///
/// With a base seed this is the FNV-1a hash of `"<game>/<session>"` xor the
/// base, so distinct sessions get distinct but reproducible streams.
/// Without one it is fresh entropy.
pub fn session_seed(key: &SessionKey, base_seed: Option<u64>) -> u64 {
    base_seed.map_or_else(rand::random, |base| {
        let bytes = key
            .game
            .as_str()
            .bytes()
            .chain(core::iter::once(b'/'))
            .chain(key.session.as_str().bytes());
        fnv1a(bytes) ^ base
    })
}

/// FNV-1a 64-bit hash of `bytes`.
pub(crate) fn fnv1a(bytes: impl IntoIterator<Item = u8>) -> u64 {
    bytes.into_iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}
