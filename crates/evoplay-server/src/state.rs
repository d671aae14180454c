//! Shared application state for the game API.

use evoplay_core::GameService;

/// State shared by every request handler.
///
/// All session bookkeeping lives in the [`GameService`]; handlers only
/// translate HTTP into service calls.
#[derive(Debug)]
pub struct AppState {
    /// The session-aware game service.
    pub service: GameService,
}

impl AppState {
    /// Wrap a service for use as router state.
    pub const fn new(service: GameService) -> Self {
        Self { service }
    }
}
