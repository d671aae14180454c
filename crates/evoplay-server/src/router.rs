//! Axum router construction for the game API.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete router for the game API.
///
/// Every game route takes the game name as its `{name}` segment and an
/// optional `session` query parameter. CORS allows any origin so browser
/// front-ends served elsewhere can drive the API.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/games", get(handlers::list_games))
        .route("/api/game/{name}/state", get(handlers::get_state))
        .route("/api/game/{name}/action", get(handlers::apply_action))
        .route("/api/game/{name}/reset", get(handlers::reset))
        .route("/api/game/{name}/valid_actions", get(handlers::valid_actions))
        .route("/api/game/{name}/log", get(handlers::get_log))
        .route("/api/game/{name}/rules", get(handlers::get_rules))
        .route("/api/game/{name}/new_session", get(handlers::new_session))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
