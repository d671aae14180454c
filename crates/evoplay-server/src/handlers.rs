//! REST endpoint handlers for the game API.
//!
//! Every handler resolves the game named in the path, builds a session
//! key from the optional `session` query parameter, and runs one
//! [`GameService`] call on the blocking pool. Service calls take a
//! per-session lock and may write move-log files, so they stay off the
//! async workers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/games` | List hosted games |
//! | `GET` | `/api/game/{name}/state` | Current state |
//! | `GET` | `/api/game/{name}/action?move=..` | Apply one action |
//! | `GET` | `/api/game/{name}/reset` | Restart the game and its log |
//! | `GET` | `/api/game/{name}/valid_actions` | Currently legal actions |
//! | `GET` | `/api/game/{name}/log` | Move log of the session |
//! | `GET` | `/api/game/{name}/rules` | Rule text |
//! | `GET` | `/api/game/{name}/new_session` | Mint a session and return its state |

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

use evoplay_core::GameService;
use evoplay_types::{GameKind, SessionId, SessionKey};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters accepted by every game route.
#[derive(Debug, Default, serde::Deserialize)]
pub struct SessionQuery {
    /// Session to address. Absent or blank means the default session.
    pub session: Option<String>,
}

/// Query parameters for `GET /api/game/{name}/action`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ActionQuery {
    /// The action text, e.g. `up` or `drop 3`.
    #[serde(rename = "move")]
    pub action: Option<String>,
    /// Session to address.
    pub session: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn session_key(name: &str, session: Option<&str>) -> Result<SessionKey, ApiError> {
    let game = GameKind::from_str(name)?;
    Ok(SessionKey::new(game, SessionId::new(session.unwrap_or_default())))
}

/// Run `f` against the service on the blocking pool.
async fn run<R, F>(state: Arc<AppState>, f: F) -> Result<R, ApiError>
where
    R: Send + 'static,
    F: FnOnce(&GameService) -> R + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state.service))
        .await
        .map_err(|e| ApiError::Internal(format!("service task failed: {e}")))
}

// ---------------------------------------------------------------------------
// GET /api/games
// ---------------------------------------------------------------------------

/// List the games this server hosts.
pub async fn list_games(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let games = run(state, |service| service.list_games()).await?;
    Ok(Json(serde_json::json!({ "games": games })))
}

// ---------------------------------------------------------------------------
// Game routes
// ---------------------------------------------------------------------------

/// Current state of a session. Creates the session on first reference.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let key = session_key(&name, query.session.as_deref())?;
    let snapshot = run(state, move |service| service.get_state(&key)).await?;
    Ok(Json(snapshot))
}

/// Apply the `move` query parameter to a session.
///
/// Illegal or unparseable moves still answer `200` with the unchanged
/// state and an `error` field. Only a missing `move` is a `400`.
pub async fn apply_action(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<ActionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let key = session_key(&name, query.session.as_deref())?;
    let action = query
        .action
        .filter(|raw| !raw.is_empty())
        .ok_or(ApiError::MissingParameter("move"))?;
    let snapshot = run(state, move |service| service.apply_action(&key, &action)).await?;
    Ok(Json(snapshot))
}

/// Restart a session's game and move log.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let key = session_key(&name, query.session.as_deref())?;
    let snapshot = run(state, move |service| service.reset(&key)).await?;
    Ok(Json(snapshot))
}

/// Actions the session would accept right now.
pub async fn valid_actions(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let key = session_key(&name, query.session.as_deref())?;
    let actions = run(state, move |service| service.valid_actions(&key)).await?;
    Ok(Json(serde_json::json!({ "valid_actions": actions })))
}

/// The session's move log since its last reset.
pub async fn get_log(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let key = session_key(&name, query.session.as_deref())?;
    let info = run(state, move |service| service.get_log_info(&key)).await?;
    Ok(Json(info))
}

/// Rule text for a game. Does not touch any session.
pub async fn get_rules(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let game = GameKind::from_str(&name)?;
    let rules = run(state, move |service| service.get_rules(game)).await?;
    Ok(Json(serde_json::json!({ "game": game, "rules": rules })))
}

/// Mint a fresh session id and return it with the new session's state.
pub async fn new_session(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let game = GameKind::from_str(&name)?;
    let key = SessionKey::new(game, SessionId::generate());
    let session = key.session.clone();
    let snapshot = run(state, move |service| service.get_state(&key)).await?;
    Ok(Json(serde_json::json!({ "session": session, "state": snapshot })))
}
