//! HTTP API for the `EvoPlay` game server.
//!
//! Humans and agents play every hosted game over plain `GET` requests:
//! the router maps `/api/game/{name}/...` paths onto the
//! [`GameService`](evoplay_core::GameService) operations, and a request's
//! optional `session` query parameter selects which independent game it
//! addresses.
//!
//! Responses are JSON. A rejected move is still a successful response
//! whose snapshot carries an `error` field; only unknown games (`404`)
//! and a missing `move` parameter (`400`) are HTTP errors.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
