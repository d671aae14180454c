//! Session management for the `EvoPlay` game server.
//!
//! Ties the game engines to the outside world: a [`SessionRegistry`] owns
//! one engine per `(game, session)` key, a [`MoveLog`] records every
//! applied action through a [`LogSink`], and [`GameService`] exposes the
//! operations the HTTP layer dispatches to.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`move_log`] -- Per-session append-only move log
//! - [`registry`] -- Concurrent session map with per-session locking
//! - [`service`] -- The game operations front-ends call
//! - [`sink`] -- Null, memory and JSON-lines log destinations

pub mod config;
pub mod move_log;
pub mod registry;
pub mod service;
pub mod sink;

pub use config::{ConfigError, EvoPlayConfig};
pub use move_log::MoveLog;
pub use registry::{Session, SessionRegistry};
pub use service::GameService;
pub use sink::{JsonlFileSink, LogRecord, LogSink, MemorySink, NullSink, SinkError};
