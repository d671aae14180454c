//! Shared type definitions for the `EvoPlay` game server.
//!
//! This crate is the single source of truth for the values that cross the
//! engine boundary: game kinds, actions, session keys, state snapshots and
//! move-log records. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the web front-end.
//!
//! # Modules
//!
//! - [`actions`] -- Structured actions and the tolerant text parser
//! - [`enums`] -- Game kinds and directions
//! - [`ids`] -- Session identifiers and registry keys
//! - [`log`] -- Move log entries, headers and the read view
//! - [`snapshot`] -- Externally visible state snapshots

pub mod actions;
pub mod enums;
pub mod ids;
pub mod log;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use actions::{Action, ActionParseError};
pub use enums::{Direction, GameKind, UnknownGame};
pub use ids::{DEFAULT_SESSION, SessionId, SessionKey};
pub use log::{LOG_FORMAT, LOG_FORMAT_VERSION, LogEntry, LogHeader, LogInfo};
pub use snapshot::{Game2048View, MergeFallView, StateSnapshot};
