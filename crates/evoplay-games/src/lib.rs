//! Game engines for the `EvoPlay` server.
//!
//! Every engine implements [`GameEngine`]: it owns one session's board,
//! score and PRNG, and resolves moves synchronously. Engines never fail
//! outward; rejected or impossible actions come back as an annotated
//! snapshot.
//!
//! # Modules
//!
//! - [`board`] -- Fixed-size tile grid and direction-aware lanes
//! - [`engine`] -- The [`GameEngine`] trait and engine factory
//! - [`error`] -- Board and resolution errors
//! - [`game_2048`] -- Classic 2048
//! - [`mergefall`] -- Drop, gravity and chained absorption
//! - [`rules`] -- Static rule text per game
//! - [`tiles`] -- Seeded tile sources and spawn distributions

pub mod board;
pub mod engine;
pub mod error;
pub mod game_2048;
pub mod mergefall;
pub mod rules;
pub mod tiles;

pub use board::Board;
pub use engine::{ActionOutcome, EngineSettings, GAME_OVER_MESSAGE, GameEngine, new_engine};
pub use error::GameError;
pub use game_2048::Game2048;
pub use mergefall::{MergeFall, TurnReport};
pub use tiles::{ClassicTiles, MergeFallTiles, RandomTileSource, TileDistribution};
