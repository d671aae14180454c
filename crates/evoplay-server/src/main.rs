//! `EvoPlay` server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the first CLI argument, or
//!    `evoplay-config.yaml`, falling back to defaults
//! 2. Initialize structured logging (tracing)
//! 3. Choose the move-log sink (JSON-lines files, or none)
//! 4. Build the game service and serve the API until `Ctrl-C`

use std::path::PathBuf;
use std::sync::Arc;

use evoplay_core::config::{DEFAULT_CONFIG_FILE, LoggingConfig};
use evoplay_core::{EvoPlayConfig, GameService, JsonlFileSink, LogSink, NullSink};
use evoplay_server::{AppState, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: evoplay_core::ConfigError,
    },

    /// The move-log directory could not be prepared.
    #[error("move log error: {source}")]
    Sink {
        /// The underlying sink error.
        #[from]
        source: evoplay_core::SinkError,
    },

    /// The HTTP server failed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: evoplay_server::ServerError,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
    let config = EvoPlayConfig::load_or_default(&config_path)?;

    init_tracing(&config.logging);
    info!(
        path = %config_path.display(),
        found = config_path.exists(),
        host = config.server.host,
        port = config.server.port,
        seed = ?config.games.seed,
        "Configuration loaded"
    );

    let sink: Arc<dyn LogSink> = match &config.logging.log_dir {
        Some(dir) => {
            let sink = JsonlFileSink::new(dir)?;
            info!(dir = %sink.dir().display(), "Writing move logs to disk");
            Arc::new(sink)
        }
        None => Arc::new(NullSink),
    };

    let state = Arc::new(AppState::new(GameService::from_config(&config, sink)));
    start_server(&config.server, state).await?;
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
