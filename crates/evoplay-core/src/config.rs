//! Configuration loading and typed config structures for the `EvoPlay` server.
//!
//! The canonical configuration lives in `evoplay-config.yaml` at the project
//! root. Every section and field has a default, so an empty or missing file
//! yields a server on `0.0.0.0:5001` with randomly seeded sessions and
//! in-memory move logs.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use evoplay_games::EngineSettings;
use evoplay_games::game_2048::DEFAULT_SIZE;
use evoplay_games::mergefall::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "evoplay-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `evoplay-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EvoPlayConfig {
    /// HTTP bind address.
    #[serde(default)]
    pub server: ServerConfig,

    /// Engine dimensions and seeding.
    #[serde(default)]
    pub games: GamesConfig,

    /// Log level, output format and move-log directory.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EvoPlayConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `EVOPLAY_HOST` overrides `server.host`
    /// - `EVOPLAY_PORT` overrides `server.port`
    /// - `EVOPLAY_SEED` overrides `games.seed`
    /// - `EVOPLAY_LOG_DIR` overrides `logging.log_dir`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    ///
    /// Environment overrides are applied either way.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file) for a file that exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        tracing::info!(path = %path.display(), "config file not found; using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override values with `EVOPLAY_*` environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override values from `lookup`, which maps a variable name to its value.
    ///
    /// Values that do not parse (a non-numeric port, say) are ignored with a
    /// warning and the configured value is kept.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("EVOPLAY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("EVOPLAY_PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(e) => tracing::warn!(value = %port, error = %e, "ignoring invalid EVOPLAY_PORT"),
            }
        }
        if let Some(seed) = lookup("EVOPLAY_SEED") {
            match seed.trim().parse() {
                Ok(seed) => self.games.seed = Some(seed),
                Err(e) => tracing::warn!(value = %seed, error = %e, "ignoring invalid EVOPLAY_SEED"),
            }
        }
        if let Some(dir) = lookup("EVOPLAY_LOG_DIR") {
            self.logging.log_dir = if dir.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Engine configuration shared by every session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GamesConfig {
    /// Base seed. When set, every session's PRNG is derived from it and the
    /// session key, so runs are reproducible. When absent, sessions draw
    /// fresh entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// 2048 settings.
    #[serde(default)]
    pub game_2048: Game2048Config,

    /// `MergeFall` settings.
    #[serde(default)]
    pub mergefall: MergeFallConfig,
}

impl GamesConfig {
    /// Dimensions handed to the engine factory.
    pub const fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            board_size_2048: self.game_2048.size,
            mergefall_width: self.mergefall.width,
            mergefall_height: self.mergefall.height,
        }
    }
}

/// 2048 settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Game2048Config {
    /// Side length of the square board.
    #[serde(default = "default_board_size")]
    pub size: usize,
}

impl Default for Game2048Config {
    fn default() -> Self {
        Self {
            size: default_board_size(),
        }
    }
}

/// `MergeFall` settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeFallConfig {
    /// Number of columns.
    #[serde(default = "default_mergefall_width")]
    pub width: usize,

    /// Number of visible rows.
    #[serde(default = "default_mergefall_height")]
    pub height: usize,
}

impl Default for MergeFallConfig {
    fn default() -> Self {
        Self {
            width: default_mergefall_width(),
            height: default_mergefall_height(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// Directory for per-session move-log files. Move logs stay in memory
    /// when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            log_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    5001
}

const fn default_board_size() -> usize {
    DEFAULT_SIZE
}

const fn default_mergefall_width() -> usize {
    DEFAULT_WIDTH
}

const fn default_mergefall_height() -> usize {
    DEFAULT_HEIGHT
}

fn default_log_level() -> String {
    String::from("info")
}
