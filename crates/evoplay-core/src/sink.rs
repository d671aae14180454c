//! Destinations for move-log records.
//!
//! A [`LogSink`] receives one header per game followed by one record per
//! applied action. Sinks only ever append: a reset starts a new game with a
//! new header after the old one's records, it never removes them.
//!
//! [`NullSink`] discards everything and is what the server uses when no log
//! directory is configured. [`MemorySink`] keeps everything in process for
//! tests. [`JsonlFileSink`] writes one JSON-lines file per session.
//!
//! Sinks report failures to their caller, but [`MoveLog`](crate::MoveLog)
//! only logs them: a broken disk never fails a game action.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use evoplay_types::{LogEntry, LogHeader, SessionKey};

use crate::registry::fnv1a;

/// Longest session-id fragment used in a file name.
const MAX_FILE_STEM_SESSION_LEN: usize = 64;

/// Errors raised while writing log records.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Creating or writing a log file failed.
    #[error("log I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A record could not be serialized.
    #[error("log serialization error: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// One line of a log artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogRecord {
    /// First line of every artifact.
    Header(LogHeader),
    /// One applied action.
    Entry(LogEntry),
}

/// Append-only destination for move logs.
///
/// Calls for one session are serialised by the session lock; calls for
/// different sessions may arrive concurrently.
pub trait LogSink: Send + Sync + core::fmt::Debug {
    /// Start a new game in `key`'s artifact. Earlier games are kept.
    fn open(&self, key: &SessionKey, header: &LogHeader) -> Result<(), SinkError>;

    /// Append one entry to `key`'s current artifact.
    fn append(&self, key: &SessionKey, entry: &LogEntry) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// Null
// ---------------------------------------------------------------------------

/// Discards every record. The in-memory [`MoveLog`](crate::MoveLog) still
/// serves `get_log_info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn open(&self, _key: &SessionKey, _header: &LogHeader) -> Result<(), SinkError> {
        Ok(())
    }

    fn append(&self, _key: &SessionKey, _entry: &LogEntry) -> Result<(), SinkError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Keeps every record in memory, in arrival order.
///
/// Nothing is ever dropped, so this is meant for tests and short runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(SessionKey, LogRecord)>>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record received so far.
    pub fn records(&self) -> Vec<(SessionKey, LogRecord)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records received for `key`, oldest first.
    pub fn records_for(&self, key: &SessionKey) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, record)| record.clone())
            .collect()
    }

    fn push(&self, key: &SessionKey, record: LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((key.clone(), record));
    }
}

impl LogSink for MemorySink {
    fn open(&self, key: &SessionKey, header: &LogHeader) -> Result<(), SinkError> {
        self.push(key, LogRecord::Header(header.clone()));
        Ok(())
    }

    fn append(&self, key: &SessionKey, entry: &LogEntry) -> Result<(), SinkError> {
        self.push(key, LogRecord::Entry(entry.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON lines
// ---------------------------------------------------------------------------

/// Writes `<game>_<session>_<hash>.jsonl` files under a directory.
#[derive(Debug, Clone)]
pub struct JsonlFileSink {
    dir: PathBuf,
}

impl JsonlFileSink {
    /// Use `dir` for log files, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the log files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds `key`'s log.
    ///
    /// Characters outside `[A-Za-z0-9_-]` in the session id become `_`, so
    /// a caller-chosen id can never escape the log directory. The trailing
    /// FNV-1a hash of the raw id keeps ids that sanitise alike apart.
    pub fn path_for(&self, key: &SessionKey) -> PathBuf {
        let session: String = key
            .session
            .as_str()
            .chars()
            .take(MAX_FILE_STEM_SESSION_LEN)
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let hash = fnv1a(key.session.as_str().bytes());
        self.dir
            .join(format!("{}_{session}_{hash:016x}.jsonl", key.game))
    }

    fn append_line(&self, key: &SessionKey, record: &LogRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(key))?
            .write_all(&line)?;
        Ok(())
    }
}

impl LogSink for JsonlFileSink {
    fn open(&self, key: &SessionKey, header: &LogHeader) -> Result<(), SinkError> {
        self.append_line(key, &LogRecord::Header(header.clone()))
    }

    fn append(&self, key: &SessionKey, entry: &LogEntry) -> Result<(), SinkError> {
        self.append_line(key, &LogRecord::Entry(entry.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use evoplay_types::{GameKind, SessionId};

    use super::*;

    fn entry(step: u64) -> LogEntry {
        LogEntry {
            step,
            time: 0.0,
            action: String::from("left"),
            score: 4,
            game_over: false,
            board: vec![vec![4, 0], vec![0, 2]],
        }
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir()
            .join(format!("evoplay-sink-{}", std::process::id()))
            .join(SessionId::generate().as_str())
    }

    #[test]
    fn memory_sink_keeps_records_per_session() {
        let sink = MemorySink::new();
        let a = SessionKey::new(GameKind::Game2048, SessionId::new("a"));
        let b = SessionKey::new(GameKind::MergeFall, SessionId::new("b"));
        let header = LogHeader::new(GameKind::Game2048, SessionId::new("a"), Utc::now());

        sink.open(&a, &header).unwrap();
        sink.append(&a, &entry(1)).unwrap();
        sink.append(&b, &entry(1)).unwrap();

        let for_a = sink.records_for(&a);
        assert_eq!(for_a.len(), 2);
        assert!(matches!(for_a[0], LogRecord::Header(_)));
        assert_eq!(sink.records().len(), 3);
    }

    fn file_name(sink: &JsonlFileSink, key: &SessionKey) -> String {
        let path = sink.path_for(key);
        assert_eq!(path.parent(), Some(Path::new("logs")));
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn file_names_are_sanitised() {
        let sink = JsonlFileSink {
            dir: PathBuf::from("logs"),
        };
        let key = SessionKey::new(GameKind::MergeFall, SessionId::new("../../etc/passwd"));
        let name = file_name(&sink, &key);
        assert!(name.starts_with("mergefall_______etc_passwd_"), "{name}");
        assert!(name.ends_with(".jsonl"));

        let name = file_name(&sink, &SessionKey::default_for(GameKind::Game2048));
        assert!(name.starts_with("2048_default_"), "{name}");
    }

    #[test]
    fn ids_that_sanitise_alike_get_distinct_files() {
        let sink = JsonlFileSink {
            dir: PathBuf::from("logs"),
        };
        let spaced = SessionKey::new(GameKind::MergeFall, SessionId::new("a b"));
        let underscored = SessionKey::new(GameKind::MergeFall, SessionId::new("a_b"));
        assert_ne!(sink.path_for(&spaced), sink.path_for(&underscored));

        let long = "x".repeat(80);
        let longer = "x".repeat(81);
        assert_ne!(
            sink.path_for(&SessionKey::new(GameKind::Game2048, SessionId::new(&long))),
            sink.path_for(&SessionKey::new(GameKind::Game2048, SessionId::new(&longer)))
        );
    }

    #[test]
    fn null_sink_accepts_everything() {
        let key = SessionKey::default_for(GameKind::MergeFall);
        let header = LogHeader::new(GameKind::MergeFall, SessionId::default_session(), Utc::now());
        assert!(NullSink.open(&key, &header).is_ok());
        assert!(NullSink.append(&key, &entry(1)).is_ok());
    }

    #[test]
    fn jsonl_sink_writes_header_then_entries() {
        let dir = scratch_dir();
        let sink = JsonlFileSink::new(&dir).unwrap();
        let key = SessionKey::new(GameKind::Game2048, SessionId::new("run-1"));
        let header = LogHeader::new(GameKind::Game2048, SessionId::new("run-1"), Utc::now());

        sink.open(&key, &header).unwrap();
        sink.append(&key, &entry(1)).unwrap();
        sink.append(&key, &entry(2)).unwrap();

        let contents = fs::read_to_string(sink.path_for(&key)).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "header");
        assert_eq!(lines[0]["game"], "2048");
        assert_eq!(lines[0]["session"], "run-1");
        assert_eq!(lines[1]["type"], "entry");
        assert_eq!(lines[2]["step"], 2);
        assert_eq!(lines[2]["board"], serde_json::json!([[4, 0], [0, 2]]));

        // A second game follows the first; nothing is truncated.
        sink.open(&key, &header).unwrap();
        sink.append(&key, &entry(1)).unwrap();
        let contents = fs::read_to_string(sink.path_for(&key)).unwrap();
        let types: Vec<String> = contents
            .lines()
            .map(|line| {
                let record: serde_json::Value = serde_json::from_str(line).unwrap();
                record["type"].as_str().unwrap().to_owned()
            })
            .collect();
        assert_eq!(types, vec!["header", "entry", "entry", "header", "entry"]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
