//! Per-session, append-only record of applied actions.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::warn;

use evoplay_types::{LogEntry, LogHeader, LogInfo, SessionKey, StateSnapshot};

use crate::sink::LogSink;

/// The move log of one session.
///
/// The game is opened on the sink lazily by the first recorded action,
/// so sessions that are only inspected never leave a file behind. Step
/// numbers start at 1 and `time` is measured from the first entry.
#[derive(Debug)]
pub struct MoveLog {
    key: SessionKey,
    sink: Arc<dyn LogSink>,
    entries: Vec<LogEntry>,
    steps: u64,
    started: Option<Instant>,
}

impl MoveLog {
    /// An empty log for `key` writing to `sink`.
    pub fn new(key: SessionKey, sink: Arc<dyn LogSink>) -> Self {
        Self {
            key,
            sink,
            entries: Vec::new(),
            steps: 0,
            started: None,
        }
    }

    /// Number of recorded steps.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Recorded entries, oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Append `action` with the state it produced and return its step.
    ///
    /// Sink failures are logged and otherwise ignored.
    pub fn record(&mut self, action: &str, state: &StateSnapshot) -> u64 {
        let started = *self.started.get_or_insert_with(|| {
            let header = LogHeader::new(self.key.game, self.key.session.clone(), Utc::now());
            if let Err(e) = self.sink.open(&self.key, &header) {
                warn!(session = %self.key, error = %e, "failed to open move log");
            }
            Instant::now()
        });

        self.steps = self.steps.saturating_add(1);
        let entry = LogEntry {
            step: self.steps,
            time: started.elapsed().as_secs_f64(),
            action: action.to_owned(),
            score: state.score(),
            game_over: state.game_over(),
            board: state.board().to_vec(),
        };

        if let Err(e) = self.sink.append(&self.key, &entry) {
            warn!(session = %self.key, step = entry.step, error = %e, "failed to append move log entry");
        }
        self.entries.push(entry);
        self.steps
    }

    /// Forget every entry. The next recorded action starts a new game on
    /// the sink, after the records already written there.
    pub fn restart(&mut self) {
        self.entries.clear();
        self.steps = 0;
        self.started = None;
    }

    /// Snapshot of the whole log.
    ///
    /// `elapsed_seconds` runs from the first entry to now.
    pub fn info(&self) -> LogInfo {
        LogInfo {
            steps: self.steps,
            elapsed_seconds: self.started.map_or(0.0, |t| t.elapsed().as_secs_f64()),
            log: self.entries.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use evoplay_types::{Game2048View, GameKind, SessionId};

    use super::*;
    use crate::sink::{LogRecord, MemorySink};

    fn state(score: u64) -> StateSnapshot {
        StateSnapshot::Game2048(Game2048View {
            board: vec![vec![2, 0], vec![0, 4]],
            score,
            game_over: false,
            won: false,
            valid_actions: vec![String::from("up")],
            error: None,
        })
    }

    fn log_with_sink() -> (MoveLog, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let key = SessionKey::new(GameKind::Game2048, SessionId::new("t"));
        (MoveLog::new(key, sink.clone()), sink)
    }

    #[test]
    fn header_is_written_on_first_record_only() {
        let (mut log, sink) = log_with_sink();
        assert!(sink.records().is_empty());

        log.record("up", &state(0));
        log.record("left", &state(4));

        let records: Vec<LogRecord> = sink.records().into_iter().map(|(_, r)| r).collect();
        assert_eq!(records.len(), 3);
        let LogRecord::Header(header) = &records[0] else {
            panic!("first record must be the header");
        };
        assert_eq!(header.game, GameKind::Game2048);
        assert_eq!(header.session.as_str(), "t");
        assert!(matches!(records[1], LogRecord::Entry(ref e) if e.step == 1));
        assert!(matches!(records[2], LogRecord::Entry(ref e) if e.step == 2));
    }

    #[test]
    fn steps_start_at_one_and_increase() {
        let (mut log, _) = log_with_sink();
        for expected in 1..=5 {
            assert_eq!(log.record("up", &state(expected)), expected);
        }
        let info = log.info();
        assert_eq!(info.steps, 5);
        let steps: Vec<u64> = info.log.iter().map(|e| e.step).collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5]);
        assert!(info.log.windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(info.log[4].score, 5);
        assert_eq!(info.log[4].board, vec![vec![2, 0], vec![0, 4]]);
    }

    #[test]
    fn empty_log_reports_zero() {
        let (log, _) = log_with_sink();
        let info = log.info();
        assert_eq!(info.steps, 0);
        assert!(info.log.is_empty());
        assert!(info.elapsed_seconds.abs() < f64::EPSILON);
    }

    #[test]
    fn restart_opens_a_new_game_on_the_sink() {
        let (mut log, sink) = log_with_sink();
        log.record("up", &state(0));
        log.restart();
        assert_eq!(log.steps(), 0);
        assert!(log.entries().is_empty());

        assert_eq!(log.record("down", &state(0)), 1);
        let headers = sink
            .records()
            .iter()
            .filter(|(_, r)| matches!(r, LogRecord::Header(_)))
            .count();
        assert_eq!(headers, 2);
    }
}
