//! The combat log: an append-only record of narrated events.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use sk_core::CombatantId;

use crate::error::{TrackerError, TrackerResult};

/// One narrated event, immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Round number at the time of writing.
    pub round: u32,
    /// Whose turn it was, if anyone's.
    pub turn: Option<CombatantId>,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// Human-readable description.
    pub message: String,
}

/// Chronological, append-only log of combat events.
///
/// The backing buffer grows as needed (amortized O(1) append). The log is
/// session-scoped: exporting streams every entry to a file and clears the
/// buffer, but nothing short of export or a state reload discards entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatLog {
    entries: Vec<LogEntry>,
}

impl CombatLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with the given round and turn.
    pub fn record(&mut self, round: u32, turn: Option<CombatantId>, message: impl Into<String>) {
        self.entries.push(LogEntry {
            round,
            turn,
            timestamp: Utc::now(),
            message: message.into(),
        });
    }

    /// All entries in chronological order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append the full log to a file as a banner-framed session block.
    ///
    /// The file is opened in append mode so repeated exports accumulate.
    /// The in-memory buffer is untouched; the caller clears it once this
    /// returns `Ok`.
    pub fn export_to(&self, path: &Path) -> TrackerResult<()> {
        let io_err = |source| TrackerError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut block = String::new();
        block.push_str("================================================\n");
        block.push_str(&format!(
            "COMBAT LOG EXPORT: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        block.push_str("================================================\n");
        for entry in &self.entries {
            block.push_str(&format!("[R{}] {}\n", entry.round, entry.message));
        }
        block.push_str("--- END OF LOG ---\n\n");

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;
        file.write_all(block.as_bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_query() {
        let mut log = CombatLog::new();
        assert!(log.is_empty());

        log.record(1, None, "Added Aria: Init 15, HP 20.");
        log.record(2, Some(CombatantId::new(1)), "Aria's turn.");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].round, 1);
        assert_eq!(log.entries()[1].turn, Some(CombatantId::new(1)));
    }

    #[test]
    fn recent_returns_tail() {
        let mut log = CombatLog::new();
        for i in 0..10 {
            log.record(1, None, format!("event {i}"));
        }
        let tail = log.recent(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].message, "event 7");
        assert_eq!(log.recent(99).len(), 10);
    }

    #[test]
    fn export_appends_banner_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combat_log.txt");

        let mut log = CombatLog::new();
        log.record(1, None, "Added Orc: Init 10, HP 15.");
        log.record(2, None, "--- START OF ROUND 2 ---");
        log.export_to(&path).unwrap();
        log.export_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("COMBAT LOG EXPORT:").count(), 2);
        assert_eq!(content.matches("[R1] Added Orc: Init 10, HP 15.").count(), 2);
        assert_eq!(content.matches("--- END OF LOG ---").count(), 2);
        assert!(content.contains("[R2] --- START OF ROUND 2 ---"));
    }

    #[test]
    fn export_failure_reports_path() {
        let log = CombatLog::new();
        let bad = Path::new("/nonexistent-dir/combat_log.txt");
        let err = log.export_to(bad).unwrap_err();
        assert!(err.to_string().contains("nonexistent-dir"));
    }

    #[test]
    fn serde_roundtrip() {
        let mut log = CombatLog::new();
        log.record(3, Some(CombatantId::new(2)), "Orc took 5 damage (10/15).");
        let json = serde_json::to_string(&log).unwrap();
        let back: CombatLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entries(), log.entries());
    }
}
