//! Append-only event log.
//!
//! Records the externally observable milestones of a run, one line per event:
//! a start timestamp when the log is created, session initialization, each
//! received frame result, and each shed frame. Replies are logged verbatim as
//! opaque data; nothing on the receive path is decoded here.
//!
//! The log file is truncated at startup. Mid-run write failures are reported
//! via `tracing` and otherwise ignored; only failure to create the log aborts
//! the run.

// ============================================================================
// Imports
// ============================================================================

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, warn};

use crate::error::{Error, Result};

// ============================================================================
// EventLog
// ============================================================================

/// Append-only line-per-event sink backed by a file.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    file: File,
}

impl EventLog {
    /// Creates (truncating) the event log and writes the start line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Journal`] if the file cannot be created.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::journal(&path, e))?;
            }
        }
        let file = File::create(&path).map_err(|e| Error::journal(&path, e))?;

        let mut log = Self { path, file };
        let started = Local::now().format("%Y-%m-%d %H:%M:%S");
        log.record(&format!("Streamer started at {started}"));
        debug!(path = %log.path.display(), "Event log created");
        Ok(log)
    }

    /// Returns the path of the backing file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records a session initialization.
    pub fn session_initialized(&mut self, id: &str) {
        self.record(&format!("Session initialized: {id}"));
    }

    /// Records the raw reply received for frame `index`.
    ///
    /// The reply is opaque; it is logged verbatim (lossily decoded as UTF-8).
    pub fn frame_result(&mut self, index: usize, raw: &[u8]) {
        let reply = String::from_utf8_lossy(raw);
        self.record(&format!("Frame {index}: {reply}"));
    }

    /// Records a frame shed because the localizer was still busy.
    pub fn frame_dropped(&mut self, index: usize) {
        self.record(&format!("Dropped frame {index} (localizer busy)"));
    }

    /// Appends one line and flushes.
    fn record(&mut self, line: &str) {
        if let Err(e) = writeln!(self.file, "{line}").and_then(|()| self.file.flush()) {
            warn!(path = %self.path.display(), error = %e, "Event log write failed");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .expect("read log")
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_create_writes_start_line() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("run.log");
        let _log = EventLog::create(&path).expect("create");

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Streamer started at "));
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("run.log");

        {
            let mut log = EventLog::create(&path).expect("create");
            log.session_initialized("OLD");
        }
        let _log = EventLog::create(&path).expect("recreate");

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 1);
        assert!(!lines.iter().any(|l| l.contains("OLD")));
    }

    #[test]
    fn test_create_makes_parent_dirs() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested/deep/run.log");
        let log = EventLog::create(&path).expect("create");
        assert_eq!(log.path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn test_event_line_formats() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("run.log");
        let mut log = EventLog::create(&path).expect("create");

        log.session_initialized("S1");
        log.frame_result(0, br#"{"lat": 1.0, "lng": 2.0}"#);
        log.frame_dropped(1);

        let lines = read_lines(&path);
        assert_eq!(lines[1], "Session initialized: S1");
        assert_eq!(lines[2], r#"Frame 0: {"lat": 1.0, "lng": 2.0}"#);
        assert_eq!(lines[3], "Dropped frame 1 (localizer busy)");
    }

    #[test]
    fn test_frame_result_logs_non_utf8_lossily() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("run.log");
        let mut log = EventLog::create(&path).expect("create");

        log.frame_result(3, &[0xff, 0xfe, b'o', b'k']);

        let lines = read_lines(&path);
        assert!(lines[1].starts_with("Frame 3: "));
        assert!(lines[1].ends_with("ok"));
    }
}
