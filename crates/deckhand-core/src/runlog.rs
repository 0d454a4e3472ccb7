//! Captured per-run log buffer.
//!
//! Every deployment run owns a `RunLog` that collects formatted lines
//! for the notification payload. Lines are mirrored to `tracing` as
//! they are captured, so live log output and the delivered report
//! always agree.

use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};

/// Cheaply cloneable ordered log line buffer.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RunLog {
    /// Create an empty run log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture an info-level line.
    pub fn info(&self, message: &str) {
        tracing::info!("{message}");
        self.push("INFO", message);
    }

    /// Capture an error-level line.
    pub fn error(&self, message: &str) {
        tracing::error!("{message}");
        self.push("ERRO", message);
    }

    fn push(&self, level: &str, message: &str) {
        let line = format!(
            "{level}[{}] {message}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        self.lines.lock().unwrap().push(line);
    }

    /// Snapshot of the captured lines in capture order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Render the captured log as one newline-joined string.
    pub fn render(&self) -> String {
        self.lines.lock().unwrap().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_keep_capture_order() {
        let log = RunLog::new();
        log.info("first");
        log.error("second");
        log.info("third");

        let lines = log.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("INFO["));
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].starts_with("ERRO["));
        assert!(lines[2].ends_with("third"));
    }

    #[test]
    fn test_clones_share_the_buffer() {
        let log = RunLog::new();
        let clone = log.clone();
        clone.info("from clone");
        assert_eq!(log.lines().len(), 1);
    }

    #[test]
    fn test_render_joins_lines() {
        let log = RunLog::new();
        log.info("a");
        log.info("b");
        let rendered = log.render();
        assert_eq!(rendered.lines().count(), 2);
    }
}
