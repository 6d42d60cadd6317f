//! Logging and output control
//!
//! This module provides the [`Logger`] that is handed to every component at
//! construction. It controls console verbosity and can mirror every message
//! into an append-only log file, so nothing in the crate relies on a
//! process-wide logger.

use crate::error::{CheckerError, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Logger responsible for all user-visible output
#[derive(Debug, Clone)]
pub struct Logger {
    pub verbose: bool,
    pub quiet: bool,
    pub start_time: Option<Instant>,
    sink: Option<Arc<Mutex<File>>>,
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            quiet: false,
            start_time: Some(Instant::now()),
            sink: None,
        }
    }

    pub fn new_quiet() -> Self {
        Self {
            verbose: false,
            quiet: true,
            start_time: Some(Instant::now()),
            sink: None,
        }
    }

    /// Also append every emitted message to `path`.
    ///
    /// Lines are written as `YYYY-MM-DD HH:MM:SS - LEVEL - message`. Quiet
    /// mode only silences the console; the file still receives everything.
    pub fn with_log_file(mut self, path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                CheckerError::Config(format!(
                    "cannot open log file {}: {}",
                    path.display(),
                    e
                ))
            })?;
        self.sink = Some(Arc::new(Mutex::new(file)));
        Ok(self)
    }

    fn record(&self, level: &str, message: &str) {
        if let Some(sink) = &self.sink {
            if let Ok(mut file) = sink.lock() {
                let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "{} - {} - {}", stamp, level, message);
            }
        }
    }

    /// Main section heading
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n=== {} ===", title);
        }
    }

    /// Sub-section heading
    pub fn subsection(&self, title: &str) {
        if !self.quiet {
            println!("\n--- {} ---", title);
        }
    }

    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.record("DEBUG", message);
            if !self.quiet {
                println!("🐛 DEBUG: {}", message);
            }
        }
    }

    pub fn verbose(&self, message: &str) {
        if self.verbose {
            self.record("INFO", message);
            if !self.quiet {
                println!("📝 {}", message);
            }
        }
    }

    /// Information message
    pub fn info(&self, message: &str) {
        self.record("INFO", message);
        if !self.quiet {
            println!("ℹ️  {}", message);
        }
    }

    /// Success message
    pub fn success(&self, message: &str) {
        self.record("INFO", message);
        if !self.quiet {
            println!("✅ {}", message);
        }
    }

    /// Warning message
    pub fn warning(&self, message: &str) {
        self.record("WARNING", message);
        if !self.quiet {
            println!("⚠️  WARNING: {}", message);
        }
    }

    /// Error message, shown even in quiet mode
    pub fn error(&self, message: &str) {
        self.record("ERROR", message);
        eprintln!("❌ ERROR: {}", message);
    }

    /// Step information
    pub fn step(&self, message: &str) {
        self.record("INFO", message);
        if !self.quiet {
            println!("▶️  {}", message);
        }
    }

    /// Detailed information (only shown in verbose mode)
    pub fn detail(&self, message: &str) {
        if self.verbose {
            self.record("DEBUG", message);
            if !self.quiet {
                println!("   {}", message);
            }
        }
    }

    /// Key-value pair summary display
    pub fn summary_kv(&self, title: &str, items: &[(&str, String)]) {
        for (key, value) in items {
            self.record("INFO", &format!("{}: {}", key, value));
        }
        if !self.quiet {
            self.subsection(title);
            for (key, value) in items {
                println!("  {}: {}", key, value);
            }
        }
    }

    /// Time since the logger was created
    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Format duration in human-readable format
    pub fn format_duration(&self, duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m{}s", secs / 60, secs % 60)
        } else {
            format!("{}h{}m{}s", secs / 3600, (secs % 3600) / 60, secs % 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_receives_messages_even_when_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.log");

        let logger = Logger::new_quiet().with_log_file(&path).unwrap();
        logger.info("Token acquired successfully.");
        logger.warning("Attempt 1 failed");
        logger.debug("not recorded without verbose");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - INFO - Token acquired successfully."));
        assert!(lines[1].ends_with(" - WARNING - Attempt 1 failed"));
    }

    #[test]
    fn clones_share_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.log");

        let logger = Logger::new_quiet().with_log_file(&path).unwrap();
        let clone = logger.clone();
        logger.info("first");
        clone.error("second");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn format_duration_units() {
        let logger = Logger::new_quiet();
        assert_eq!(logger.format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(logger.format_duration(Duration::from_secs(125)), "2m5s");
        assert_eq!(logger.format_duration(Duration::from_secs(3725)), "1h2m5s");
    }
}
