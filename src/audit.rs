//! # Audit Log
//! Append-only history of notification outcomes, one timestamped line per
//! decision. This is contract output for reconstructing what fired and why,
//! separate from the tracing diagnostics. A sink failure is a warning, not
//! an abort.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDateTime;

pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// One line for a notification outcome (delivered, failed, summary).
    pub fn record(&self, now: NaiveDateTime, summary: &str) {
        self.append(format!("{} | {}", now.format("%Y-%m-%d %H:%M"), summary));
    }

    /// One line for a suppressed notification and its reason.
    pub fn record_skip(&self, now: NaiveDateTime, reason: &str) {
        self.append(format!(
            "{} | no notification: {}",
            now.format("%Y-%m-%d %H:%M"),
            reason
        ));
    }

    fn append(&self, line: String) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(path = %self.path.display(), error = %e, "audit log dir");
                return;
            }
        }
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{line}"));
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "audit log append failed");
        }
    }
}
