//! # Notified Flags
//! File-per-marker dedup store. A marker named
//! `{code}_{isoYear}_{isoWeek}_{threshold}.flag` means "this employee was
//! already notified at this tier during this ISO week". The file content is
//! the date the flag was set, kept for audit only; existence is the logic.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

const FLAG_EXT: &str = "flag";
const DATE_FMT: &str = "%Y-%m-%d";

pub struct DedupFlagStore {
    dir: PathBuf,
}

impl DedupFlagStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn flag_path(&self, code: &str, threshold: u32, today: NaiveDate) -> PathBuf {
        let iso = today.iso_week();
        self.dir.join(format!(
            "{}_{}_{}_{}.{FLAG_EXT}",
            code,
            iso.year(),
            iso.week(),
            threshold
        ))
    }

    /// Was this employee already notified at this tier during the ISO week
    /// containing `today`?
    pub fn exists(&self, code: &str, threshold: u32, today: NaiveDate) -> bool {
        self.flag_path(code, threshold, today).exists()
    }

    /// Create the marker, stamped with `today`. Re-setting is harmless.
    pub fn set(&self, code: &str, threshold: u32, today: NaiveDate) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating flag dir {}", self.dir.display()))?;
        let path = self.flag_path(code, threshold, today);
        fs::write(&path, today.format(DATE_FMT).to_string())
            .with_context(|| format!("writing flag {}", path.display()))
    }

    /// Remove every marker whose stored date falls in an ISO (year, week)
    /// other than `today`'s. Comparing the year too keeps week-number
    /// collisions across year boundaries from surviving. Unreadable or
    /// unparseable markers are treated as corrupt and removed with a
    /// warning; a failed removal is logged and skipped so one bad entry
    /// never aborts the sweep.
    ///
    /// Runs once per invocation, before any `exists`/`set` calls.
    pub fn prune(&self, today: NaiveDate) {
        let iso_now = today.iso_week();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // Nothing stored yet.
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(FLAG_EXT) {
                continue;
            }
            if current_week_flag(&path, iso_now.year(), iso_now.week()) {
                continue;
            }
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove stale flag");
            }
        }
    }
}

/// True iff the flag at `path` parses and its date lands in the given ISO
/// (year, week). Corrupt flags warn and report false so they get removed.
fn current_week_flag(path: &Path, year: i32, week: u32) -> bool {
    let content = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable flag, removing");
            return false;
        }
    };
    let date = match NaiveDate::parse_from_str(content.trim(), DATE_FMT) {
        Ok(d) => d,
        Err(_) => {
            tracing::warn!(path = %path.display(), content = %content.trim(), "corrupt flag date, removing");
            return false;
        }
    };
    let iso = date.iso_week();
    iso.year() == year && iso.week() == week
}
