//! # Configuration
//! Every recognized option, read once from the environment and validated up
//! front. Components receive this struct (or slices of it); nothing reads
//! the environment after startup. A missing credential or mapping aborts
//! the run before any side effects.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::decider::DEFAULT_CRITICAL_THRESHOLD;
use crate::notify::router::parse_recipient_mappings;
use crate::window::OverrideWindow;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Timesheet API base, e.g. `https://timesheet.internal/v1.0`.
    pub base_url: String,
    /// Monthly-workings endpoint path appended to the base.
    pub endpoint: String,
    pub api_token: String,
    pub slack_token: String,
    /// Division code -> recipient addresses; `ALL` is the global list.
    pub recipient_mappings: BTreeMap<String, Vec<String>>,
    /// Ceiling minutes for divisions without an explicit override.
    pub default_target: i64,
    pub division_targets: BTreeMap<String, i64>,
    pub enable_self_notify: bool,
    pub self_notify_codes: BTreeSet<String>,
    /// Percent at or above which self notification is forced.
    pub self_notify_force_threshold: i64,
    /// Percent at or above which weekly dedup is bypassed.
    pub critical_threshold: u32,
    pub override_window: OverrideWindow,
    pub roster_path: PathBuf,
    pub flag_dir: PathBuf,
    pub snapshot_dir: PathBuf,
    pub audit_log_path: PathBuf,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Assemble and validate the full configuration. Call after
    /// `dotenvy::dotenv()` so a local `.env` is honored in dev.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("TIMESHEET_BASE_URL").context("TIMESHEET_BASE_URL missing")?;
        let api_token =
            std::env::var("TIMESHEET_API_TOKEN").context("TIMESHEET_API_TOKEN missing")?;
        let slack_token = std::env::var("SLACK_BOT_TOKEN").context("SLACK_BOT_TOKEN missing")?;

        let mapping_raw = std::env::var("DIVISION_RECIPIENT_MAPPING")
            .context("DIVISION_RECIPIENT_MAPPING missing")?;
        let recipient_mappings = parse_recipient_mappings(&mapping_raw);
        if recipient_mappings.is_empty() {
            bail!("DIVISION_RECIPIENT_MAPPING has no usable entries");
        }

        Ok(Self {
            base_url,
            endpoint: env_or("TIMESHEET_ENDPOINT", "/monthly-workings"),
            api_token,
            slack_token,
            recipient_mappings,
            default_target: env_parse("OVERTIME_TARGET_DEFAULT", 600),
            division_targets: parse_division_targets(
                &std::env::var("OVERTIME_TARGET_DIVISION").unwrap_or_default(),
            ),
            enable_self_notify: env_flag("ENABLE_SELF_NOTIFY"),
            self_notify_codes: parse_code_set(
                &std::env::var("SELF_NOTIFY_ENABLED_CODES").unwrap_or_default(),
            ),
            self_notify_force_threshold: env_parse("SELF_NOTIFY_FORCE_THRESHOLD", 90),
            critical_threshold: env_parse(
                "CRITICAL_NOTIFY_THRESHOLD",
                DEFAULT_CRITICAL_THRESHOLD,
            ),
            override_window: OverrideWindow {
                always: env_flag("FORCE_NOTIFY_ALWAYS"),
                weekday: env_opt("FORCE_NOTIFY_DAY"),
                hour: env_opt("FORCE_NOTIFY_HOUR"),
                minute: env_opt("FORCE_NOTIFY_MINUTE"),
                tolerance_min: env_parse("FORCE_NOTIFY_WINDOW", 0),
            },
            roster_path: env_or("ROSTER_PATH", "employee_roster.csv").into(),
            flag_dir: env_or("FLAG_DIR", "notified_flags").into(),
            snapshot_dir: env_or("SNAPSHOT_DIR", "cache").into(),
            audit_log_path: env_or("AUDIT_LOG_PATH", "log/notify_history.log").into(),
            http_timeout_secs: env_parse("HTTP_TIMEOUT_SECS", 10),
        })
    }
}

/// `DIV:minutes` pairs, comma-separated. Invalid entries are warned about
/// and ignored rather than failing the run.
pub fn parse_division_targets(raw: &str) -> BTreeMap<String, i64> {
    let mut targets = BTreeMap::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let parsed = pair
            .split_once(':')
            .and_then(|(division, minutes)| {
                let division = division.trim();
                minutes
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|_| !division.is_empty())
                    .map(|m| (division.to_string(), m))
            });
        match parsed {
            Some((division, minutes)) => {
                targets.insert(division, minutes);
            }
            None => tracing::warn!(entry = pair, "ignoring invalid division target entry"),
        }
    }
    targets
}

fn parse_code_set(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_targets_skip_invalid_entries() {
        let targets = parse_division_targets("A01:700, B02:500,C03:oops,:300,");
        assert_eq!(targets.get("A01"), Some(&700));
        assert_eq!(targets.get("B02"), Some(&500));
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn code_sets_trim_and_drop_empties() {
        let codes = parse_code_set("1001, 1002,,1001");
        assert_eq!(codes.len(), 2);
        assert!(codes.contains("1001") && codes.contains("1002"));
    }
}
