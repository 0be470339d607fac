//! # Timesheet Source
//! Monthly overtime lookups against the timesheet API.
//!
//! The trait returns `Option` rather than `Result`: any transport, auth, or
//! payload problem is logged inside the implementation and surfaces as
//! `None`, which the caller treats as "skip this employee, keep the run
//! going". An employee missing from an otherwise valid payload is a
//! legitimate 0.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[async_trait]
pub trait TimesheetSource: Send + Sync {
    /// Total overtime minutes for one employee in one month (`YYYY-MM`),
    /// or `None` when the lookup failed.
    async fn overtime_minutes(
        &self,
        year_month: &str,
        division: &str,
        employee_key: &str,
    ) -> Option<i64>;
}

/// Record shape of the monthly-workings payload. Only the fields we read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyWorking {
    employee_key: String,
    #[serde(default)]
    overtime: i64,
    #[serde(default)]
    night_overtime: i64,
}

fn total_for(records: &[MonthlyWorking], employee_key: &str) -> i64 {
    records
        .iter()
        .find(|r| r.employee_key == employee_key)
        .map(|r| r.overtime + r.night_overtime)
        .unwrap_or(0)
}

pub struct HttpTimesheetSource {
    base_url: String,
    endpoint: String,
    token: String,
    client: Client,
    timeout: Duration,
}

impl HttpTimesheetSource {
    pub fn new(
        base_url: impl Into<String>,
        endpoint: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint: endpoint.into(),
            token: token.into(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait]
impl TimesheetSource for HttpTimesheetSource {
    async fn overtime_minutes(
        &self,
        year_month: &str,
        division: &str,
        employee_key: &str,
    ) -> Option<i64> {
        let url = format!("{}{}/{}", self.base_url, self.endpoint, year_month);
        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("division", division)])
            .timeout(self.timeout)
            .send()
            .await;

        let resp = match res {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(year_month, division, error = %e, "timesheet request failed");
                return None;
            }
        };
        let resp = match resp.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(year_month, division, error = %e, "timesheet returned non-2xx");
                return None;
            }
        };
        let records: Vec<MonthlyWorking> = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(year_month, division, error = %e, "timesheet payload parse failed");
                return None;
            }
        };

        Some(total_for(&records, employee_key))
    }
}

// --- Test helper ---
/// Map-backed source for tests: `(year_month, employee_key) -> minutes`.
/// Keys not present simulate a failed lookup.
#[derive(Debug, Default)]
pub struct StaticTimesheet {
    entries: std::collections::BTreeMap<(String, String), i64>,
}

impl StaticTimesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, year_month: &str, employee_key: &str, minutes: i64) -> Self {
        self.entries
            .insert((year_month.to_string(), employee_key.to_string()), minutes);
        self
    }
}

#[async_trait]
impl TimesheetSource for StaticTimesheet {
    async fn overtime_minutes(
        &self,
        year_month: &str,
        _division: &str,
        employee_key: &str,
    ) -> Option<i64> {
        self.entries
            .get(&(year_month.to_string(), employee_key.to_string()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_day_and_night_overtime_for_matching_key() {
        let records = vec![
            MonthlyWorking {
                employee_key: "k-abc".into(),
                overtime: 600,
                night_overtime: 60,
            },
            MonthlyWorking {
                employee_key: "k-def".into(),
                overtime: 30,
                night_overtime: 0,
            },
        ];
        assert_eq!(total_for(&records, "k-abc"), 660);
        assert_eq!(total_for(&records, "k-def"), 30);
    }

    #[test]
    fn unknown_employee_is_a_legitimate_zero() {
        let records: Vec<MonthlyWorking> = Vec::new();
        assert_eq!(total_for(&records, "k-missing"), 0);
    }
}
