//! # Overtime Analyzer
//! Fetches the current and previous month for each employee and derives the
//! percent metrics the decider works from.
//!
//! `analyze` degrades gracefully: if either monthly lookup fails the
//! employee yields no result and the run moves on. Derived metrics live on
//! the immutable result so every consumer (decider, report, snapshot) reads
//! the same numbers.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};

use crate::percent::percent;
use crate::roster::Employee;
use crate::timesheet::TimesheetSource;

/// One employee's analyzed month, constructed once per run.
#[derive(Debug)]
pub struct OvertimeResult<'a> {
    pub employee: &'a Employee,
    pub current_overtime: i64,
    pub last_overtime: i64,
    pub target_overtime: i64,
}

impl OvertimeResult<'_> {
    /// Current month against last month.
    pub fn percent_vs_last(&self) -> i64 {
        percent(self.current_overtime, self.last_overtime)
    }

    /// Current month against the division ceiling.
    pub fn percent_target(&self) -> i64 {
        percent(self.current_overtime, self.target_overtime)
    }

    /// Minutes until the ceiling; negative means over.
    pub fn remaining_overtime(&self) -> i64 {
        self.target_overtime - self.current_overtime
    }

    pub fn is_over_target(&self) -> bool {
        self.current_overtime > self.target_overtime
    }
}

/// `YYYY-MM` key for the month `offset_months` away from `today`.
pub fn month_key(today: NaiveDate, offset_months: i32) -> String {
    let shifted = if offset_months >= 0 {
        today.checked_add_months(Months::new(offset_months as u32))
    } else {
        today.checked_sub_months(Months::new(offset_months.unsigned_abs()))
    }
    .unwrap_or(today);
    format!("{:04}-{:02}", shifted.year(), shifted.month())
}

/// Compact `YYYYMM` stamp used in snapshot file names.
pub fn month_stamp(today: NaiveDate) -> String {
    format!("{:04}{:02}", today.year(), today.month())
}

pub struct OvertimeAnalyzer<'a> {
    source: &'a dyn TimesheetSource,
    default_target: i64,
    division_targets: &'a BTreeMap<String, i64>,
}

impl<'a> OvertimeAnalyzer<'a> {
    pub fn new(
        source: &'a dyn TimesheetSource,
        default_target: i64,
        division_targets: &'a BTreeMap<String, i64>,
    ) -> Self {
        Self {
            source,
            default_target,
            division_targets,
        }
    }

    /// Ceiling for a division, falling back to the global default.
    pub fn target_for(&self, division_code: &str) -> i64 {
        self.division_targets
            .get(division_code)
            .copied()
            .unwrap_or(self.default_target)
    }

    /// Analyze one employee for the month containing `today`. `None` when
    /// either monthly lookup failed; the caller logs and skips.
    pub async fn analyze<'e>(
        &self,
        employee: &'e Employee,
        today: NaiveDate,
    ) -> Option<OvertimeResult<'e>> {
        let this_month = month_key(today, 0);
        let last_month = month_key(today, -1);

        let current = self
            .source
            .overtime_minutes(&this_month, &employee.division_code, &employee.key)
            .await?;
        let last = self
            .source
            .overtime_minutes(&last_month, &employee.division_code, &employee.key)
            .await?;

        Some(OvertimeResult {
            employee,
            current_overtime: current,
            last_overtime: last,
            target_overtime: self.target_for(&employee.division_code),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_keys_cross_year_boundaries() {
        assert_eq!(month_key(date(2026, 8, 6), 0), "2026-08");
        assert_eq!(month_key(date(2026, 8, 6), -1), "2026-07");
        assert_eq!(month_key(date(2026, 1, 15), -1), "2025-12");
        assert_eq!(month_stamp(date(2026, 8, 6)), "202608");
    }

    #[test]
    fn derived_metrics() {
        let employee = Employee {
            code: "1001".into(),
            key: "k-abc".into(),
            last_name: "Sato".into(),
            first_name: "Hanako".into(),
            division_code: "A01".into(),
            email: String::new(),
        };
        let result = OvertimeResult {
            employee: &employee,
            current_overtime: 660,
            last_overtime: 600,
            target_overtime: 600,
        };
        assert_eq!(result.percent_target(), 110);
        assert_eq!(result.percent_vs_last(), 110);
        assert_eq!(result.remaining_overtime(), -60);
        assert!(result.is_over_target());
    }
}
