//! # Report Formatting
//! The per-employee report block delivered to recipients, and the status
//! tier labels. Plain text with light markdown, sized for a chat message.

use chrono::NaiveDate;

use crate::analyzer::{month_key, OvertimeResult};

/// Tier label for a percent-of-ceiling value. The 50% tier is
/// informational only; admission starts at 60%.
pub fn status_label(percent_target: i64) -> &'static str {
    if percent_target >= 100 {
        "ALERT: over 100% of limit"
    } else if percent_target >= 90 {
        "WARNING: over 90%"
    } else if percent_target >= 80 {
        "CAUTION: over 80%"
    } else if percent_target >= 70 {
        "NOTE: over 70%"
    } else if percent_target >= 60 {
        "NOTE: over 60%"
    } else if percent_target >= 50 {
        "INFO: over 50%"
    } else {
        "OK"
    }
}

/// Render minutes as `h:mm`. Callers pass absolute values for deltas.
pub fn to_hhmm(minutes: i64) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Four-line report block for one analyzed employee.
pub fn format_report(result: &OvertimeResult<'_>, today: NaiveDate) -> String {
    let current_month = month_key(today, 0);
    let last_month = month_key(today, -1);
    let percent_target = result.percent_target();

    let line1 = format!("*{}* {}", result.employee.full_name(), status_label(percent_target));
    let line2 = format!(
        "This month ({}): overtime {}",
        current_month,
        to_hhmm(result.current_overtime)
    );
    let line3 = if result.is_over_target() {
        format!(
            "Over limit by +{} ({}% of ceiling)",
            to_hhmm(result.remaining_overtime().abs()),
            percent_target
        )
    } else {
        format!(
            "Until limit {} ({}% of ceiling)",
            to_hhmm(result.remaining_overtime()),
            percent_target
        )
    };
    let line4 = format!(
        "Last month ({}): {} ({}% vs last month)",
        last_month,
        to_hhmm(result.last_overtime),
        result.percent_vs_last()
    );

    [line1, line2, line3, line4].join("\n")
}
