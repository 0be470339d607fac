//! # Run Orchestration
//! One scheduled batch over the roster: gate on the calendar and the
//! override window, prune the weekly flags, analyze every employee, admit
//! notifications, fan out to recipients, deliver, and record the outcome.
//!
//! The run is single-threaded over employees, so `DedupFlagStore`
//! `exists`/`set` pairs never interleave. A parallelizing rewrite must
//! serialize those pairs per (employee, tier) marker.

use anyhow::Result;
use chrono::NaiveDateTime;

use crate::analyzer::{month_stamp, OvertimeAnalyzer};
use crate::audit::AuditLog;
use crate::calendar::Calendar;
use crate::config::AppConfig;
use crate::decider::NotificationDecider;
use crate::flags::DedupFlagStore;
use crate::notify::MessageSender;
use crate::notify::router::RecipientRouter;
use crate::report::format_report;
use crate::roster::Employee;
use crate::snapshot;
use crate::timesheet::TimesheetSource;

/// Counters for the final log line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Run skipped entirely (non-business day, no override).
    pub skipped_run: bool,
    pub analyzed: usize,
    /// Employees whose timesheet lookup failed.
    pub fetch_failed: usize,
    pub admitted: usize,
    pub delivered: usize,
    pub delivery_failed: usize,
}

pub async fn run_once(
    config: &AppConfig,
    roster: &[Employee],
    timesheet: &dyn TimesheetSource,
    sender: &dyn MessageSender,
    calendar: &dyn Calendar,
    audit: &AuditLog,
    now: NaiveDateTime,
) -> Result<RunSummary> {
    let today = now.date();
    let mut summary = RunSummary::default();

    // The override check comes first: an active window runs the batch even
    // on a weekend.
    let force_all = config.override_window.is_active(now);
    if !force_all && !calendar.is_business_day(today) {
        tracing::info!(%today, "non-business day, skipping run");
        summary.skipped_run = true;
        return Ok(summary);
    }

    let flags = DedupFlagStore::new(&config.flag_dir);
    flags.prune(today);

    let analyzer = OvertimeAnalyzer::new(timesheet, config.default_target, &config.division_targets);
    let decider = NotificationDecider::new(&flags, config.critical_threshold);
    let mut router = RecipientRouter::new();
    let mut results = Vec::new();

    for employee in roster {
        let Some(result) = analyzer.analyze(employee, today).await else {
            tracing::warn!(code = %employee.code, "timesheet lookup failed, skipping employee");
            summary.fetch_failed += 1;
            continue;
        };
        summary.analyzed += 1;

        let percent_target = result.percent_target();
        match decider.decide(percent_target, &employee.code, force_all, today) {
            Some(threshold) => {
                flags.set(&employee.code, threshold, today)?;
                let report = format_report(&result, today);
                router.add(
                    &employee.division_code,
                    &employee.full_name(),
                    percent_target,
                    report.clone(),
                    &config.recipient_mappings,
                );
                summary.admitted += 1;
                tracing::info!(
                    code = %employee.code,
                    percent_target,
                    threshold,
                    "notification admitted"
                );
                self_notify(config, sender, audit, employee, percent_target, &report, now).await;
            }
            None => {
                audit.record_skip(
                    now,
                    &format!(
                        "{} ({}%) below notification criteria",
                        employee.full_name(),
                        percent_target
                    ),
                );
            }
        }
        results.push(result);
    }

    snapshot::save_results(&results, &config.snapshot_dir, &month_stamp(today))?;

    if router.is_empty() {
        tracing::warn!("no employees met the notification criteria, nothing to deliver");
        return Ok(summary);
    }

    for (recipient, message) in router.consolidated_messages(&config.recipient_mappings) {
        if sender.send(&recipient, &message).await {
            summary.delivered += 1;
            tracing::info!(recipient = %recipient, "notification delivered");
            audit.record(now, &format!("delivered to {recipient}"));
        } else {
            summary.delivery_failed += 1;
            // No retry within the run; the next scheduled run tries again.
            tracing::error!(recipient = %recipient, "notification delivery failed");
            audit.record(now, &format!("delivery failed: {recipient}"));
        }
    }

    // Per-recipient content summary, rebuilt from the router so re-running
    // this pass stays deterministic.
    for (recipient, recipient_summary) in router.summaries() {
        if recipient_summary.entries.is_empty() {
            continue;
        }
        let covered: Vec<String> = recipient_summary
            .entries
            .iter()
            .map(|(name, percent)| format!("{name} ({percent}%)"))
            .collect();
        audit.record(
            now,
            &format!(
                "content: {} | reports: {} | covering: {}",
                recipient,
                recipient_summary.entries.len(),
                covered.join(", ")
            ),
        );
    }

    Ok(summary)
}

/// Individually addressed message to the employee, independent of the
/// division routing. Success and failure are logged and audited on their
/// own; a failure never affects the division sends.
async fn self_notify(
    config: &AppConfig,
    sender: &dyn MessageSender,
    audit: &AuditLog,
    employee: &Employee,
    percent_target: i64,
    report: &str,
    now: NaiveDateTime,
) {
    if !config.enable_self_notify {
        return;
    }
    let forced = percent_target >= config.self_notify_force_threshold;
    let opted_in = config.self_notify_codes.contains(&employee.code);
    if !forced && !opted_in {
        return;
    }
    let Some(address) = employee.contact() else {
        return;
    };

    let text = format!("Overtime report for {}\n\n{}", employee.full_name(), report);
    if sender.send(address, &text).await {
        let mode = if forced { "forced" } else { "opt-in" };
        tracing::info!(recipient = address, mode, "self notification delivered");
        audit.record(
            now,
            &format!(
                "self notification ({mode}): {} | {} ({}%)",
                address,
                employee.full_name(),
                percent_target
            ),
        );
    } else {
        tracing::warn!(recipient = address, "self notification failed");
        audit.record(now, &format!("self notification failed: {address}"));
    }
}
