//! Overtime Threshold Notifier — Binary Entrypoint
//! Runs one scheduled batch: load config and roster, analyze the month,
//! deliver escalating notifications, record the outcome.
//!
//! Invoked periodically by an external scheduler; each invocation is
//! independent and idempotent at the weekly-flag granularity.

use chrono::Local;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use overtime_threshold_notifier::audit::AuditLog;
use overtime_threshold_notifier::calendar::WeekendCalendar;
use overtime_threshold_notifier::config::AppConfig;
use overtime_threshold_notifier::notify::slack::SlackSender;
use overtime_threshold_notifier::roster;
use overtime_threshold_notifier::runner::run_once;
use overtime_threshold_notifier::timesheet::HttpTimesheetSource;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let employees = roster::load_employees(&config.roster_path)?;

    let timesheet = HttpTimesheetSource::new(&config.base_url, &config.endpoint, &config.api_token)
        .with_timeout(config.http_timeout_secs);
    let sender = SlackSender::new(&config.slack_token).with_timeout(config.http_timeout_secs);
    let audit = AuditLog::new(&config.audit_log_path);
    let calendar = WeekendCalendar;

    let summary = run_once(
        &config,
        &employees,
        &timesheet,
        &sender,
        &calendar,
        &audit,
        Local::now().naive_local(),
    )
    .await?;
    tracing::info!(?summary, "run complete");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env in local/dev; no-op when the vars come from the scheduler.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Any unhandled error is logged with context and the process exits
    // cleanly so the external schedule keeps its cadence.
    if let Err(e) = run().await {
        tracing::error!(error = ?e, "run aborted");
    }
}
