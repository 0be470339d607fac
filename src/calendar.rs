//! # Run Calendar
//! Business-day gating for scheduled runs. The default implementation only
//! knows about weekends; a holiday-aware provider plugs in behind the
//! trait without touching the runner.

use chrono::{Datelike, NaiveDate, Weekday};

pub trait Calendar: Send + Sync {
    fn is_business_day(&self, date: NaiveDate) -> bool;
}

/// Saturday and Sunday are not business days; everything else is.
pub struct WeekendCalendar;

impl Calendar for WeekendCalendar {
    fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}
