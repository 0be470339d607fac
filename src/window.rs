//! # Override Window
//! The weekly forced-notification window. While active, the whole run is
//! treated as fully escalated: every employee fires at the top tier and
//! the business-day and dedup gating are bypassed. Exists for drills and
//! testing; `always` keeps it permanently open.

use chrono::{Datelike, NaiveDateTime, Timelike};

#[derive(Debug, Clone, Default)]
pub struct OverrideWindow {
    /// Unconditional override, for testing. Skips the time match entirely.
    pub always: bool,
    /// 0 = Monday .. 6 = Sunday. `None` disables the window.
    pub weekday: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    /// Minutes of slack around `minute`, so a scheduler firing slightly
    /// off-cadence still lands inside the window.
    pub tolerance_min: i64,
}

impl OverrideWindow {
    /// Is the force-all override active at `now`?
    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        if self.always {
            tracing::info!("always-on override active, forcing notification for everyone");
            return true;
        }
        let (Some(weekday), Some(hour), Some(minute)) = (self.weekday, self.hour, self.minute)
        else {
            return false;
        };
        let hit = now.weekday().num_days_from_monday() == weekday
            && now.hour() == hour
            && (i64::from(now.minute()) - i64::from(minute)).abs() <= self.tolerance_min;
        if hit {
            tracing::info!(weekday, hour, minute, "override window active, forcing notification for everyone");
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn saturday_2130(tolerance: i64) -> OverrideWindow {
        OverrideWindow {
            always: false,
            weekday: Some(5),
            hour: Some(21),
            minute: Some(30),
            tolerance_min: tolerance,
        }
    }

    #[test]
    fn matches_inside_the_tolerance() {
        let window = saturday_2130(5);
        // 2026-08-08 is a Saturday.
        assert!(window.is_active(at(2026, 8, 8, 21, 30)));
        assert!(window.is_active(at(2026, 8, 8, 21, 27)));
        assert!(window.is_active(at(2026, 8, 8, 21, 35)));
        assert!(!window.is_active(at(2026, 8, 8, 21, 36)));
        assert!(!window.is_active(at(2026, 8, 8, 22, 30)));
        // Friday, same time.
        assert!(!window.is_active(at(2026, 8, 7, 21, 30)));
    }

    #[test]
    fn zero_tolerance_needs_the_exact_minute() {
        let window = saturday_2130(0);
        assert!(window.is_active(at(2026, 8, 8, 21, 30)));
        assert!(!window.is_active(at(2026, 8, 8, 21, 31)));
    }

    #[test]
    fn unset_window_is_inactive_and_always_wins() {
        let disabled = OverrideWindow::default();
        assert!(!disabled.is_active(at(2026, 8, 8, 21, 30)));

        let always = OverrideWindow {
            always: true,
            ..OverrideWindow::default()
        };
        assert!(always.is_active(at(2026, 8, 4, 3, 14)));
    }
}
