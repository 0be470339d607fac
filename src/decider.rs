//! # Notification Decider
//! The escalating-threshold admission gate. Per employee and run it returns
//! at most one tier: the highest tier the percent has crossed that was not
//! yet covered by a notification this ISO week. Tiers at or above the
//! critical cutoff ignore the weekly flags and fire every cycle, and the
//! override window forces the top tier for everyone.

use chrono::NaiveDate;

use crate::flags::DedupFlagStore;

/// Ascending severity tiers, percent of the division ceiling.
pub const NOTIFY_THRESHOLDS: [u32; 5] = [60, 70, 80, 90, 100];

/// Default percent at or above which the weekly flags are bypassed.
pub const DEFAULT_CRITICAL_THRESHOLD: u32 = 95;

pub struct NotificationDecider<'a> {
    flags: &'a DedupFlagStore,
    critical_threshold: u32,
}

impl<'a> NotificationDecider<'a> {
    pub fn new(flags: &'a DedupFlagStore, critical_threshold: u32) -> Self {
        Self {
            flags,
            critical_threshold,
        }
    }

    /// The fixed tiers plus the configured critical cutoff, ascending. The
    /// cutoff acts as a tier of its own so percents in the critical band
    /// below 100 still have a tier to fire at.
    fn tiers(&self) -> Vec<u32> {
        let mut tiers = NOTIFY_THRESHOLDS.to_vec();
        if !tiers.contains(&self.critical_threshold) {
            tiers.push(self.critical_threshold);
            tiers.sort_unstable();
        }
        tiers
    }

    /// Tier that should fire this cycle, or `None`.
    ///
    /// `force_all` short-circuits to the top tier regardless of percent or
    /// flag state. Otherwise the candidate is the highest tier the percent
    /// has crossed: critical candidates fire unconditionally, sub-critical
    /// candidates are suppressed when this week already saw a notification
    /// at the candidate tier or above (a drop back below an already
    /// reported tier is not news).
    ///
    /// On `Some`, the caller sets the flag for the returned tier. That is
    /// what suppresses lower tiers for the rest of the week; for critical
    /// tiers the flag has no suppression effect on the tier itself.
    pub fn decide(
        &self,
        percent_target: i64,
        employee_code: &str,
        force_all: bool,
        today: NaiveDate,
    ) -> Option<u32> {
        if force_all {
            return NOTIFY_THRESHOLDS.last().copied();
        }
        let tiers = self.tiers();
        let candidate = tiers
            .iter()
            .copied()
            .filter(|&t| i64::from(t) <= percent_target)
            .max()?;
        if candidate >= self.critical_threshold {
            return Some(candidate);
        }
        let suppressed = tiers
            .iter()
            .copied()
            .filter(|&t| t >= candidate)
            .any(|t| self.flags.exists(employee_code, t, today));
        (!suppressed).then_some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fresh_store() -> (tempfile::TempDir, DedupFlagStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DedupFlagStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn below_the_lowest_tier_never_fires() {
        let (_dir, store) = fresh_store();
        let decider = NotificationDecider::new(&store, DEFAULT_CRITICAL_THRESHOLD);
        let today = date(2026, 8, 3);

        assert_eq!(decider.decide(0, "1001", false, today), None);
        assert_eq!(decider.decide(50, "1001", false, today), None);
        assert_eq!(decider.decide(59, "1001", false, today), None);
    }

    #[test]
    fn highest_crossed_tier_fires_and_suppresses_downward() {
        let (_dir, store) = fresh_store();
        let decider = NotificationDecider::new(&store, DEFAULT_CRITICAL_THRESHOLD);
        let today = date(2026, 8, 3);

        assert_eq!(decider.decide(85, "1001", false, today), Some(80));
        store.set("1001", 80, today).unwrap();

        // Same or lower percent this week: nothing new to say.
        assert_eq!(decider.decide(85, "1001", false, today), None);
        assert_eq!(decider.decide(65, "1001", false, today), None);

        // Climbing past the reported tier escalates.
        assert_eq!(decider.decide(92, "1001", false, today), Some(90));
        store.set("1001", 90, today).unwrap();
        assert_eq!(decider.decide(92, "1001", false, today), None);
    }

    #[test]
    fn full_escalation_then_drop_back_is_quiet() {
        let (_dir, store) = fresh_store();
        let decider = NotificationDecider::new(&store, DEFAULT_CRITICAL_THRESHOLD);
        let today = date(2026, 8, 3);

        assert_eq!(decider.decide(110, "1001", false, today), Some(100));
        store.set("1001", 100, today).unwrap();

        // 90 is below critical and covered by the 100 marker.
        assert_eq!(decider.decide(90, "1001", false, today), None);
    }

    #[test]
    fn force_all_returns_the_top_tier_regardless_of_state() {
        let (_dir, store) = fresh_store();
        let decider = NotificationDecider::new(&store, DEFAULT_CRITICAL_THRESHOLD);
        let today = date(2026, 8, 3);
        for threshold in NOTIFY_THRESHOLDS {
            store.set("1001", threshold, today).unwrap();
        }

        assert_eq!(decider.decide(0, "1001", true, today), Some(100));
        assert_eq!(decider.decide(110, "1001", true, today), Some(100));
    }

    #[test]
    fn critical_band_fires_every_cycle() {
        let (_dir, store) = fresh_store();
        let decider = NotificationDecider::new(&store, 95);
        let today = date(2026, 8, 3);
        for threshold in [60, 70, 80, 90] {
            store.set("1001", threshold, today).unwrap();
        }

        // 96% sits between 95 and 100: the cutoff itself is the tier, and
        // it keeps firing no matter what was flagged.
        assert_eq!(decider.decide(96, "1001", false, today), Some(95));
        store.set("1001", 95, today).unwrap();
        assert_eq!(decider.decide(96, "1001", false, today), Some(95));

        // At or above 100 the top tier fires, also every cycle.
        store.set("1001", 100, today).unwrap();
        assert_eq!(decider.decide(110, "1001", false, today), Some(100));
    }

    #[test]
    fn lower_critical_cutoff_widens_the_bypass() {
        let (_dir, store) = fresh_store();
        let decider = NotificationDecider::new(&store, 90);
        let today = date(2026, 8, 3);
        store.set("1001", 90, today).unwrap();

        assert_eq!(decider.decide(92, "1001", false, today), Some(90));
        assert_eq!(decider.decide(92, "1001", false, today), Some(90));
    }
}
