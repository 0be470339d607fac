//! # Recipient Router
//! Fans an admitted employee report out to the division distribution list
//! and the global list, then aggregates one consolidated message per unique
//! recipient. An address reachable through both routes gets exactly one
//! message, with each report in it exactly once.

use std::collections::{BTreeMap, BTreeSet};

/// Mapping key whose recipients receive every division's reports.
pub const GLOBAL_MAPPING_KEY: &str = "ALL";

const MESSAGE_HEADER: &str = "Overtime report";

/// Per-recipient accumulation of `(display name, percent of ceiling)`
/// gathered across the run. BTreeMap-backed upstream, so rebuilding the
/// summary pass for logging is deterministic.
#[derive(Debug, Default, Clone)]
pub struct RecipientSummary {
    pub entries: Vec<(String, i64)>,
}

/// Parse `DIV:address` pairs, comma-separated. The same division may
/// appear more than once to attach several addresses. Entries without a
/// colon are warned about and skipped.
pub fn parse_recipient_mappings(raw: &str) -> BTreeMap<String, Vec<String>> {
    let mut mappings: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        match pair.split_once(':') {
            Some((division, address)) if !division.trim().is_empty() && !address.trim().is_empty() => {
                mappings
                    .entry(division.trim().to_string())
                    .or_default()
                    .push(address.trim().to_string());
            }
            _ => {
                tracing::warn!(entry = pair, "ignoring malformed recipient mapping entry");
            }
        }
    }
    mappings
}

#[derive(Debug, Default)]
pub struct RecipientRouter {
    /// Admitted report blocks, grouped by the employee's division.
    division_reports: BTreeMap<String, Vec<String>>,
    /// Per-address summary of who that address will hear about.
    summaries: BTreeMap<String, RecipientSummary>,
}

impl RecipientRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// No employee was admitted this run.
    pub fn is_empty(&self) -> bool {
        self.division_reports.is_empty()
    }

    /// Record one admitted employee: file the report under the division and
    /// accumulate `(name, percent)` into the summary of every address the
    /// event routes to (division list ∪ global list, deduplicated).
    pub fn add(
        &mut self,
        division: &str,
        display_name: &str,
        percent_target: i64,
        report: String,
        mappings: &BTreeMap<String, Vec<String>>,
    ) {
        self.division_reports
            .entry(division.to_string())
            .or_default()
            .push(report);

        let mut seen = BTreeSet::new();
        for key in [division, GLOBAL_MAPPING_KEY] {
            for address in mappings.get(key).into_iter().flatten() {
                if seen.insert(address.as_str()) {
                    self.summaries
                        .entry(address.clone())
                        .or_default()
                        .entries
                        .push((display_name.to_string(), percent_target));
                }
            }
        }
    }

    /// One `(recipient, message)` pair per unique address across all firing
    /// divisions plus the global list. Each message carries the reports of
    /// every division that routes to that address, each exactly once.
    pub fn consolidated_messages(
        &self,
        mappings: &BTreeMap<String, Vec<String>>,
    ) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut delivered = BTreeSet::new();

        for division in self.division_reports.keys() {
            let division_recipients = mappings.get(division.as_str()).into_iter().flatten();
            let global_recipients = mappings.get(GLOBAL_MAPPING_KEY).into_iter().flatten();

            for address in division_recipients.chain(global_recipients) {
                if !delivered.insert(address.as_str()) {
                    continue;
                }
                let mut reports = Vec::new();
                for (d, division_reports) in &self.division_reports {
                    if routes_to(mappings, d, address) {
                        reports.extend(division_reports.iter().cloned());
                    }
                }
                if reports.is_empty() {
                    continue;
                }
                let message = format!(
                    "{}\n{}\n\n{}",
                    MESSAGE_HEADER,
                    "=".repeat(29),
                    reports.join("\n\n")
                );
                out.push((address.clone(), message));
            }
        }
        out
    }

    pub fn summaries(&self) -> &BTreeMap<String, RecipientSummary> {
        &self.summaries
    }
}

/// Does `division`'s traffic reach `address`, directly or via the global
/// list?
fn routes_to(mappings: &BTreeMap<String, Vec<String>>, division: &str, address: &str) -> bool {
    let direct = mappings
        .get(division)
        .is_some_and(|list| list.iter().any(|a| a == address));
    let global = mappings
        .get(GLOBAL_MAPPING_KEY)
        .is_some_and(|list| list.iter().any(|a| a == address));
    direct || global
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mappings(pairs: &str) -> BTreeMap<String, Vec<String>> {
        parse_recipient_mappings(pairs)
    }

    #[test]
    fn parses_pairs_and_skips_garbage() {
        let m = mappings("A01:lead-a@example.com, A01:backup-a@example.com,ALL:hr@example.com,broken");
        assert_eq!(
            m.get("A01").unwrap(),
            &vec!["lead-a@example.com".to_string(), "backup-a@example.com".to_string()]
        );
        assert_eq!(m.get("ALL").unwrap(), &vec!["hr@example.com".to_string()]);
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn address_on_both_routes_gets_one_message_with_the_report_once() {
        let m = mappings("A01:boss@example.com,ALL:boss@example.com");
        let mut router = RecipientRouter::new();
        router.add("A01", "Sato Hanako", 85, "report-sato".into(), &m);

        let messages = router.consolidated_messages(&m);
        assert_eq!(messages.len(), 1);
        let (address, message) = &messages[0];
        assert_eq!(address, "boss@example.com");
        assert_eq!(message.matches("report-sato").count(), 1);

        // The summary also saw the employee once.
        let summary = router.summaries().get("boss@example.com").unwrap();
        assert_eq!(summary.entries, vec![("Sato Hanako".to_string(), 85)]);
    }

    #[test]
    fn global_recipient_collects_every_division() {
        let m = mappings("A01:lead-a@example.com,B02:lead-b@example.com,ALL:hr@example.com");
        let mut router = RecipientRouter::new();
        router.add("A01", "Sato Hanako", 85, "report-sato".into(), &m);
        router.add("B02", "Suzuki Taro", 62, "report-suzuki".into(), &m);

        let messages = router.consolidated_messages(&m);
        let by_addr: BTreeMap<_, _> = messages.into_iter().collect();
        assert_eq!(by_addr.len(), 3);

        let hr = &by_addr["hr@example.com"];
        assert!(hr.contains("report-sato") && hr.contains("report-suzuki"));

        let lead_a = &by_addr["lead-a@example.com"];
        assert!(lead_a.contains("report-sato") && !lead_a.contains("report-suzuki"));
    }

    #[test]
    fn unmapped_division_reaches_only_the_global_list() {
        let m = mappings("ALL:hr@example.com");
        let mut router = RecipientRouter::new();
        router.add("Z99", "Tanaka Jiro", 70, "report-tanaka".into(), &m);

        let messages = router.consolidated_messages(&m);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "hr@example.com");
    }
}
