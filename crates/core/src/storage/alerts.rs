use crate::domain::{Metal, Threshold};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertState {
    pub metal: Metal,
    pub threshold: Threshold,
    pub notified: bool,
    pub notified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NotifiedEntry {
    notified_at: DateTime<Utc>,
    /// Baseline in force when the notification went out.
    baseline_price: Decimal,
}

/// Which (metal, threshold) pairs have already been notified in the current baseline epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertLedger {
    entries: BTreeMap<Metal, BTreeMap<Threshold, NotifiedEntry>>,
}

impl AlertLedger {
    /// An entry recorded against a different baseline belongs to an earlier epoch and
    /// reads as not notified.
    pub fn state(&self, metal: Metal, threshold: Threshold, baseline_price: Decimal) -> AlertState {
        let entry = self
            .entries
            .get(&metal)
            .and_then(|m| m.get(&threshold))
            .filter(|e| e.baseline_price == baseline_price);

        AlertState {
            metal,
            threshold,
            notified: entry.is_some(),
            notified_at: entry.map(|e| e.notified_at),
        }
    }

    pub fn is_notified(&self, metal: Metal, threshold: Threshold, baseline_price: Decimal) -> bool {
        self.state(metal, threshold, baseline_price).notified
    }

    pub fn mark_notified(
        &mut self,
        metal: Metal,
        threshold: Threshold,
        baseline_price: Decimal,
        at: DateTime<Utc>,
    ) {
        self.entries.entry(metal).or_default().insert(
            threshold,
            NotifiedEntry {
                notified_at: at,
                baseline_price,
            },
        );
    }

    /// Clears one metal, or every metal when `metal` is `None`.
    pub fn reset(&mut self, metal: Option<Metal>) {
        match metal {
            Some(metal) => {
                self.entries.remove(&metal);
            }
            None => self.entries.clear(),
        }
    }

    /// Raw notified records, regardless of the baseline they were measured against.
    pub fn records(&self) -> Vec<(Metal, Threshold, DateTime<Utc>, Decimal)> {
        self.entries
            .iter()
            .flat_map(|(metal, by_threshold)| {
                by_threshold
                    .iter()
                    .map(move |(threshold, e)| (*metal, *threshold, e.notified_at, e.baseline_price))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 27, 10, 0, 0).unwrap()
    }

    #[test]
    fn unknown_pairs_read_as_unnotified() {
        let ledger = AlertLedger::default();
        let s = ledger.state(Metal::Gold, Threshold::TenPercent, Decimal::from(14000));
        assert!(!s.notified);
        assert!(s.notified_at.is_none());
    }

    #[test]
    fn mark_then_reset_one_metal() {
        let base = Decimal::from(14000);
        let mut ledger = AlertLedger::default();
        ledger.mark_notified(Metal::Gold, Threshold::TenPercent, base, at());
        ledger.mark_notified(Metal::Silver, Threshold::TwentyPercent, Decimal::from(180), at());

        let s = ledger.state(Metal::Gold, Threshold::TenPercent, base);
        assert!(s.notified);
        assert_eq!(s.notified_at, Some(at()));
        assert!(!ledger.is_notified(Metal::Gold, Threshold::TwentyPercent, base));

        ledger.reset(Some(Metal::Gold));
        assert!(!ledger.is_notified(Metal::Gold, Threshold::TenPercent, base));
        assert!(ledger.is_notified(Metal::Silver, Threshold::TwentyPercent, Decimal::from(180)));

        ledger.reset(None);
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn entry_from_another_baseline_is_stale() {
        let mut ledger = AlertLedger::default();
        ledger.mark_notified(Metal::Gold, Threshold::TenPercent, Decimal::from(14000), at());
        assert!(!ledger.is_notified(Metal::Gold, Threshold::TenPercent, Decimal::from(15000)));
    }

    #[test]
    fn serializes_with_percent_keys() {
        let mut ledger = AlertLedger::default();
        ledger.mark_notified(Metal::Gold, Threshold::TwentyPercent, Decimal::from(14000), at());
        let v = serde_json::to_value(&ledger).unwrap();
        assert_eq!(v["gold"]["20"]["baseline_price"], "14000");

        let back: AlertLedger = serde_json::from_value(v).unwrap();
        assert_eq!(back, ledger);
    }
}
