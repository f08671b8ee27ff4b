use crate::domain::{AlertEvent, Baseline, PriceQuote, Threshold};
use crate::storage::AlertLedger;

/// Decides which thresholds a quote newly crosses. Pure: marking notified thresholds
/// is left to the caller once delivery has succeeded.
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    thresholds: Vec<Threshold>,
}

impl AlertEvaluator {
    pub fn new(mut thresholds: Vec<Threshold>) -> Self {
        thresholds.sort();
        thresholds.dedup();
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }

    pub fn evaluate(
        &self,
        quote: &PriceQuote,
        baseline: &Baseline,
        ledger: &AlertLedger,
    ) -> Vec<AlertEvent> {
        let Some(drop_pct) = baseline.drop_percent(quote.price) else {
            return Vec::new();
        };

        self.thresholds
            .iter()
            .copied()
            .filter(|threshold| drop_pct >= threshold.as_decimal())
            .filter(|threshold| !ledger.is_notified(quote.metal, *threshold, baseline.price))
            .map(|threshold| AlertEvent {
                metal: quote.metal,
                threshold,
                drop_pct,
                current_price: quote.price,
                baseline_price: baseline.price,
            })
            .collect()
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new(Threshold::ALL.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BaselineSource, Metal};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn quote(metal: Metal, price: i64) -> PriceQuote {
        PriceQuote::new(
            metal,
            Decimal::from(price),
            Utc.with_ymd_and_hms(2026, 1, 27, 10, 0, 0).unwrap(),
        )
    }

    fn baseline(metal: Metal, price: i64) -> Baseline {
        Baseline {
            metal,
            price: Decimal::from(price),
            set_at: None,
            source: BaselineSource::Stored,
        }
    }

    fn thresholds(events: &[AlertEvent]) -> Vec<Threshold> {
        events.iter().map(|e| e.threshold).collect()
    }

    #[test]
    fn below_ten_percent_fires_nothing() {
        let ev = AlertEvaluator::default();
        let ledger = AlertLedger::default();
        for price in [100, 95, 91, 120] {
            let events = ev.evaluate(&quote(Metal::Gold, price), &baseline(Metal::Gold, 100), &ledger);
            assert!(events.is_empty(), "price {price} should not alert");
        }
    }

    #[test]
    fn exactly_ten_percent_fires_ten() {
        let ev = AlertEvaluator::default();
        let events = ev.evaluate(
            &quote(Metal::Gold, 90),
            &baseline(Metal::Gold, 100),
            &AlertLedger::default(),
        );
        assert_eq!(thresholds(&events), vec![Threshold::TenPercent]);
    }

    #[test]
    fn exactly_twenty_percent_fires_both() {
        let ev = AlertEvaluator::default();
        let at = Utc.with_ymd_and_hms(2026, 1, 27, 10, 0, 0).unwrap();
        let silver = baseline(Metal::Silver, 180);

        let events = ev.evaluate(
            &PriceQuote::new(Metal::Silver, Decimal::from(144), at),
            &silver,
            &AlertLedger::default(),
        );
        assert_eq!(
            thresholds(&events),
            vec![Threshold::TenPercent, Threshold::TwentyPercent]
        );

        let events = ev.evaluate(
            &PriceQuote::new(Metal::Silver, Decimal::new(14401, 2), at),
            &silver,
            &AlertLedger::default(),
        );
        assert_eq!(thresholds(&events), vec![Threshold::TenPercent]);
    }

    #[test]
    fn gold_scenario_fires_ten_only() {
        let ev = AlertEvaluator::default();
        let events = ev.evaluate(
            &quote(Metal::Gold, 12500),
            &baseline(Metal::Gold, 14000),
            &AlertLedger::default(),
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].metal, Metal::Gold);
        assert_eq!(events[0].threshold, Threshold::TenPercent);
        assert_eq!(events[0].drop_pct.round_dp(2), Decimal::new(1071, 2));
        assert_eq!(events[0].current_price, Decimal::from(12500));
        assert_eq!(events[0].baseline_price, Decimal::from(14000));
    }

    #[test]
    fn silver_scenario_fires_both() {
        let ev = AlertEvaluator::default();
        let events = ev.evaluate(
            &quote(Metal::Silver, 140),
            &baseline(Metal::Silver, 180),
            &AlertLedger::default(),
        );
        assert_eq!(
            thresholds(&events),
            vec![Threshold::TenPercent, Threshold::TwentyPercent]
        );
        assert!(events.iter().all(|e| e.metal == Metal::Silver));
    }

    #[test]
    fn notified_thresholds_are_skipped_independently() {
        let ev = AlertEvaluator::default();
        let mut ledger = AlertLedger::default();
        let at = Utc.with_ymd_and_hms(2026, 1, 27, 9, 0, 0).unwrap();
        ledger.mark_notified(Metal::Silver, Threshold::TenPercent, Decimal::from(180), at);

        let events = ev.evaluate(&quote(Metal::Silver, 140), &baseline(Metal::Silver, 180), &ledger);
        assert_eq!(thresholds(&events), vec![Threshold::TwentyPercent]);

        ledger.mark_notified(Metal::Silver, Threshold::TwentyPercent, Decimal::from(180), at);
        let events = ev.evaluate(&quote(Metal::Silver, 140), &baseline(Metal::Silver, 180), &ledger);
        assert!(events.is_empty());
    }

    #[test]
    fn disabled_thresholds_never_fire() {
        let ev = AlertEvaluator::new(vec![Threshold::TwentyPercent]);
        let events = ev.evaluate(
            &quote(Metal::Gold, 12500),
            &baseline(Metal::Gold, 14000),
            &AlertLedger::default(),
        );
        assert!(events.is_empty());

        let none = AlertEvaluator::new(Vec::new());
        let events = none.evaluate(
            &quote(Metal::Silver, 100),
            &baseline(Metal::Silver, 180),
            &AlertLedger::default(),
        );
        assert!(events.is_empty());
    }

    #[test]
    fn zero_baseline_fires_nothing() {
        let ev = AlertEvaluator::default();
        let events = ev.evaluate(
            &quote(Metal::Gold, 10),
            &baseline(Metal::Gold, 0),
            &AlertLedger::default(),
        );
        assert!(events.is_empty());
    }
}
