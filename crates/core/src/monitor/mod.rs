pub mod report;

use crate::alerts::AlertEvaluator;
use crate::config::Settings;
use crate::domain::{Baseline, BaselineSource, Metal, PriceQuote};
use crate::notify::Notifier;
use crate::pricing::PriceProvider;
use crate::storage::{StateStore, TrackerState};
use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

pub use report::{
    AlertDelivery, BaselineReport, CheckReport, MetalCheck, MetalOutcome, MetalStatus,
    StatusReport,
};

/// One check cycle: fetch, compare, notify, persist. Holds no timer; scheduling lives in
/// whatever drives `run_check`.
pub struct Monitor {
    prices: Arc<dyn PriceProvider>,
    store: Arc<dyn StateStore>,
    notifier: Notifier,
    evaluator: AlertEvaluator,
    baseline_overrides: BTreeMap<Metal, Decimal>,
    auto_rebaseline: bool,
}

impl Monitor {
    pub fn new(
        prices: Arc<dyn PriceProvider>,
        store: Arc<dyn StateStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            prices,
            store,
            notifier,
            evaluator: AlertEvaluator::default(),
            baseline_overrides: BTreeMap::new(),
            auto_rebaseline: false,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        prices: Arc<dyn PriceProvider>,
        store: Arc<dyn StateStore>,
        notifier: Notifier,
    ) -> Self {
        let mut monitor = Self::new(prices, store, notifier)
            .with_evaluator(AlertEvaluator::new(settings.enabled_thresholds()))
            .with_auto_rebaseline(settings.auto_rebaseline);
        for metal in Metal::ALL {
            if let Some(price) = settings.baseline_override(metal) {
                monitor = monitor.with_baseline_override(metal, price);
            }
        }
        monitor
    }

    pub fn with_evaluator(mut self, evaluator: AlertEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_baseline_override(mut self, metal: Metal, price: Decimal) -> Self {
        self.baseline_overrides.insert(metal, price);
        self
    }

    pub fn with_auto_rebaseline(mut self, enabled: bool) -> Self {
        self.auto_rebaseline = enabled;
        self
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn evaluator(&self) -> &AlertEvaluator {
        &self.evaluator
    }

    /// Environment overrides win over the stored baseline.
    fn effective_baseline(&self, state: &TrackerState, metal: Metal) -> Option<Baseline> {
        match self.baseline_overrides.get(&metal) {
            Some(price) => Some(Baseline::from_environment(metal, *price)),
            None => state.baselines.get(metal),
        }
    }

    pub async fn run_check(&self, now: DateTime<Utc>) -> anyhow::Result<CheckReport> {
        let mut state = self.store.load().context("failed to load tracker state")?;

        let mut report = CheckReport::default();
        for metal in Metal::ALL {
            let outcome = self.check_metal(metal, &mut state, now).await;
            report.metals.push(MetalCheck { metal, outcome });
        }

        if report.metals.iter().any(|m| m.outcome.changed_state()) {
            self.store
                .save(&state)
                .context("failed to save tracker state")?;
        }

        Ok(report)
    }

    async fn check_metal(
        &self,
        metal: Metal,
        state: &mut TrackerState,
        now: DateTime<Utc>,
    ) -> MetalOutcome {
        let quote = match self.prices.fetch_quote(metal).await {
            Ok(quote) => quote,
            Err(err) => {
                tracing::error!(
                    %metal,
                    provider = self.prices.provider_name(),
                    error = %err,
                    "price fetch failed; skipping metal"
                );
                return MetalOutcome::FetchFailed {
                    error: err.to_string(),
                };
            }
        };

        let Some(baseline) = self.effective_baseline(state, metal) else {
            state.set_baseline(metal, quote.price, now);
            tracing::info!(%metal, price = %quote.price, "no baseline yet; recorded current price");
            return MetalOutcome::BaselineInitialized { quote };
        };

        let drop_pct = baseline.drop_percent(quote.price);
        tracing::info!(
            %metal,
            price = %quote.price,
            baseline = %baseline.price,
            drop_pct = %drop_pct.map(|d| d.round_dp(2)).unwrap_or_default(),
            "checked price"
        );

        let events = self.evaluator.evaluate(&quote, &baseline, &state.alerts);
        let mut alerts = Vec::with_capacity(events.len());
        for event in events {
            tracing::info!(
                %metal,
                threshold = event.threshold.percent(),
                drop_pct = %event.drop_pct.round_dp(2),
                "price dropped past threshold"
            );

            let outcome = self.notifier.dispatch(&event, &quote).await;
            if outcome.any_delivered() {
                state
                    .alerts
                    .mark_notified(metal, event.threshold, baseline.price, now);
            } else {
                tracing::warn!(
                    %metal,
                    threshold = event.threshold.percent(),
                    "no notification delivered; will retry next cycle"
                );
            }
            alerts.push(AlertDelivery { event, outcome });
        }

        let rebaselined = self.auto_rebaseline && self.rebaseline(state, &baseline, &quote, &alerts, now);

        MetalOutcome::Checked {
            quote,
            baseline,
            drop_pct,
            alerts,
            rebaselined,
        }
    }

    fn rebaseline(
        &self,
        state: &mut TrackerState,
        baseline: &Baseline,
        quote: &PriceQuote,
        alerts: &[AlertDelivery],
        now: DateTime<Utc>,
    ) -> bool {
        if !alerts.iter().any(|a| a.outcome.any_delivered()) {
            return false;
        }
        if baseline.source == BaselineSource::Environment {
            tracing::warn!(
                metal = %quote.metal,
                "baseline comes from the environment; skipping auto-rebaseline"
            );
            return false;
        }

        state.set_baseline(quote.metal, quote.price, now);
        tracing::info!(
            metal = %quote.metal,
            old = %baseline.price,
            new = %quote.price,
            "baseline moved to current price after alert"
        );
        true
    }

    /// Stores the current price of each metal as its new baseline, clearing its alerts.
    pub async fn set_baselines(
        &self,
        metals: &[Metal],
        now: DateTime<Utc>,
    ) -> anyhow::Result<BaselineReport> {
        let mut state = self.store.load().context("failed to load tracker state")?;
        let mut report = BaselineReport::default();

        for &metal in metals {
            match self.prices.fetch_quote(metal).await {
                Ok(quote) => {
                    state.set_baseline(metal, quote.price, now);
                    tracing::info!(%metal, price = %quote.price, "baseline set");
                    if self.baseline_overrides.contains_key(&metal) {
                        tracing::warn!(
                            %metal,
                            env = metal.baseline_env_key(),
                            "stored baseline is shadowed by an environment override"
                        );
                        report.shadowed.push(metal);
                    }
                    report.set.push((metal, quote.price));
                }
                Err(err) => {
                    tracing::error!(%metal, error = %err, "price fetch failed; baseline unchanged");
                    report.failed.push((metal, err.to_string()));
                }
            }
        }

        if !report.set.is_empty() {
            self.store
                .save(&state)
                .context("failed to save tracker state")?;
        }

        Ok(report)
    }

    pub fn reset_alerts(&self, metal: Option<Metal>) -> anyhow::Result<()> {
        let mut state = self.store.load().context("failed to load tracker state")?;
        state.alerts.reset(metal);
        self.store
            .save(&state)
            .context("failed to save tracker state")?;
        match metal {
            Some(metal) => tracing::info!(%metal, "alert state reset"),
            None => tracing::info!("alert state reset for all metals"),
        }
        Ok(())
    }

    pub async fn status(&self) -> anyhow::Result<StatusReport> {
        let state = self.store.load().context("failed to load tracker state")?;
        let mut report = StatusReport::default();

        for metal in Metal::ALL {
            let baseline = self.effective_baseline(&state, metal);
            let alerts = match &baseline {
                Some(b) => self
                    .evaluator
                    .thresholds()
                    .iter()
                    .map(|t| state.alerts.state(metal, *t, b.price))
                    .collect(),
                None => Vec::new(),
            };

            let quote = self.prices.fetch_quote(metal).await.map_err(|err| {
                tracing::warn!(%metal, error = %err, "price fetch failed");
                err.to_string()
            });
            let drop_pct = match (&baseline, &quote) {
                (Some(b), Ok(q)) => b.drop_percent(q.price),
                _ => None,
            };

            report.metals.push(MetalStatus {
                metal,
                baseline,
                alerts,
                quote,
                drop_pct,
            });
        }

        Ok(report)
    }
}
