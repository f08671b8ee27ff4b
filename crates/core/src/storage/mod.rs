pub mod alerts;
pub mod baselines;
pub mod json_file;
pub mod memory;

use crate::domain::Metal;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub use alerts::{AlertLedger, AlertState};
pub use baselines::Baselines;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Everything persisted between check cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerState {
    pub baselines: Baselines,
    pub alerts: AlertLedger,
}

impl TrackerState {
    /// A new baseline starts a new epoch, so the metal's notified thresholds are cleared.
    pub fn set_baseline(&mut self, metal: Metal, price: Decimal, at: DateTime<Utc>) {
        self.baselines.set(metal, price, at);
        self.alerts.reset(Some(metal));
    }
}

/// Loaded once at the start of a cycle and saved once at the end.
pub trait StateStore: Send + Sync {
    fn load(&self) -> anyhow::Result<TrackerState>;

    fn save(&self, state: &TrackerState) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Threshold;
    use chrono::TimeZone;

    #[test]
    fn set_baseline_clears_only_that_metal() {
        let at = Utc.with_ymd_and_hms(2026, 1, 27, 10, 0, 0).unwrap();
        let mut state = TrackerState::default();
        state.baselines.set(Metal::Gold, Decimal::from(14000), at);
        state.baselines.set(Metal::Silver, Decimal::from(180), at);
        state
            .alerts
            .mark_notified(Metal::Gold, Threshold::TenPercent, Decimal::from(14000), at);
        state
            .alerts
            .mark_notified(Metal::Silver, Threshold::TenPercent, Decimal::from(180), at);

        state.set_baseline(Metal::Gold, Decimal::from(14000), at);

        assert!(!state
            .alerts
            .is_notified(Metal::Gold, Threshold::TenPercent, Decimal::from(14000)));
        assert!(state
            .alerts
            .is_notified(Metal::Silver, Threshold::TenPercent, Decimal::from(180)));
    }
}
