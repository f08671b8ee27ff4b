use crate::domain::{AlertEvent, Baseline, Metal, PriceQuote};
use crate::notify::DispatchOutcome;
use crate::storage::AlertState;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct AlertDelivery {
    pub event: AlertEvent,
    pub outcome: DispatchOutcome,
}

#[derive(Debug, Clone)]
pub enum MetalOutcome {
    FetchFailed {
        error: String,
    },
    /// No baseline existed, so the fetched price became the baseline.
    BaselineInitialized {
        quote: PriceQuote,
    },
    Checked {
        quote: PriceQuote,
        baseline: Baseline,
        drop_pct: Option<Decimal>,
        alerts: Vec<AlertDelivery>,
        rebaselined: bool,
    },
}

impl MetalOutcome {
    pub(crate) fn changed_state(&self) -> bool {
        match self {
            Self::FetchFailed { .. } => false,
            Self::BaselineInitialized { .. } => true,
            Self::Checked {
                alerts,
                rebaselined,
                ..
            } => *rebaselined || alerts.iter().any(|a| a.outcome.any_delivered()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetalCheck {
    pub metal: Metal,
    pub outcome: MetalOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub metals: Vec<MetalCheck>,
}

impl CheckReport {
    pub fn has_fetch_failures(&self) -> bool {
        self.metals
            .iter()
            .any(|m| matches!(m.outcome, MetalOutcome::FetchFailed { .. }))
    }

    pub fn events(&self) -> Vec<&AlertEvent> {
        self.metals
            .iter()
            .flat_map(|m| match &m.outcome {
                MetalOutcome::Checked { alerts, .. } => alerts.iter().map(|a| &a.event).collect(),
                _ => Vec::new(),
            })
            .collect()
    }

    pub fn outcome(&self, metal: Metal) -> Option<&MetalOutcome> {
        self.metals
            .iter()
            .find(|m| m.metal == metal)
            .map(|m| &m.outcome)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BaselineReport {
    pub set: Vec<(Metal, Decimal)>,
    pub failed: Vec<(Metal, String)>,
    /// Metals whose new stored baseline is shadowed by an environment override.
    pub shadowed: Vec<Metal>,
}

impl BaselineReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MetalStatus {
    pub metal: Metal,
    pub baseline: Option<Baseline>,
    pub alerts: Vec<AlertState>,
    pub quote: Result<PriceQuote, String>,
    pub drop_pct: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub metals: Vec<MetalStatus>,
}
