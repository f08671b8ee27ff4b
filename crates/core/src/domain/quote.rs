use crate::domain::metal::{Metal, Threshold};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub metal: Metal,
    /// Consumer price including GST; the price every comparison uses.
    pub price: Decimal,
    pub fetched_at: DateTime<Utc>,
    pub product_name: Option<String>,
    pub price_without_gst: Option<Decimal>,
    pub buy_price: Option<Decimal>,
    pub sell_price: Option<Decimal>,
    pub updated_at: Option<String>,
}

impl PriceQuote {
    pub fn new(metal: Metal, price: Decimal, fetched_at: DateTime<Utc>) -> Self {
        Self {
            metal,
            price,
            fetched_at,
            product_name: None,
            price_without_gst: None,
            buy_price: None,
            sell_price: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    Stored,
    Environment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub metal: Metal,
    pub price: Decimal,
    pub set_at: Option<DateTime<Utc>>,
    pub source: BaselineSource,
}

impl Baseline {
    pub fn from_environment(metal: Metal, price: Decimal) -> Self {
        Self {
            metal,
            price,
            set_at: None,
            source: BaselineSource::Environment,
        }
    }

    pub fn drop_percent(&self, current: Decimal) -> Option<Decimal> {
        drop_percent(self.price, current)
    }
}

/// Percentage fall from `baseline` to `current`; negative when the price rose.
/// `None` for a non-positive baseline.
pub fn drop_percent(baseline: Decimal, current: Decimal) -> Option<Decimal> {
    if baseline <= Decimal::ZERO {
        return None;
    }
    Some((baseline - current) / baseline * Decimal::ONE_HUNDRED)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub metal: Metal,
    pub threshold: Threshold,
    pub drop_pct: Decimal,
    pub current_price: Decimal,
    pub baseline_price: Decimal,
}
