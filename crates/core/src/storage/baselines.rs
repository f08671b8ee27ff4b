use crate::domain::{Baseline, BaselineSource, Metal};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredBaseline {
    price: Decimal,
    set_at: DateTime<Utc>,
}

/// Stored baseline price per metal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Baselines {
    entries: BTreeMap<Metal, StoredBaseline>,
}

impl Baselines {
    pub fn get(&self, metal: Metal) -> Option<Baseline> {
        self.entries.get(&metal).map(|stored| Baseline {
            metal,
            price: stored.price,
            set_at: Some(stored.set_at),
            source: BaselineSource::Stored,
        })
    }

    /// Always overwrites. Callers that need the alert ledger cleared as well should go
    /// through `TrackerState::set_baseline`.
    pub fn set(&mut self, metal: Metal, price: Decimal, at: DateTime<Utc>) {
        self.entries
            .insert(metal, StoredBaseline { price, set_at: at });
    }
}
