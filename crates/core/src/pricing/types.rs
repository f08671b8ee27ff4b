use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Envelope returned by `GET /api/prices?metal=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<PriceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEntry {
    pub price_with_gst: Decimal,
    #[serde(default)]
    pub price_without_gst: Option<Decimal>,
    #[serde(default)]
    pub aura_buy_price: Option<Decimal>,
    #[serde(default)]
    pub aura_sell_price: Option<Decimal>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
}
