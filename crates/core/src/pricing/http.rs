use crate::config::Settings;
use crate::domain::{Metal, PriceQuote};
use crate::error::FetchError;
use crate::pricing::types::PricesResponse;
use crate::pricing::PriceProvider;
use anyhow::Context;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;

const PRICES_PATH: &str = "/api/prices";
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct HttpJsonPriceProvider {
    http: reqwest::Client,
    base_url: String,
}

impl HttpJsonPriceProvider {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout())
            .build()
            .context("failed to build price API http client")?;

        Ok(Self::new(http, settings.price_api_base_url.clone()))
    }

    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), PRICES_PATH)
    }
}

#[async_trait::async_trait]
impl PriceProvider for HttpJsonPriceProvider {
    fn provider_name(&self) -> &'static str {
        "aura_http_json"
    }

    async fn fetch_quote(&self, metal: Metal) -> Result<PriceQuote, FetchError> {
        let res = self
            .http
            .get(self.url())
            .query(&[("metal", metal.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Request { metal, source })?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|source| FetchError::Request { metal, source })?;

        let quote = parse_quote(metal, status, &text, Utc::now())?;
        tracing::debug!(%metal, price = %quote.price, "fetched price quote");
        Ok(quote)
    }
}

/// Turns a raw price API response into a quote, taking the first `data` entry.
pub fn parse_quote(
    metal: Metal,
    status: StatusCode,
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<PriceQuote, FetchError> {
    if !status.is_success() {
        return Err(FetchError::Status {
            metal,
            status,
            body: truncate(body),
        });
    }

    let parsed = serde_json::from_str::<PricesResponse>(body)
        .map_err(|source| FetchError::Malformed { metal, source })?;

    if !parsed.success {
        return Err(FetchError::Unsuccessful { metal });
    }

    let entry = parsed
        .data
        .into_iter()
        .next()
        .ok_or(FetchError::Empty { metal })?;

    if entry.price_with_gst <= Decimal::ZERO {
        return Err(FetchError::InvalidPrice {
            metal,
            price: entry.price_with_gst,
        });
    }

    Ok(PriceQuote {
        metal,
        price: entry.price_with_gst,
        fetched_at,
        product_name: entry.product_name,
        price_without_gst: entry.price_without_gst,
        buy_price: entry.aura_buy_price,
        sell_price: entry.aura_sell_price,
        updated_at: entry.updated_at,
    })
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
