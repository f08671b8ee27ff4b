pub mod http;
pub mod types;

use crate::domain::{Metal, PriceQuote};
use crate::error::FetchError;

#[async_trait::async_trait]
pub trait PriceProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_quote(&self, metal: Metal) -> Result<PriceQuote, FetchError>;
}
