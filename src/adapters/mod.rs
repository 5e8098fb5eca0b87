pub mod openai;
pub mod yahoo_finance;

use crate::core_logic::models::MarketSnapshot;
use crate::error::Result;
use async_trait::async_trait;

/// Source of statements, earnings events and prices for a ticker.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// `period` is the price lookback, e.g. `1y`.
    async fn fetch_snapshot(&self, ticker: &str, period: &str) -> Result<MarketSnapshot>;
}

#[async_trait]
pub trait LanguageModelClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}
