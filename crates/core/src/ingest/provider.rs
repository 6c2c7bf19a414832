use crate::ingest::types::{FundamentalsRecord, PriceSeries};
use anyhow::Result;

/// The market data gateway: two logical operations per instrument, both
/// single-attempt. Callers treat every error as a no-data condition for that
/// instrument and keep going.
#[async_trait::async_trait]
pub trait MarketDataClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// One trailing year of daily closing prices.
    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceSeries>;

    /// The raw fundamentals record, unconverted.
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalsRecord>;
}
