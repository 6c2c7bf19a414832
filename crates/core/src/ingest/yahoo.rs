use crate::config::Settings;
use crate::ingest::provider::MarketDataClient;
use crate::ingest::types::{FundamentalsRecord, PriceBar, PriceSeries};
use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CHART_RANGE: &str = "1y";
const CHART_INTERVAL: &str = "1d";
const QUOTE_SUMMARY_MODULES: &str = "summaryDetail,defaultKeyStatistics";

// The chart endpoints reject requests without a browser-ish UA.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; folio/0.1)";

#[derive(Debug, Clone)]
pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .market_data_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("MARKET_DATA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build market data http client")?;

        Ok(Self { http, base_url })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;
        if !status.is_success() {
            anyhow::bail!("market data HTTP {status}: {text}");
        }

        serde_json::from_str::<T>(&text)
            .with_context(|| format!("failed to parse market data response: {text}"))
    }
}

#[async_trait::async_trait]
impl MarketDataClient for YahooClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceSeries> {
        let url = format!(
            "{}/v8/finance/chart/{symbol}",
            self.base_url.trim_end_matches('/')
        );
        let body: ChartResponse = self
            .get_json(url, &[("range", CHART_RANGE), ("interval", CHART_INTERVAL)])
            .await?;
        chart_to_series(symbol, body)
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalsRecord> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{symbol}",
            self.base_url.trim_end_matches('/')
        );
        let body: QuoteSummaryResponse = self
            .get_json(url, &[("modules", QUOTE_SUMMARY_MODULES)])
            .await?;
        summary_to_record(body)
    }
}

fn chart_to_series(symbol: &str, body: ChartResponse) -> Result<PriceSeries> {
    if let Some(err) = body.chart.error {
        anyhow::bail!("chart endpoint returned an error for {symbol}: {err}");
    }

    let doc = body
        .chart
        .result
        .into_iter()
        .next()
        .with_context(|| format!("chart response for {symbol} has no result"))?;
    let quote = doc
        .indicators
        .quote
        .into_iter()
        .next()
        .with_context(|| format!("chart response for {symbol} has no quote block"))?;

    anyhow::ensure!(
        doc.timestamp.len() == quote.close.len(),
        "chart response for {symbol} has {} timestamps but {} closes",
        doc.timestamp.len(),
        quote.close.len()
    );

    let mut bars: Vec<PriceBar> = Vec::with_capacity(doc.timestamp.len());
    for (ts, close) in doc.timestamp.into_iter().zip(quote.close) {
        // Halted or not-yet-settled sessions come back as nulls.
        let Some(close) = close else { continue };
        let date = DateTime::from_timestamp(ts, 0)
            .with_context(|| format!("chart response for {symbol} has invalid timestamp {ts}"))?
            .date_naive();

        // The in-progress session can repeat the last calendar date; keep the
        // newest close for it.
        if let Some(prev) = bars.last_mut() {
            if prev.date == date {
                prev.close = close;
                continue;
            }
        }
        bars.push(PriceBar { date, close });
    }

    PriceSeries::try_new(symbol, bars)
}

fn summary_to_record(body: QuoteSummaryResponse) -> Result<FundamentalsRecord> {
    let result = body
        .quote_summary
        .result
        .into_iter()
        .next()
        .context("quote summary response has no result")?;

    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();

    // summaryDetail is authoritative; defaultKeyStatistics fills the gaps the
    // detail module leaves for some listings.
    Ok(FundamentalsRecord {
        trailing_pe: raw(detail.trailing_pe),
        industry_pe: raw(detail.industry_pe),
        sector_pe: raw(detail.sector_pe),
        forward_pe: raw(detail.forward_pe).or(raw(stats.forward_pe)),
        market_cap: raw(detail.market_cap),
        dividend_yield: raw(detail.dividend_yield),
        beta: raw(detail.beta).or(raw(stats.beta)),
    })
}

fn raw(v: Option<RawValue>) -> Option<f64> {
    v.and_then(|v| v.raw)
}

#[derive(Debug, Clone, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Vec<ChartDocument>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartDocument {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(default)]
    result: Vec<QuoteSummaryResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    summary_detail: Option<SummaryDetail>,
    #[serde(default)]
    default_key_statistics: Option<KeyStatistics>,
}

/// Metric values arrive as nested objects like {"raw": 123.45, "fmt": "123.45"},
/// or as empty objects when the provider has nothing for the field.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(default, rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(default, rename = "industryPE")]
    industry_pe: Option<RawValue>,
    #[serde(default, rename = "sectorPE")]
    sector_pe: Option<RawValue>,
    #[serde(default, rename = "forwardPE")]
    forward_pe: Option<RawValue>,
    #[serde(default)]
    market_cap: Option<RawValue>,
    #[serde(default)]
    dividend_yield: Option<RawValue>,
    #[serde(default)]
    beta: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    #[serde(default, rename = "forwardPE")]
    forward_pe: Option<RawValue>,
    #[serde(default)]
    beta: Option<RawValue>,
}
