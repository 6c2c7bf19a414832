use crate::domain::instrument::Instrument;
use crate::domain::news::NewsItem;
use crate::domain::row::{ChangeSet, Fundamentals, ReportRow};
use crate::ingest::provider::MarketDataClient;
use crate::report::{changes, fundamentals};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub rows: Vec<ReportRow>,
    pub news: Vec<NewsItem>,
    /// Rows with at least one change window present.
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs the sequential per-instrument pipeline: two gateway calls per
/// instrument, isolated failure handling, one row per instrument in registry
/// order. Per-instrument errors are logged and never abort the loop.
pub async fn build_report(
    client: &dyn MarketDataClient,
    instruments: &[Instrument],
    as_of: NaiveDate,
) -> ReportBundle {
    let total = instruments.len();
    let mut rows = Vec::with_capacity(total);

    for (idx, instrument) in instruments.iter().enumerate() {
        tracing::info!(
            idx,
            total,
            symbol = %instrument.symbol,
            provider = client.provider_name(),
            "fetching instrument data"
        );

        let changeset = match client.fetch_price_history(&instrument.symbol).await {
            Ok(series) => match changes::compute_changes(&series, as_of) {
                Ok(changeset) => changeset,
                Err(err) => {
                    tracing::warn!(
                        symbol = %instrument.symbol,
                        observations = err.observations,
                        "insufficient price history; emitting empty changes"
                    );
                    ChangeSet::default()
                }
            },
            Err(err) => {
                tracing::warn!(
                    symbol = %instrument.symbol,
                    error = %err,
                    "no usable price history; emitting empty changes"
                );
                ChangeSet::default()
            }
        };

        let funds = match client.fetch_fundamentals(&instrument.symbol).await {
            Ok(record) => fundamentals::extract(&instrument.symbol, &record),
            Err(err) => {
                tracing::warn!(
                    symbol = %instrument.symbol,
                    error = %err,
                    "fundamentals unavailable; emitting empty record"
                );
                Fundamentals::default()
            }
        };

        rows.push(normalize_row(ReportRow {
            symbol: instrument.symbol.clone(),
            kind: instrument.kind,
            changes: changeset,
            fundamentals: funds,
        }));
    }

    let succeeded = rows
        .iter()
        .filter(|row| row.changes.any_present())
        .count();
    let failed = total - succeeded;
    tracing::info!(total, succeeded, failed, "dashboard assembly complete");

    ReportBundle {
        rows,
        news: placeholder_news(),
        succeeded,
        failed,
    }
}

/// Coerce-then-round pass over every numeric field: non-finite values become
/// absent, present values are rounded to exactly two decimals. Absent stays
/// absent; rounding never invents a value.
pub fn normalize_row(mut row: ReportRow) -> ReportRow {
    let c = &mut row.changes;
    c.daily = round2(c.daily);
    c.weekly = round2(c.weekly);
    c.monthly = round2(c.monthly);
    c.ytd = round2(c.ytd);
    c.yearly = round2(c.yearly);

    let f = &mut row.fundamentals;
    f.trailing_pe = round2(f.trailing_pe);
    f.reference_pe = round2(f.reference_pe);
    f.market_cap_cr = round2(f.market_cap_cr);
    f.dividend_yield_pct = round2(f.dividend_yield_pct);
    f.beta = round2(f.beta);

    row
}

fn round2(v: Option<f64>) -> Option<f64> {
    v.and_then(|v| v.is_finite().then(|| (v * 100.0).round() / 100.0))
}

/// The static secondary table. Emitted unconditionally, independent of any
/// per-instrument outcome.
pub fn placeholder_news() -> Vec<NewsItem> {
    vec![
        NewsItem {
            symbol: "HDFCBANK.NS".to_string(),
            headline: "HDFC Bank sees growth in retail loans".to_string(),
            source: "Economic Times".to_string(),
            published_at: NaiveDate::from_ymd_opt(2025, 1, 10).expect("valid date"),
            url: "https://economictimes.indiatimes.com".to_string(),
        },
        NewsItem {
            symbol: "RELIANCE.NS".to_string(),
            headline: "Reliance Industries reports strong Q3 results".to_string(),
            source: "Business Standard".to_string(),
            published_at: NaiveDate::from_ymd_opt(2025, 1, 9).expect("valid date"),
            url: "https://business-standard.com".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::InstrumentKind;
    use crate::ingest::types::{FundamentalsRecord, PriceBar, PriceSeries};
    use anyhow::Result;
    use chrono::Duration;
    use std::collections::HashMap;

    struct StubClient {
        series: HashMap<String, Vec<PriceBar>>,
        fundamentals: HashMap<String, FundamentalsRecord>,
    }

    #[async_trait::async_trait]
    impl MarketDataClient for StubClient {
        fn provider_name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_price_history(&self, symbol: &str) -> Result<PriceSeries> {
            let bars = self
                .series
                .get(symbol)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no series for {symbol}"))?;
            PriceSeries::try_new(symbol, bars)
        }

        async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalsRecord> {
            self.fundamentals
                .get(symbol)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no fundamentals for {symbol}"))
        }
    }

    fn daily_bars(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar {
                date: start + Duration::days(i as i64),
                close: *close,
            })
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn rows_follow_registry_order_and_failures_stay_isolated() {
        let start = date(2026, 1, 1);
        let mut closes = vec![3.0; 35];
        closes[34] = 3.01;

        let mut series = HashMap::new();
        series.insert("OK.NS".to_string(), daily_bars(start, &closes));
        // Ten bars: present but below the whole-instrument minimum.
        series.insert("SHORT.NS".to_string(), daily_bars(start, &[5.0; 10]));
        // "GONE.NS" has no entry: fetch error path.

        let mut funds = HashMap::new();
        funds.insert(
            "OK.NS".to_string(),
            FundamentalsRecord {
                trailing_pe: Some(18.456),
                forward_pe: Some(14.0),
                market_cap: Some(123_450_000_000.0),
                dividend_yield: Some(0.0185),
                beta: Some(1.1),
                ..Default::default()
            },
        );

        let client = StubClient {
            series,
            fundamentals: funds,
        };
        let instruments = vec![
            Instrument::holding("OK.NS"),
            Instrument::holding("SHORT.NS"),
            Instrument::benchmark("GONE.NS"),
        ];

        let bundle = build_report(&client, &instruments, date(2026, 2, 4)).await;

        let symbols: Vec<&str> = bundle.rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["OK.NS", "SHORT.NS", "GONE.NS"]);
        assert_eq!(bundle.rows[2].kind, InstrumentKind::Benchmark);

        // OK.NS: rounded at the reporting stage.
        let ok = &bundle.rows[0];
        assert_eq!(ok.changes.daily, Some(0.33));
        assert_eq!(ok.changes.ytd, Some(0.33));
        assert_eq!(ok.changes.yearly, None);
        assert_eq!(ok.fundamentals.trailing_pe, Some(18.46));
        assert_eq!(ok.fundamentals.reference_pe, Some(14.0));
        assert_eq!(ok.fundamentals.market_cap_cr, Some(12_345.0));
        assert_eq!(ok.fundamentals.dividend_yield_pct, Some(1.85));

        // SHORT.NS and GONE.NS: all-absent but still present, in order.
        assert_eq!(bundle.rows[1].changes, ChangeSet::default());
        assert_eq!(bundle.rows[2].changes, ChangeSet::default());
        assert_eq!(bundle.rows[2].fundamentals, Fundamentals::default());

        assert_eq!(bundle.succeeded, 1);
        assert_eq!(bundle.failed, 2);
        assert_eq!(bundle.news.len(), 2);
    }

    #[test]
    fn normalization_coerces_non_finite_and_rounds() {
        let row = ReportRow {
            symbol: "X.NS".to_string(),
            kind: InstrumentKind::Holding,
            changes: ChangeSet {
                daily: Some(f64::NAN),
                weekly: Some(f64::INFINITY),
                monthly: Some(1.005),
                ytd: None,
                yearly: Some(-2.675),
            },
            fundamentals: Fundamentals {
                trailing_pe: Some(18.456),
                ..Default::default()
            },
        };

        let out = normalize_row(row);
        assert_eq!(out.changes.daily, None);
        assert_eq!(out.changes.weekly, None);
        assert_eq!(out.changes.ytd, None);
        assert_eq!(out.changes.yearly, Some(-2.68));
        assert_eq!(out.fundamentals.trailing_pe, Some(18.46));
        // Absent fields pass through rounding untouched.
        assert_eq!(out.fundamentals.market_cap_cr, None);
    }

    #[test]
    fn placeholder_news_is_fixed() {
        let news = placeholder_news();
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].symbol, "HDFCBANK.NS");
        assert_eq!(news[1].published_at, date(2025, 1, 9));
    }
}
