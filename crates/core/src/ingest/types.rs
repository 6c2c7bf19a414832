use anyhow::Result;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

/// Up to one trailing year of daily closes for one instrument, ascending by
/// date. Construction validates the series so downstream indexing can assume
/// the invariants hold.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn try_new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self> {
        let symbol = symbol.into();
        anyhow::ensure!(!bars.is_empty(), "price series for {symbol} is empty");

        for pair in bars.windows(2) {
            anyhow::ensure!(
                pair[0].date < pair[1].date,
                "price series for {symbol} is not strictly ascending at {}",
                pair[1].date
            );
        }

        for bar in &bars {
            anyhow::ensure!(
                bar.close.is_finite() && bar.close > 0.0,
                "price series for {symbol} has non-positive close {} at {}",
                bar.close,
                bar.date
            );
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The chronologically last bar (the reference observation).
    pub fn last_bar(&self) -> &PriceBar {
        // Safe: try_new rejects empty series.
        &self.bars[self.bars.len() - 1]
    }
}

/// Raw fundamentals as returned by the provider, before unit normalization.
/// Every field is independently optional; which keys a provider populates
/// varies by instrument type (indices and ETFs usually carry none).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundamentalsRecord {
    pub trailing_pe: Option<f64>,
    pub industry_pe: Option<f64>,
    pub sector_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub market_cap: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
}
