use crate::domain::instrument::InstrumentKind;

/// Percentage price changes over the five fixed look-back windows.
/// `None` means the series did not cover that window; it is never a stand-in
/// for a zero change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub daily: Option<f64>,
    pub weekly: Option<f64>,
    pub monthly: Option<f64>,
    pub ytd: Option<f64>,
    /// Change from the first observation of the fetched series, reported when
    /// the series holds at least 240 bars. Approximates "one year ago"; only
    /// accurate when the fetched window actually spans about a year.
    pub yearly: Option<f64>,
}

impl ChangeSet {
    pub fn any_present(&self) -> bool {
        self.daily.is_some()
            || self.weekly.is_some()
            || self.monthly.is_some()
            || self.ytd.is_some()
            || self.yearly.is_some()
    }
}

/// Normalized valuation/risk metrics. Market cap is in crore units (raw value
/// divided by 1e7); dividend yield is in percentage points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fundamentals {
    pub trailing_pe: Option<f64>,
    pub reference_pe: Option<f64>,
    pub market_cap_cr: Option<f64>,
    pub dividend_yield_pct: Option<f64>,
    pub beta: Option<f64>,
}

/// One dashboard line: instrument identity plus its change and fundamentals
/// records, numeric fields rounded to two decimals by the assembler.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub symbol: String,
    pub kind: InstrumentKind,
    pub changes: ChangeSet,
    pub fundamentals: Fundamentals,
}

impl ReportRow {
    /// Numeric cells in dashboard column order (changes, then fundamentals).
    pub fn numeric_cells(&self) -> [Option<f64>; 10] {
        [
            self.changes.daily,
            self.changes.weekly,
            self.changes.monthly,
            self.changes.ytd,
            self.changes.yearly,
            self.fundamentals.trailing_pe,
            self.fundamentals.reference_pe,
            self.fundamentals.market_cap_cr,
            self.fundamentals.dividend_yield_pct,
            self.fundamentals.beta,
        ]
    }
}
