use crate::domain::row::ChangeSet;
use crate::ingest::types::PriceSeries;
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Below this many observations the instrument is treated as having
/// insufficient history as a whole and no window is evaluated.
pub const MIN_OBSERVATIONS: usize = 30;

const WEEKLY_SPAN: usize = 5;
const MONTHLY_SPAN: usize = 21;
const YEARLY_MIN_OBSERVATIONS: usize = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientHistory {
    pub observations: usize,
}

impl fmt::Display for InsufficientHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "insufficient price history: {} observations (minimum {MIN_OBSERVATIONS})",
            self.observations
        )
    }
}

impl std::error::Error for InsufficientHistory {}

/// Percentage change across the five fixed windows, or a whole-instrument
/// failure when the series is shorter than [`MIN_OBSERVATIONS`]. Values are
/// left unrounded; the assembler rounds once at the reporting stage.
pub fn compute_changes(
    series: &PriceSeries,
    as_of: NaiveDate,
) -> Result<ChangeSet, InsufficientHistory> {
    if series.len() < MIN_OBSERVATIONS {
        return Err(InsufficientHistory {
            observations: series.len(),
        });
    }
    Ok(evaluate_windows(series, as_of))
}

/// Evaluates each window independently; the absence of one never blocks the
/// others. Baselines count back from the chronologically last bar, except for
/// year-to-date (first bar of the as-of calendar year) and the yearly window
/// (first bar of the series, gated on [`YEARLY_MIN_OBSERVATIONS`]).
pub fn evaluate_windows(series: &PriceSeries, as_of: NaiveDate) -> ChangeSet {
    let bars = series.bars();
    let n = bars.len();
    let last = series.last_bar().close;
    let pct = |baseline: f64| (last - baseline) / baseline * 100.0;

    let daily = (n >= 2).then(|| pct(bars[n - 2].close));
    let weekly = (n >= WEEKLY_SPAN).then(|| pct(bars[n - WEEKLY_SPAN].close));
    let monthly = (n >= MONTHLY_SPAN).then(|| pct(bars[n - MONTHLY_SPAN].close));
    let ytd = bars
        .iter()
        .find(|bar| bar.date.year() == as_of.year())
        .map(|bar| pct(bar.close));
    let yearly = (n >= YEARLY_MIN_OBSERVATIONS).then(|| pct(bars[0].close));

    ChangeSet {
        daily,
        weekly,
        monthly,
        ytd,
        yearly,
    }
}
