use crate::domain::row::Fundamentals;
use crate::ingest::types::FundamentalsRecord;

const CRORE: f64 = 10_000_000.0;

/// First present value of an ordered fallback chain.
pub fn first_present(candidates: &[Option<f64>]) -> Option<f64> {
    candidates.iter().copied().flatten().next()
}

/// Normalizes a raw provider record. A missing or zero trailing P/E marks the
/// whole record unavailable (indices and ETFs usually carry none); otherwise
/// each metric converts independently and missing values stay absent.
pub fn extract(symbol: &str, record: &FundamentalsRecord) -> Fundamentals {
    let trailing_pe = record.trailing_pe.filter(|pe| pe.is_finite() && *pe != 0.0);
    let Some(trailing_pe) = trailing_pe else {
        tracing::info!(symbol, "trailing P/E unavailable; reporting fundamentals as absent");
        return Fundamentals::default();
    };

    Fundamentals {
        trailing_pe: Some(trailing_pe),
        reference_pe: first_present(&[record.industry_pe, record.sector_pe, record.forward_pe]),
        market_cap_cr: record.market_cap.map(|v| v / CRORE),
        dividend_yield_pct: record.dividend_yield.map(|v| v * 100.0),
        beta: record.beta,
    }
}
