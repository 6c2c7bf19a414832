use folio_core::domain::instrument::Instrument;

// Hand-maintained universe: NSE holdings plus the two broad indices used as
// benchmarks.
const DEFAULT_HOLDINGS: [&str; 9] = [
    "HDFCBANK.NS",
    "RELIANCE.NS",
    "ICICIBANK.NS",
    "BEL.NS",
    "HAL.NS",
    "GOLDBEES.NS",
    "SILVERBEES.NS",
    "TATAMOTORS.NS",
    "BHARTIARTL.NS",
];

const DEFAULT_BENCHMARKS: [&str; 2] = ["^NSEI", "^BSESN"];

/// Builds the run's instrument registry: holdings first, then benchmarks,
/// each in listed order. Override either list with FOLIO_HOLDINGS /
/// FOLIO_BENCHMARKS (comma-separated symbols).
pub fn build_registry() -> Vec<Instrument> {
    let holdings = parse_symbol_list(std::env::var("FOLIO_HOLDINGS").ok())
        .unwrap_or_else(|| DEFAULT_HOLDINGS.iter().map(|s| s.to_string()).collect());
    let benchmarks = parse_symbol_list(std::env::var("FOLIO_BENCHMARKS").ok())
        .unwrap_or_else(|| DEFAULT_BENCHMARKS.iter().map(|s| s.to_string()).collect());

    let mut out = Vec::with_capacity(holdings.len() + benchmarks.len());
    out.extend(holdings.into_iter().map(Instrument::holding));
    out.extend(benchmarks.into_iter().map(Instrument::benchmark));
    out
}

fn parse_symbol_list(v: Option<String>) -> Option<Vec<String>> {
    let v = v?;
    let symbols: Vec<String> = v
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if symbols.is_empty() {
        None
    } else {
        Some(symbols)
    }
}
