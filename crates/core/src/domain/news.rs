use chrono::NaiveDate;

/// A single entry of the report's secondary table. Not sourced from any live
/// feed; the assembler emits a fixed placeholder set each run.
#[derive(Debug, Clone)]
pub struct NewsItem {
    pub symbol: String,
    pub headline: String,
    pub source: String,
    pub published_at: NaiveDate,
    pub url: String,
}
