use crate::domain::news::NewsItem;
use crate::domain::row::ReportRow;
use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DASHBOARD_SHEET: &str = "Dashboard";
pub const NEWS_SHEET: &str = "News Feed";

pub const DASHBOARD_HEADERS: [&str; 11] = [
    "Stock",
    "Daily Change %",
    "Weekly Change %",
    "Monthly Change %",
    "YTD Change %",
    "Yearly Change %",
    "PE Ratio",
    "Industry PE",
    "Market Cap (Cr)",
    "Dividend Yield %",
    "Beta",
];

pub const NEWS_HEADERS: [&str; 5] = ["Stock", "Headline", "Source", "Published At", "URL"];

/// Which serialization path produced the run's artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPath {
    Spreadsheet(PathBuf),
    DelimitedFallback { dashboard: PathBuf, news: PathBuf },
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactPath::Spreadsheet(path) => write!(f, "spreadsheet {}", path.display()),
            ArtifactPath::DelimitedFallback { dashboard, news } => write!(
                f,
                "delimited fallback {} + {}",
                dashboard.display(),
                news.display()
            ),
        }
    }
}

/// Writes the two-sheet workbook; on any primary failure, falls back to a
/// pair of delimited-text files with the identical column layout. Only a
/// fallback failure propagates (the run's sole fatal condition).
pub fn write_report(
    output: &Path,
    rows: &[ReportRow],
    news: &[NewsItem],
) -> Result<ArtifactPath> {
    match write_workbook(output, rows, news) {
        Ok(()) => Ok(ArtifactPath::Spreadsheet(output.to_path_buf())),
        Err(err) => {
            tracing::warn!(
                output = %output.display(),
                error = %err,
                "spreadsheet write failed; falling back to delimited text"
            );

            let (dashboard, news_path) = fallback_paths(output);
            write_dashboard_csv(&dashboard, rows).with_context(|| {
                format!("fallback dashboard write failed: {}", dashboard.display())
            })?;
            write_news_csv(&news_path, news).with_context(|| {
                format!("fallback news write failed: {}", news_path.display())
            })?;

            Ok(ArtifactPath::DelimitedFallback {
                dashboard,
                news: news_path,
            })
        }
    }
}

fn write_workbook(output: &Path, rows: &[ReportRow], news: &[NewsItem]) -> Result<()> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(DASHBOARD_SHEET)?;
    for (col, header) in DASHBOARD_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, row.symbol.as_str())?;
        for (j, cell) in row.numeric_cells().iter().enumerate() {
            // Absent values stay empty cells.
            if let Some(v) = cell {
                sheet.write_number(r, (j + 1) as u16, *v)?;
            }
        }
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name(NEWS_SHEET)?;
    for (col, header) in NEWS_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (i, item) in news.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, item.symbol.as_str())?;
        sheet.write_string(r, 1, item.headline.as_str())?;
        sheet.write_string(r, 2, item.source.as_str())?;
        sheet.write_string(r, 3, item.published_at.to_string())?;
        sheet.write_string(r, 4, item.url.as_str())?;
    }

    workbook
        .save(output)
        .with_context(|| format!("failed to save workbook {}", output.display()))?;
    Ok(())
}

/// Dashboard table lands beside the intended spreadsheet as `<stem>.csv`,
/// the news table as `<stem>_news.csv`.
fn fallback_paths(output: &Path) -> (PathBuf, PathBuf) {
    let dashboard = output.with_extension("csv");
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("portfolio_report");
    let news = output.with_file_name(format!("{stem}_news.csv"));
    (dashboard, news)
}

fn write_dashboard_csv(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(DASHBOARD_HEADERS)?;
    for row in rows {
        let mut record = Vec::with_capacity(DASHBOARD_HEADERS.len());
        record.push(row.symbol.clone());
        for cell in row.numeric_cells() {
            record.push(format_cell(cell));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_news_csv(path: &Path, news: &[NewsItem]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(NEWS_HEADERS)?;
    for item in news {
        writer.write_record(&[
            item.symbol.clone(),
            item.headline.clone(),
            item.source.clone(),
            item.published_at.to_string(),
            item.url.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn format_cell(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::InstrumentKind;
    use crate::domain::row::{ChangeSet, Fundamentals};
    use crate::report::assemble::placeholder_news;
    use std::fs;

    fn sample_rows() -> Vec<ReportRow> {
        vec![
            ReportRow {
                symbol: "HDFCBANK.NS".to_string(),
                kind: InstrumentKind::Holding,
                changes: ChangeSet {
                    daily: Some(0.33),
                    weekly: Some(-1.2),
                    monthly: None,
                    ytd: Some(4.5),
                    yearly: None,
                },
                fundamentals: Fundamentals {
                    trailing_pe: Some(18.46),
                    reference_pe: Some(14.0),
                    market_cap_cr: Some(12_345.0),
                    dividend_yield_pct: Some(1.85),
                    beta: Some(1.1),
                },
            },
            ReportRow {
                symbol: "^NSEI".to_string(),
                kind: InstrumentKind::Benchmark,
                changes: ChangeSet::default(),
                fundamentals: Fundamentals::default(),
            },
        ]
    }

    fn scratch_dir(case: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("folio_writer_{}_{case}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn primary_path_writes_a_spreadsheet() {
        let dir = scratch_dir("primary");
        let output = dir.join("Portfolio_Analysis.xlsx");

        let artifact = write_report(&output, &sample_rows(), &placeholder_news()).unwrap();
        assert_eq!(artifact, ArtifactPath::Spreadsheet(output.clone()));
        assert!(output.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_primary_falls_back_to_column_equivalent_csv() {
        let dir = scratch_dir("fallback");
        // A directory at the output path makes the workbook save fail while
        // leaving the sibling CSV paths writable.
        let output = dir.join("Portfolio_Analysis.xlsx");
        fs::create_dir_all(&output).unwrap();

        let artifact = write_report(&output, &sample_rows(), &placeholder_news()).unwrap();
        let (dashboard, news) = match artifact {
            ArtifactPath::DelimitedFallback { dashboard, news } => (dashboard, news),
            other => panic!("expected fallback artifact, got {other}"),
        };

        let dashboard_text = fs::read_to_string(&dashboard).unwrap();
        let mut lines = dashboard_text.lines();
        assert_eq!(
            lines.next().unwrap(),
            DASHBOARD_HEADERS.join(",")
        );
        assert_eq!(
            lines.next().unwrap(),
            "HDFCBANK.NS,0.33,-1.20,,4.50,,18.46,14.00,12345.00,1.85,1.10"
        );
        // All-absent row keeps its identifier and empty numeric fields.
        assert_eq!(lines.next().unwrap(), "^NSEI,,,,,,,,,,");

        let news_text = fs::read_to_string(&news).unwrap();
        let mut news_lines = news_text.lines();
        assert_eq!(news_lines.next().unwrap(), NEWS_HEADERS.join(","));
        assert!(news_lines.next().unwrap().starts_with("HDFCBANK.NS,"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn fallback_paths_derive_from_the_output_stem() {
        let (dashboard, news) = fallback_paths(Path::new("/tmp/out/Portfolio_Analysis.xlsx"));
        assert_eq!(dashboard, Path::new("/tmp/out/Portfolio_Analysis.csv"));
        assert_eq!(news, Path::new("/tmp/out/Portfolio_Analysis_news.csv"));
    }
}
