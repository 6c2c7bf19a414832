use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod registry;

const DEFAULT_OUTPUT_FILE: &str = "Portfolio_Analysis.xlsx";

#[derive(Debug, Parser)]
#[command(name = "folio_worker")]
struct Args {
    /// Report as-of date (YYYY-MM-DD). Defaults to today's IST date.
    #[arg(long)]
    as_of_date: Option<String>,

    /// Output spreadsheet path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Fetch and compute, but skip writing the report artifact.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = folio_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let as_of = resolve_as_of_date(args.as_of_date.as_deref())?;
    let instruments = registry::build_registry();
    anyhow::ensure!(!instruments.is_empty(), "instrument registry is empty");

    let client = folio_core::ingest::yahoo::YahooClient::from_settings(&settings)?;

    tracing::info!(
        %as_of,
        instruments = instruments.len(),
        "starting portfolio snapshot"
    );
    let bundle =
        folio_core::report::assemble::build_report(&client, &instruments, as_of).await;
    let total = bundle.rows.len();

    if args.dry_run {
        tracing::info!(%as_of, total, dry_run = true, "dry-run: skipping report artifact");
        print_summary(total, bundle.succeeded, bundle.failed, "skipped (dry-run)");
        return Ok(());
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));

    match folio_core::report::writer::write_report(&output, &bundle.rows, &bundle.news) {
        Ok(artifact) => {
            tracing::info!(%as_of, artifact = %artifact, "portfolio snapshot written");
            print_summary(total, bundle.succeeded, bundle.failed, &artifact.to_string());
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(%as_of, error = %err, "report write failed after fallback");
            Err(err)
        }
    }
}

fn print_summary(total: usize, succeeded: usize, failed: usize, artifact: &str) {
    println!("Portfolio analysis: {artifact}");
    println!("Processed {total} instruments");
    println!("  - successful fetches: {succeeded}/{total}");
    println!("  - failed fetches: {failed}/{total}");
}

fn init_sentry(settings: &folio_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn resolve_as_of_date(as_of_date_arg: Option<&str>) -> anyhow::Result<chrono::NaiveDate> {
    if let Some(s) = as_of_date_arg {
        return Ok(chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")?);
    }

    // Default: IST date (UTC+5:30), the exchange-local calendar for the
    // default NSE/BSE registry.
    let ist = chrono::FixedOffset::east_opt(5 * 3600 + 1800).context("invalid IST offset")?;
    Ok(chrono::Utc::now().with_timezone(&ist).date_naive())
}
