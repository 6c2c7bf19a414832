pub mod domain;
pub mod ingest;
pub mod report;

pub mod config {
    #[derive(Debug, Clone)]
    pub struct Settings {
        pub market_data_base_url: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                market_data_base_url: std::env::var("MARKET_DATA_BASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }
    }
}
