use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub catalog_base_url: String,
    pub job_api_key: String,
    pub sync_interval: Option<Duration>,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("PORT").unwrap_or_else(|| "3000".to_string()).parse().context("PORT")?;

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite://showsync.db?mode=rwc".to_string());

        let catalog_base_url = var("CATALOG_BASE_URL").context("CATALOG_BASE_URL is not set")?;

        let job_api_key = var("JOB_API_KEY").unwrap_or_default();
        if job_api_key.is_empty() {
            tracing::warn!("JOB_API_KEY is empty, the job trigger endpoint will reject every call");
        }

        let sync_interval = match var("SYNC_INTERVAL") {
            Some(raw) if !raw.trim().is_empty() => Some(parse_interval(&raw)?),
            _ => None,
        };

        let http_timeout_secs: u64 =
            var("HTTP_TIMEOUT_SECS").and_then(|s| s.parse().ok()).unwrap_or(30);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            catalog_base_url,
            job_api_key,
            sync_interval,
            http_timeout_secs,
        })
    }
}

/// Parses a scheduling period such as `6h`, `1h 30m` or `PT45M`.
pub fn parse_interval(raw: &str) -> anyhow::Result<Duration> {
    let span: jiff::Span =
        raw.trim().parse().with_context(|| format!("SYNC_INTERVAL {raw:?} is not a span"))?;
    let signed = jiff::SignedDuration::try_from(span)
        .with_context(|| format!("SYNC_INTERVAL {raw:?} has no fixed length"))?;
    anyhow::ensure!(signed.is_positive(), "SYNC_INTERVAL {raw:?} must be positive");
    Duration::try_from(signed).context("SYNC_INTERVAL")
}
