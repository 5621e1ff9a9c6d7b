use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::warn;

use crate::aggregator::DEFAULT_SCAN_CONCURRENCY;
use crate::threshold::DEFAULT_PRICE_THRESHOLD;

const DEFAULT_API_TIMEOUT_SECS: u64 = 20;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const MAX_SCAN_CONCURRENCY: usize = 31;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: Option<String>,
    pub flight_api_url: Option<String>,
    pub flight_api_timeout: Duration,
    pub default_threshold: f64,
    pub month_scan_concurrency: usize,
    pub telegram_poll_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            flight_api_url: None,
            flight_api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            default_threshold: DEFAULT_PRICE_THRESHOLD,
            month_scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            telegram_poll_timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let flight_api_url = non_empty("FLIGHT_API_URL");
        if let Some(url) = &flight_api_url {
            reqwest::Url::parse(url)
                .map_err(|e| anyhow!("FLIGHT_API_URL is not a valid URL: {e}"))?;
        }

        Ok(Self {
            telegram_bot_token: non_empty("TELEGRAM_BOT_TOKEN"),
            flight_api_url,
            flight_api_timeout: Duration::from_secs(parse_secs(
                "FLIGHT_API_TIMEOUT_SECS",
                non_empty("FLIGHT_API_TIMEOUT_SECS").as_deref(),
                DEFAULT_API_TIMEOUT_SECS,
            )),
            default_threshold: parse_default_threshold(non_empty("DEFAULT_PRICE_THRESHOLD").as_deref()),
            month_scan_concurrency: parse_concurrency(non_empty("MONTH_SCAN_CONCURRENCY").as_deref()),
            telegram_poll_timeout: Duration::from_secs(parse_secs(
                "TELEGRAM_POLL_TIMEOUT_SECS",
                non_empty("TELEGRAM_POLL_TIMEOUT_SECS").as_deref(),
                DEFAULT_POLL_TIMEOUT_SECS,
            )),
        })
    }
}

/// Falls back to the built-in default for missing, unparsable or non-positive
/// values.
pub fn parse_default_threshold(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_PRICE_THRESHOLD;
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => {
            warn!(
                "⚠️  DEFAULT_PRICE_THRESHOLD '{}' is not a positive number, using {:.2}",
                raw, DEFAULT_PRICE_THRESHOLD
            );
            DEFAULT_PRICE_THRESHOLD
        }
    }
}

pub fn parse_concurrency(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_SCAN_CONCURRENCY)
        .clamp(1, MAX_SCAN_CONCURRENCY)
}

fn parse_secs(key: &str, raw: Option<&str>, default: u64) -> u64 {
    match raw.map(str::parse::<u64>) {
        None => default,
        Some(Ok(secs)) if secs > 0 => secs,
        Some(_) => {
            warn!("⚠️  {} must be a positive number of seconds, using {}", key, default);
            default
        }
    }
}
