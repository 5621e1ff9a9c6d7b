pub mod aggregator;
pub mod alert;
pub mod bot;
pub mod command;
pub mod config;
pub mod domain;
pub mod error;
pub mod notifier;
pub mod render;
pub mod source;
pub mod threshold;
pub mod utils;
pub mod watcher;

use std::sync::Arc;

use bot::FareBot;
use config::AppConfig;
use notifier::{ConsoleNotifier, NotifierHub, TelegramNotifier};
use source::{DemoFlightSource, FlightSource, HttpFlightSource};
use threshold::ThresholdStore;
use utils::mask_url;
use watcher::FareWatch;

use anyhow::Result;
use tracing::{info, warn};

pub async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;

    let source: Arc<dyn FlightSource> = match &config.flight_api_url {
        Some(url) => {
            info!("🔌 Using flight API: {}", mask_url(url));
            Arc::new(HttpFlightSource::new(url.clone(), config.flight_api_timeout)?)
        }
        None => {
            warn!("⚠️  FLIGHT_API_URL not set - serving demo fares");
            Arc::new(DemoFlightSource)
        }
    };

    let thresholds = ThresholdStore::new(config.default_threshold);
    let bot = FareBot::new(source, thresholds, config.month_scan_concurrency);

    let console = ConsoleNotifier::new();
    let telegram = TelegramNotifier::maybe_from_config(&config);
    if telegram.is_some() {
        info!("📱 Telegram notifications enabled");
    } else {
        info!("📱 Telegram notifications disabled (no credentials)");
    }
    let notifier = NotifierHub::new(console, telegram.clone());

    let app = FareWatch::new(config, bot, notifier, telegram);
    app.run().await
}
