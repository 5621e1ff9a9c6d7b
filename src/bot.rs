use std::sync::Arc;

use tracing::{error, info, warn};

use crate::aggregator::MonthlyAggregator;
use crate::alert::ThresholdFilter;
use crate::command::{Command, UsageError, SEARCH_MONTH_USAGE, SET_THRESHOLD_USAGE};
use crate::domain::{AirportCode, Offer, TravelDate, UserId};
use crate::error::SourceError;
use crate::render;
use crate::source::FlightSource;
use crate::threshold::ThresholdStore;

/// What a single-date search found. A failing source and an empty answer are
/// kept apart so users can tell "try again" from "nothing flies that day".
#[derive(Debug)]
pub enum SearchOutcome {
    SourceError(SourceError),
    NoResults,
    NoneBelow { total: usize },
    Cheap { qualifying: Vec<Offer>, total: usize },
}

/// Turns chat messages into replies.
pub struct FareBot {
    source: Arc<dyn FlightSource>,
    aggregator: MonthlyAggregator,
    thresholds: ThresholdStore,
}

impl FareBot {
    pub fn new(
        source: Arc<dyn FlightSource>,
        thresholds: ThresholdStore,
        scan_concurrency: usize,
    ) -> Self {
        let aggregator = MonthlyAggregator::new(Arc::clone(&source), scan_concurrency);
        Self {
            source,
            aggregator,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &ThresholdStore {
        &self.thresholds
    }

    /// Handles one message from `user` and returns the replies to send, in
    /// order. Invalid arguments are answered before any flight source call.
    pub async fn handle(&self, user: UserId, text: &str) -> Vec<String> {
        let command = match Command::parse(text) {
            Ok(command) => command,
            Err(e) => {
                warn!("Invalid command from user {}: {}", user, e.cause);
                return vec![e.to_string()];
            }
        };

        match command {
            Command::Search {
                origin,
                destination,
                date,
            } => {
                let threshold = self.thresholds.get(user);
                info!(
                    "🔎 User {} searching {} -> {} on {} (threshold ${:.2})",
                    user, origin, destination, date, threshold
                );
                let outcome = self.search(&origin, &destination, &date, threshold).await;
                render::search_reply(&origin, &destination, &date, threshold, &outcome)
            }
            Command::SearchMonth {
                origin,
                destination,
                month,
            } => {
                info!(
                    "📅 User {} scanning {} -> {} for {}",
                    user, origin, destination, month
                );
                match self
                    .aggregator
                    .find_cheapest(&origin, &destination, &month)
                    .await
                {
                    Ok(cheapest) => render::month_reply(&origin, &destination, &month, &cheapest),
                    Err(cause) => {
                        warn!("Invalid month from user {}: {}", user, cause);
                        vec![UsageError::new(cause, SEARCH_MONTH_USAGE).to_string()]
                    }
                }
            }
            Command::SetThreshold(amount) => match self.thresholds.set(user, amount) {
                Ok(threshold) => {
                    info!("User {} set price threshold to {:.2}", user, threshold);
                    vec![format!(
                        "Your price alert threshold has been updated to {}.",
                        render::usd(threshold)
                    )]
                }
                Err(cause) => {
                    warn!("User {} tried to set threshold {}", user, amount);
                    vec![UsageError::new(cause, SET_THRESHOLD_USAGE).to_string()]
                }
            },
            Command::ShowThreshold => vec![format!(
                "Your price alert threshold is {}.",
                render::usd(self.thresholds.get(user))
            )],
            Command::Help => vec![render::HELP_TEXT.to_string()],
            Command::Unknown(name) => {
                vec![format!("Unknown command /{name}.\n\n{}", render::HELP_TEXT)]
            }
            Command::Chat => vec![render::CHAT_HINT.to_string()],
        }
    }

    /// Queries the source once and checks the offers against `threshold`.
    pub async fn search(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        date: &TravelDate,
        threshold: f64,
    ) -> SearchOutcome {
        let offers = match self.source.query(origin, destination, date).await {
            Ok(offers) => offers,
            Err(e) => {
                error!(
                    "Error fetching flights {} -> {} on {}: {}",
                    origin, destination, date, e
                );
                return SearchOutcome::SourceError(e);
            }
        };

        if offers.is_empty() {
            info!("No flights found for {} -> {} on {}", origin, destination, date);
            return SearchOutcome::NoResults;
        }

        let partition = ThresholdFilter::new(threshold).partition(&offers);
        if partition.qualifying.is_empty() {
            SearchOutcome::NoneBelow {
                total: partition.total_count,
            }
        } else {
            info!(
                "💰 {} of {} flight(s) at or below ${:.2}",
                partition.qualifying.len(),
                partition.total_count,
                threshold
            );
            SearchOutcome::Cheap {
                qualifying: partition.qualifying,
                total: partition.total_count,
            }
        }
    }
}
