use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::domain::{AirportCode, Offer, TravelDate, YearMonth};
use crate::error::InvalidInput;
use crate::source::FlightSource;

/// Default number of days queried at once during a month scan.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 4;

/// Scans every day of a month and keeps the offers sharing the lowest price.
pub struct MonthlyAggregator {
    source: Arc<dyn FlightSource>,
    concurrency: usize,
}

impl MonthlyAggregator {
    /// `concurrency` bounds how many days are in flight at once; 1 scans the
    /// month strictly day by day.
    pub fn new(source: Arc<dyn FlightSource>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn find_cheapest(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        year_month: &str,
    ) -> Result<Vec<Offer>, InvalidInput> {
        let month = YearMonth::parse(year_month)?;
        Ok(self.scan(origin, destination, month).await)
    }

    /// Offers tying the month's minimum price, each tagged with its day.
    /// Days whose query fails are logged and skipped.
    pub async fn scan(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        month: YearMonth,
    ) -> Vec<Offer> {
        info!(
            "📅 Scanning {} days of {} for {} -> {}",
            month.days_in_month(),
            month,
            origin,
            destination
        );

        let source = &self.source;
        // `buffered` yields in submission order, so days stay ascending no
        // matter which query finishes first.
        let per_day: Vec<_> = stream::iter(month.days())
            .map(|day| async move {
                let date = TravelDate::from(day);
                let result = source.query(origin, destination, &date).await;
                (day, result)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut collected = Vec::new();
        let mut failed_days = 0usize;
        for (day, result) in per_day {
            match result {
                Ok(offers) if offers.is_empty() => debug!("No offers on {}", day),
                Ok(offers) => collected.extend(offers.iter().map(|offer| offer.tagged(day))),
                Err(e) => {
                    failed_days += 1;
                    warn!("⚠️  Skipping {} for {} -> {}: {}", day, origin, destination, e);
                }
            }
        }

        let seen = collected.len();
        let cheapest = cheapest_offers(collected);
        if cheapest.is_empty() {
            if seen == 0 {
                info!("No offers at all for {} ({} day(s) failed)", month, failed_days);
            } else {
                info!("{} offer(s) for {} but none with a usable price", seen, month);
            }
        } else {
            info!(
                "💰 {} offer(s) tie at the minimum for {} ({} seen, {} day(s) failed)",
                cheapest.len(),
                month,
                seen,
                failed_days
            );
        }
        cheapest
    }
}

/// Every priced offer whose price equals the minimum, in input order.
/// Unpriced offers never take part.
pub fn cheapest_offers(offers: impl IntoIterator<Item = Offer>) -> Vec<Offer> {
    let priced: Vec<(f64, Offer)> = offers
        .into_iter()
        .filter_map(|offer| offer.price.map(|price| (price, offer)))
        .collect();

    let Some(min_price) = priced.iter().map(|(price, _)| *price).reduce(f64::min) else {
        return Vec::new();
    };

    priced
        .into_iter()
        .filter(|(price, _)| *price == min_price)
        .map(|(_, offer)| offer)
        .collect()
}
