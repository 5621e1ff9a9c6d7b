use async_trait::async_trait;
use chrono::Datelike;

use super::FlightSource;
use crate::domain::{AirportCode, Offer, TravelDate};
use crate::error::SourceError;

/// Canned fares for running the bot without a provider.
///
/// Every route gets the same four flights. Prices drift with the day of month
/// so that a monthly scan has a clear cheapest day (the 1st and the 31st).
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoFlightSource;

const SCHEDULE: [(&str, &str, f64, &str); 4] = [
    ("Fantasy Air", "FA101", 250.00, "10:00"),
    ("Dream Flights", "DF202", 280.50, "12:30"),
    ("Sky High", "SH303", 220.75, "15:00"),
    ("Fantasy Air", "FA105", 260.00, "18:00"),
];

fn day_surcharge(day: u32) -> f64 {
    f64::from((day - 1) * 7 % 30)
}

#[async_trait]
impl FlightSource for DemoFlightSource {
    async fn query(
        &self,
        _origin: &AirportCode,
        _destination: &AirportCode,
        date: &TravelDate,
    ) -> Result<Vec<Offer>, SourceError> {
        let day = date
            .calendar_date()
            .ok_or_else(|| SourceError::Unavailable(format!("{date} is not a calendar date")))?;
        let surcharge = day_surcharge(day.day());

        Ok(SCHEDULE
            .iter()
            .map(|(airline, flight, price, departs)| {
                Offer::new(*airline, *flight, Some(price + surcharge), *departs)
            })
            .collect())
    }
}
