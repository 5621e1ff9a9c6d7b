//! Flight data sources.
//!
//! A source answers "which offers exist for this route on this day". Finding no
//! flights is a successful empty answer; only transport, provider and decoding
//! problems are errors.

mod demo;
mod http;

pub use demo::DemoFlightSource;
pub use http::{parse_offers, HttpFlightSource};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{AirportCode, Offer, TravelDate};
use crate::error::SourceError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait FlightSource: Send + Sync {
    /// Offers for `origin` to `destination` departing on `date`.
    async fn query(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        date: &TravelDate,
    ) -> Result<Vec<Offer>, SourceError>;
}
