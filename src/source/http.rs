use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::FlightSource;
use crate::domain::{AirportCode, Offer, TravelDate};
use crate::error::SourceError;

/// Flight source backed by a JSON search endpoint.
///
/// Issues `GET {base_url}?origin=EZE&destination=BCN&date=2024-12-01` and
/// expects either a JSON array of offers or an object wrapping one under
/// `offers` or `data`.
#[derive(Debug, Clone)]
pub struct HttpFlightSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpFlightSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for flight source")?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl FlightSource for HttpFlightSource {
    async fn query(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        date: &TravelDate,
    ) -> Result<Vec<Offer>, SourceError> {
        debug!("Querying flights {} -> {} on {}", origin, destination, date);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("date", date.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        parse_offers(payload)
    }
}

/// Extracts offers from a provider payload. Entries that are not JSON objects
/// are skipped.
pub fn parse_offers(payload: Value) -> Result<Vec<Offer>, SourceError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut body) => match body.remove("offers").or_else(|| body.remove("data")) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(SourceError::Decode(
                    "'offers' is not an array".to_string(),
                ))
            }
        },
        Value::Null => Vec::new(),
        _ => {
            return Err(SourceError::Decode(
                "expected an array of offers".to_string(),
            ))
        }
    };

    let mut offers = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_object() {
            warn!("Skipping malformed offer entry: {}", item);
            continue;
        }
        let offer = serde_json::from_value::<Offer>(item)
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        offers.push(offer);
    }
    Ok(offers)
}
