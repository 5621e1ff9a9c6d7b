use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::InvalidInput;

/// Identity of a chat user. Telegram user ids fit in an `i64`.
pub type UserId = i64;

/// One priced flight as returned by a flight source.
///
/// `price` is `None` whenever the provider sent something that is not a usable
/// amount. Such offers are kept for display but never compared against a
/// threshold or a monthly minimum.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawOffer")]
pub struct Offer {
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub price: Option<f64>,
    pub departure_time: Option<String>,
    /// Only set on offers produced by a monthly scan.
    pub date: Option<NaiveDate>,
}

impl Offer {
    pub fn new(
        airline: impl Into<String>,
        flight_number: impl Into<String>,
        price: Option<f64>,
        departure_time: impl Into<String>,
    ) -> Self {
        Self {
            airline: Some(airline.into()),
            flight_number: Some(flight_number.into()),
            price: price.and_then(usable_price),
            departure_time: Some(departure_time.into()),
            date: None,
        }
    }

    /// Returns a copy of this offer tagged with the day it was found on.
    pub fn tagged(&self, date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..self.clone()
        }
    }
}

/// Wire shape of an offer. Every field is loosely typed because providers are
/// not trusted to send well-formed values.
#[derive(Debug, Deserialize)]
struct RawOffer {
    #[serde(default)]
    airline: Option<Value>,
    #[serde(default)]
    flight_number: Option<Value>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    departure_time: Option<Value>,
}

impl From<RawOffer> for Offer {
    fn from(raw: RawOffer) -> Self {
        Self {
            airline: raw.airline.as_ref().and_then(text_value),
            flight_number: raw.flight_number.as_ref().and_then(text_value),
            price: raw.price.as_ref().and_then(normalize_price),
            departure_time: raw.departure_time.as_ref().and_then(text_value),
            date: None,
        }
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Optional leading currency symbol, then digits with commas allowed only as
/// thousands separators, then an optional decimal part.
static PRICE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[$€£]?\s*(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?$").expect("valid regex")
});

/// Turns a provider price into a USD amount.
///
/// Numbers are taken as is. Strings may carry surrounding whitespace, a leading
/// currency symbol and thousands separators (`"$1,234.50"`). Anything else,
/// including decimal commas like `"€12,50"`, negative or non-finite values,
/// yields `None`; nothing is ever guessed or defaulted to zero.
pub fn normalize_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_price_text(s)?,
        _ => return None,
    };
    usable_price(price)
}

/// `-0.0` comes back as `0.0` so it never renders as `$-0.00`.
fn usable_price(price: f64) -> Option<f64> {
    (price.is_finite() && price >= 0.0).then_some(price.abs())
}

fn parse_price_text(raw: &str) -> Option<f64> {
    let caps = PRICE_TEXT.captures(raw.trim())?;
    let whole = caps.get(1)?.as_str().replace(',', "");
    let fraction = caps.get(2).map_or("", |m| m.as_str());
    format!("{whole}{fraction}").parse().ok()
}

/// IATA airport code, always three uppercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AirportCode(String);

impl AirportCode {
    pub fn parse(raw: &str) -> Result<Self, InvalidInput> {
        if raw.len() == 3 && raw.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(raw.to_ascii_uppercase()))
        } else {
            Err(InvalidInput::AirportCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `YYYY-MM-DD` shaped date. Only the shape is checked: `9999-99-99` is
/// accepted and left for the flight source to reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelDate(String);

impl TravelDate {
    pub fn parse(raw: &str) -> Result<Self, InvalidInput> {
        let well_shaped = raw.len() == 10
            && raw.chars().enumerate().all(|(i, c)| match i {
                4 | 7 => c == '-',
                _ => c.is_ascii_digit(),
            });
        if well_shaped {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidInput::Date(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Calendar date, if the string names a real day.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").ok()
    }
}

impl From<NaiveDate> for TravelDate {
    fn from(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }
}

impl fmt::Display for TravelDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A calendar month, e.g. `2024-02`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    /// True when `raw` is four digits, a hyphen and two digits.
    pub fn has_shape(raw: &str) -> bool {
        raw.len() == 7
            && raw.chars().enumerate().all(|(i, c)| match i {
                4 => c == '-',
                _ => c.is_ascii_digit(),
            })
    }

    pub fn parse(raw: &str) -> Result<Self, InvalidInput> {
        let invalid = || InvalidInput::YearMonth(raw.to_string());
        if !Self::has_shape(raw) {
            return Err(invalid());
        }
        let year: i32 = raw[..4].parse().map_err(|_| invalid())?;
        let month: u32 = raw[5..].parse().map_err(|_| invalid())?;
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        Ok(Self { first_day })
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// Every day of the month in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.first_day.month();
        self.first_day
            .iter_days()
            .take_while(move |day| day.month() == month)
    }

    pub fn days_in_month(&self) -> usize {
        self.days().count()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}
