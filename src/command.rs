use thiserror::Error;

use crate::domain::{AirportCode, TravelDate, YearMonth};
use crate::error::InvalidInput;

pub const SEARCH_USAGE: &str = "Usage: /search <OriginCode> <DestinationCode> <YYYY-MM-DD>";
pub const SEARCH_MONTH_USAGE: &str = "Usage: /searchmonth <OriginCode> <DestinationCode> <YYYY-MM>";
pub const SET_THRESHOLD_USAGE: &str = "Usage: /setthreshold <amount>\nExample: /setthreshold 250.75";

/// A chat message understood as a bot command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search {
        origin: AirportCode,
        destination: AirportCode,
        date: TravelDate,
    },
    /// `month` has the `YYYY-MM` shape; the month itself is checked by the
    /// aggregator.
    SearchMonth {
        origin: AirportCode,
        destination: AirportCode,
        month: String,
    },
    SetThreshold(f64),
    ShowThreshold,
    Help,
    Unknown(String),
    /// Plain text that is not a command.
    Chat,
}

/// A command with bad arguments, paired with the usage line to show.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid input: {cause}.\n{usage}")]
pub struct UsageError {
    pub cause: InvalidInput,
    pub usage: &'static str,
}

impl UsageError {
    pub fn new(cause: InvalidInput, usage: &'static str) -> Self {
        Self { cause, usage }
    }
}

impl Command {
    /// Parses `/name arg...`. A `@botname` suffix on the command word, as sent
    /// in Telegram group chats, is ignored.
    pub fn parse(text: &str) -> Result<Self, UsageError> {
        let mut words = text.split_whitespace();
        let Some(name) = words.next().and_then(|head| head.strip_prefix('/')) else {
            return Ok(Self::Chat);
        };
        let name = name.split('@').next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = words.collect();

        match name.as_str() {
            "search" => parse_search(&args),
            "searchmonth" => parse_search_month(&args),
            "setthreshold" => parse_set_threshold(&args),
            "threshold" => Ok(Self::ShowThreshold),
            "start" | "help" => Ok(Self::Help),
            _ => Ok(Self::Unknown(name)),
        }
    }
}

fn parse_route(
    origin: &str,
    destination: &str,
    usage: &'static str,
) -> Result<(AirportCode, AirportCode), UsageError> {
    let origin = AirportCode::parse(origin).map_err(|e| UsageError::new(e, usage))?;
    let destination = AirportCode::parse(destination).map_err(|e| UsageError::new(e, usage))?;
    Ok((origin, destination))
}

fn arity(args: &[&str], expected: usize, usage: &'static str) -> UsageError {
    UsageError::new(
        InvalidInput::Arity {
            expected,
            got: args.len(),
        },
        usage,
    )
}

fn parse_search(args: &[&str]) -> Result<Command, UsageError> {
    let [origin, destination, date] = args else {
        return Err(arity(args, 3, SEARCH_USAGE));
    };
    let (origin, destination) = parse_route(origin, destination, SEARCH_USAGE)?;
    let date = TravelDate::parse(date).map_err(|e| UsageError::new(e, SEARCH_USAGE))?;
    Ok(Command::Search {
        origin,
        destination,
        date,
    })
}

fn parse_search_month(args: &[&str]) -> Result<Command, UsageError> {
    let [origin, destination, month] = args else {
        return Err(arity(args, 3, SEARCH_MONTH_USAGE));
    };
    let (origin, destination) = parse_route(origin, destination, SEARCH_MONTH_USAGE)?;
    if !YearMonth::has_shape(month) {
        return Err(UsageError::new(
            InvalidInput::YearMonth(month.to_string()),
            SEARCH_MONTH_USAGE,
        ));
    }
    Ok(Command::SearchMonth {
        origin,
        destination,
        month: month.to_string(),
    })
}

fn parse_set_threshold(args: &[&str]) -> Result<Command, UsageError> {
    let [amount] = args else {
        return Err(arity(args, 1, SET_THRESHOLD_USAGE));
    };
    amount
        .parse::<f64>()
        .map(Command::SetThreshold)
        .map_err(|_| {
            UsageError::new(
                InvalidInput::Threshold(amount.to_string()),
                SET_THRESHOLD_USAGE,
            )
        })
}
