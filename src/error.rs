use thiserror::Error;

/// Malformed user-supplied arguments. Always reported back to the user together
/// with a usage hint; never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInput {
    #[error("expected {expected} argument(s), got {got}")]
    Arity { expected: usize, got: usize },

    #[error("'{0}' is not a 3-letter airport code")]
    AirportCode(String),

    #[error("'{0}' is not a date in YYYY-MM-DD format")]
    Date(String),

    #[error("'{0}' is not a month in YYYY-MM format")]
    YearMonth(String),

    #[error("'{0}' is not a positive amount")]
    Threshold(String),
}

/// Failure of a flight data source for a single query.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network or client-side failure talking to the provider.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be turned into offers.
    #[error("could not decode offers: {0}")]
    Decode(String),

    /// The provider has no data for the requested route or date.
    #[error("no schedule available: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::{InvalidInput, SourceError};

    #[test]
    fn invalid_input_messages_name_the_offending_value() {
        assert_eq!(
            InvalidInput::AirportCode("EZ".into()).to_string(),
            "'EZ' is not a 3-letter airport code"
        );
        assert_eq!(
            InvalidInput::Arity { expected: 3, got: 1 }.to_string(),
            "expected 3 argument(s), got 1"
        );
        assert_eq!(
            InvalidInput::Threshold("-5".into()).to_string(),
            "'-5' is not a positive amount"
        );
    }

    #[test]
    fn source_error_status_includes_body() {
        let err = SourceError::Status {
            status: 503,
            body: "Service Unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "provider returned status 503: Service Unavailable"
        );
    }
}
