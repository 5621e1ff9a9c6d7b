//! User-facing reply text.

use crate::bot::SearchOutcome;
use crate::domain::{AirportCode, Offer, TravelDate};

/// Month scans can tie on dozens of flights; only this many are listed.
pub const MONTH_DISPLAY_LIMIT: usize = 30;

pub const HELP_TEXT: &str = "I watch for cheap flights.\n\n\
/search <Origin> <Destination> <YYYY-MM-DD> - flights below your threshold on a day\n\
/searchmonth <Origin> <Destination> <YYYY-MM> - cheapest fares across a month\n\
/setthreshold <amount> - set your price alert threshold in USD\n\
/threshold - show your current threshold";

pub const CHAT_HINT: &str =
    "I'm a simple flight bot. Please use /search <Origin> <Destination> <YYYY-MM-DD> to find flights.";

pub fn usd(amount: f64) -> String {
    format!("${amount:.2}")
}

fn or_na(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("N/A")
}

/// One flight as a multi-line block. Records are separated by blank lines so
/// the notifier can split long replies between them.
pub fn offer_record(offer: &Offer) -> String {
    let price = offer.price.map(usd).unwrap_or_else(|| "N/A".to_string());
    let mut record = format!(
        "✈️ Airline: {}\n   Flight: {}\n   Price: {}\n   Departs: {}",
        or_na(&offer.airline),
        or_na(&offer.flight_number),
        price,
        or_na(&offer.departure_time),
    );
    if let Some(date) = offer.date {
        record.push_str(&format!("\n   Date: {}", date.format("%Y-%m-%d")));
    }
    record
}

fn records<'a>(offers: impl IntoIterator<Item = &'a Offer>) -> String {
    offers
        .into_iter()
        .map(offer_record)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn search_reply(
    origin: &AirportCode,
    destination: &AirportCode,
    date: &TravelDate,
    threshold: f64,
    outcome: &SearchOutcome,
) -> Vec<String> {
    match outcome {
        SearchOutcome::SourceError(_) => vec![format!(
            "Error fetching flight data for {origin} to {destination} on {date}."
        )],
        SearchOutcome::NoResults => vec![format!(
            "No flights found for {origin} to {destination} on {date}."
        )],
        SearchOutcome::NoneBelow { total } => vec![format!(
            "Found {total} flights, but none below your threshold of {} for {origin} to {destination} on {date}.",
            usd(threshold)
        )],
        SearchOutcome::Cheap { qualifying, .. } => vec![
            format!(
                "ALERT! Found {} cheap flight(s) (below {}) for {origin} to {destination} on {date}:",
                qualifying.len(),
                usd(threshold)
            ),
            records(qualifying),
        ],
    }
}

pub fn month_reply(
    origin: &AirportCode,
    destination: &AirportCode,
    month: &str,
    cheapest: &[Offer],
) -> Vec<String> {
    let Some(min_price) = cheapest.first().and_then(|offer| offer.price) else {
        return vec![format!(
            "No flights with a usable price found for {origin} to {destination} in {month}."
        )];
    };

    let mut body = records(cheapest.iter().take(MONTH_DISPLAY_LIMIT));
    if cheapest.len() > MONTH_DISPLAY_LIMIT {
        body.push_str(&format!(
            "\n\n...and {} more at the same price.",
            cheapest.len() - MONTH_DISPLAY_LIMIT
        ));
    }

    vec![
        format!(
            "Cheapest fare for {origin} to {destination} in {month}: {} ({} flight(s)).",
            usd(min_price),
            cheapest.len()
        ),
        body,
    ]
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::error::SourceError;

    fn route() -> (AirportCode, AirportCode, TravelDate) {
        (
            AirportCode::parse("EZE").unwrap(),
            AirportCode::parse("BCN").unwrap(),
            TravelDate::parse("2024-12-01").unwrap(),
        )
    }

    #[test]
    fn record_lists_every_field() {
        let offer = Offer::new("Fantasy Air", "FA101", Some(250.0), "10:00");
        assert_eq!(
            offer_record(&offer),
            "✈️ Airline: Fantasy Air\n   Flight: FA101\n   Price: $250.00\n   Departs: 10:00"
        );
    }

    #[test]
    fn record_never_shows_missing_price_as_zero() {
        let record = offer_record(&Offer::default());
        assert!(record.contains("Price: N/A"));
        assert!(!record.contains("$0.00"));
        assert!(record.contains("Airline: N/A"));
    }

    #[test]
    fn record_includes_scan_date() {
        let offer = Offer::new("Sky High", "SH303", Some(99.0), "15:00")
            .tagged(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert!(offer_record(&offer).ends_with("\n   Date: 2024-01-03"));
    }

    #[test]
    fn source_error_and_no_results_read_differently() {
        let (o, d, date) = route();
        let error = search_reply(
            &o,
            &d,
            &date,
            300.0,
            &SearchOutcome::SourceError(SourceError::Decode("x".into())),
        );
        let empty = search_reply(&o, &d, &date, 300.0, &SearchOutcome::NoResults);

        assert_eq!(
            error,
            vec!["Error fetching flight data for EZE to BCN on 2024-12-01.".to_string()]
        );
        assert_eq!(
            empty,
            vec!["No flights found for EZE to BCN on 2024-12-01.".to_string()]
        );
    }

    #[test]
    fn none_below_mentions_threshold_and_total() {
        let (o, d, date) = route();
        let reply = search_reply(&o, &d, &date, 199.99, &SearchOutcome::NoneBelow { total: 4 });
        assert_eq!(
            reply,
            vec![
                "Found 4 flights, but none below your threshold of $199.99 for EZE to BCN on 2024-12-01."
                    .to_string()
            ]
        );
    }

    #[test]
    fn cheap_reply_has_header_then_records() {
        let (o, d, date) = route();
        let qualifying = vec![
            Offer::new("Fantasy Air", "FA101", Some(250.0), "10:00"),
            Offer::new("Sky High", "SH303", Some(220.75), "15:00"),
        ];
        let reply = search_reply(
            &o,
            &d,
            &date,
            300.0,
            &SearchOutcome::Cheap {
                qualifying,
                total: 4,
            },
        );

        assert_eq!(reply.len(), 2);
        assert_eq!(
            reply[0],
            "ALERT! Found 2 cheap flight(s) (below $300.00) for EZE to BCN on 2024-12-01:"
        );
        let fa = reply[1].find("FA101").unwrap();
        let sh = reply[1].find("SH303").unwrap();
        assert!(fa < sh);
        assert!(reply[1].contains("\n\n"));
    }

    #[test]
    fn empty_month_reply() {
        let (o, d, _) = route();
        assert_eq!(
            month_reply(&o, &d, "2024-01", &[]),
            vec!["No flights with a usable price found for EZE to BCN in 2024-01.".to_string()]
        );
    }

    #[test]
    fn month_reply_caps_listed_records() {
        let (o, d, _) = route();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let cheapest: Vec<Offer> = (0..35)
            .map(|i| Offer::new("Sky High", format!("SH{i:03}"), Some(99.0), "15:00").tagged(day))
            .collect();

        let reply = month_reply(&o, &d, "2024-01", &cheapest);

        assert_eq!(
            reply[0],
            "Cheapest fare for EZE to BCN in 2024-01: $99.00 (35 flight(s))."
        );
        assert_eq!(reply[1].matches("✈️").count(), MONTH_DISPLAY_LIMIT);
        assert!(reply[1].contains("SH029"));
        assert!(!reply[1].contains("SH030"));
        assert!(reply[1].ends_with("...and 5 more at the same price."));
    }
}
