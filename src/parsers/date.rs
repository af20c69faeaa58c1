use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

use super::clean_whitespace;
use crate::models::DateReceived;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %I:%M:%S %p",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a calendar date out of the shapes the portals are known to emit.
/// Any time-of-day component is discarded.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = clean_whitespace(text);
    if text.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(&text) {
        return Some(datetime.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
        .map(|datetime| datetime.date())
        .or_else(|| parse_plain_date(&text))
        .or_else(|| {
            // "02/03/2020 10:15 AM" and friends
            let first = text.split(' ').next()?;
            (first.len() < text.len()).then(|| parse_plain_date(first)).flatten()
        })
}

fn parse_plain_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

impl DateReceived {
    /// Absent or unparseable text degrades to the sentinel instead of failing.
    pub fn parse(text: Option<&str>) -> Self {
        text.and_then(parse_date)
            .map(DateReceived::Date)
            .unwrap_or(DateReceived::NotAvailable)
    }
}

/// Today's date on the process clock, used to stamp `date_scraped`.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_feed_timestamps() {
        assert_eq!(parse_date("2020-03-02T00:00:00+11:00"), Some(ymd(2020, 3, 2)));
        assert_eq!(parse_date("2020-03-02T09:30:00"), Some(ymd(2020, 3, 2)));
        assert_eq!(parse_date("2020-03-02T09:30:00.123"), Some(ymd(2020, 3, 2)));
        assert_eq!(parse_date(" 2020-03-02 \n"), Some(ymd(2020, 3, 2)));
    }

    #[test]
    fn parses_day_first_dates() {
        assert_eq!(parse_date("02/03/2020"), Some(ymd(2020, 3, 2)));
        assert_eq!(parse_date("2 March 2020"), Some(ymd(2020, 3, 2)));
        assert_eq!(parse_date("02 Mar 2020"), Some(ymd(2020, 3, 2)));
        assert_eq!(parse_date("02/03/2020 10:15 AM"), Some(ymd(2020, 3, 2)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date("Lodged"), None);
        assert_eq!(parse_date("31/02/2020"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn date_received_falls_back_to_sentinel() {
        assert_eq!(DateReceived::parse(Some("not a date")), DateReceived::NotAvailable);
        assert_eq!(DateReceived::parse(None), DateReceived::NotAvailable);
        assert_eq!(
            DateReceived::parse(Some("2019-12-24")),
            DateReceived::Date(ymd(2019, 12, 24))
        );
    }
}
