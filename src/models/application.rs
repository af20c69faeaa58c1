use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

use super::NOT_AVAILABLE;
use crate::parsers::clean_whitespace;

/// Lodgement date of an application, or the sentinel when the source text
/// was missing or unparseable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateReceived {
    Date(NaiveDate),
    NotAvailable,
}

impl DateReceived {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DateReceived::Date(date) => Some(*date),
            DateReceived::NotAvailable => None,
        }
    }
}

impl fmt::Display for DateReceived {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_date() {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            None => write!(f, "{}", NOT_AVAILABLE),
        }
    }
}

impl Serialize for DateReceived {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The canonical record handed to the sink, one per application node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationRecord {
    pub council_reference: String,
    pub description: String,
    pub date_received: DateReceived,
    pub address: String,
    pub date_scraped: NaiveDate,
    pub info_url: String,
}

/// Up to three address fragments, each already whitespace-cleaned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressLines {
    pub line1: String,
    pub line2: Option<String>,
    pub line3: Option<String>,
}

impl AddressLines {
    /// Returns `None` when the first line is blank after cleaning.
    pub fn new(line1: &str, line2: Option<&str>, line3: Option<&str>) -> Option<Self> {
        let line1 = clean_whitespace(line1);
        if line1.is_empty() {
            return None;
        }

        let optional = |line: Option<&str>| {
            line.map(clean_whitespace).filter(|l| !l.is_empty())
        };

        Some(Self {
            line1,
            line2: optional(line2),
            line3: optional(line3),
        })
    }

    pub fn joined(&self) -> String {
        [Some(&self.line1), self.line2.as_ref(), self.line3.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn joins_all_three_lines() {
        let lines = AddressLines::new("1 Smith St", Some("PENRITH"), Some("NSW 2750")).unwrap();
        assert_eq!(lines.joined(), "1 Smith St, PENRITH, NSW 2750");
    }

    #[test]
    fn drops_blank_trailing_lines() {
        let lines = AddressLines::new(" 1 Smith St ", Some("  "), Some("\r\n")).unwrap();
        assert_eq!(lines.line2, None);
        assert_eq!(lines.joined(), "1 Smith St");
    }

    #[test]
    fn blank_first_line_is_no_address() {
        assert_eq!(AddressLines::new(" \n ", Some("PENRITH"), None), None);
    }

    #[test]
    fn date_received_displays_sentinel() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 2).unwrap();
        assert_eq!(DateReceived::Date(date).to_string(), "2020-03-02");
        assert_eq!(DateReceived::NotAvailable.to_string(), "N/A");
        assert_eq!(DateReceived::NotAvailable.as_date(), None);
    }
}
