use chrono::NaiveDate;

use super::{clean_whitespace, decode_entities_once};
use crate::models::{ApplicationRecord, DateReceived};

/// Field values as located in a source document, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawApplication {
    pub council_reference: String,
    pub description: String,
    pub date_received: Option<String>,
    pub address: String,
    pub info_url: String,
}

/// Shared post-processing for both extractors. `today` is injected so the
/// stamp is deterministic under test.
pub fn normalize(raw: RawApplication, today: NaiveDate) -> ApplicationRecord {
    ApplicationRecord {
        council_reference: clean_whitespace(&raw.council_reference),
        description: clean_whitespace(&decode_entities_once(&raw.description)),
        date_received: DateReceived::parse(raw.date_received.as_deref()),
        address: clean_whitespace(&raw.address),
        date_scraped: today,
        info_url: raw.info_url,
    }
}

/// Detail page link: the search endpoint with the internal id and, when the
/// feed supplies one, the opaque `pprs` token.
pub fn info_url(search_url: &str, application_id: &str, pprs: Option<&str>) -> String {
    let mut url = format!("{}?id={}", search_url, application_id);
    if let Some(token) = pprs {
        url.push_str("&pprs=");
        url.push_str(token);
    }
    url
}
