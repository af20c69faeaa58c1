use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::html::Select;
use scraper::{ElementRef, Html, Selector};
use std::iter::Enumerate;
use tracing::info;
use url::Url;

use super::{ApplicationScraper, ScrapeSummary};
use crate::config::{AuthorityConfig, FeedFormat};
use crate::error::ScrapeError;
use crate::models::ApplicationRecord;
use crate::parsers::{normalize, RawApplication};
use crate::session::Session;
use crate::storage::RecordSink;

// Positions inside the first <div> of a result block, counted in lines of
// its serialized HTML. Only valid for the Northern Beaches listing.
const DESCRIPTION_LINE: usize = 3;
const DATE_LINE: usize = 9;
const LINE_BREAK: &str = "<br>";

/// Scraper for the listing page of an authority whose XML feed is unusable.
/// First page only.
pub struct HtmlListingScraper {
    authority: AuthorityConfig,
}

impl HtmlListingScraper {
    pub fn new(authority: AuthorityConfig) -> Self {
        Self { authority }
    }
}

#[async_trait]
impl ApplicationScraper for HtmlListingScraper {
    async fn scrape(
        &self,
        session: &mut Session,
        sink: &dyn RecordSink,
        today: NaiveDate,
    ) -> Result<ScrapeSummary, ScrapeError> {
        let query_url = self.authority.query_url(FeedFormat::Html)?;
        info!("Fetching result listing for {}", self.authority.key);

        let body = session.fetch(&query_url).await?;
        store_listing(&body, &self.authority.search_url(), today, sink)
    }

    fn authority(&self) -> &AuthorityConfig {
        &self.authority
    }
}

pub struct ListingSelectors {
    result: Selector,
    anchor: Selector,
    strong: Selector,
    container: Selector,
}

impl ListingSelectors {
    pub fn new() -> Result<Self, ScrapeError> {
        let parse = |css: &'static str| Selector::parse(css).map_err(|_| ScrapeError::Selector(css));
        Ok(Self {
            result: parse(".result")?,
            anchor: parse("a")?,
            strong: parse("strong")?,
            container: parse("div")?,
        })
    }
}

/// `scraper::Html` is not `Send`, so the whole parse-and-store pass stays in
/// this synchronous function.
pub fn store_listing(
    body: &str,
    search_url: &str,
    today: NaiveDate,
    sink: &dyn RecordSink,
) -> Result<ScrapeSummary, ScrapeError> {
    let document = Html::parse_document(body);
    let selectors = ListingSelectors::new()?;
    let base = Url::parse(search_url)?;

    let mut summary = ScrapeSummary::default();
    for record in extract_records(&document, &selectors, &base, today) {
        summary.absorb(Ok(record?), sink)?;
    }
    Ok(summary)
}

pub struct HtmlRecords<'a> {
    blocks: Enumerate<Select<'a, 'a>>,
    selectors: &'a ListingSelectors,
    base: &'a Url,
    today: NaiveDate,
}

pub fn extract_records<'a>(
    document: &'a Html,
    selectors: &'a ListingSelectors,
    base: &'a Url,
    today: NaiveDate,
) -> HtmlRecords<'a> {
    HtmlRecords {
        blocks: document.select(&selectors.result).enumerate(),
        selectors,
        base,
        today,
    }
}

impl<'a> Iterator for HtmlRecords<'a> {
    type Item = Result<ApplicationRecord, ScrapeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, block) = self.blocks.next()?;
        Some(extract_block(block, index, self.selectors, self.base, self.today))
    }
}

fn extract_block(
    block: ElementRef<'_>,
    index: usize,
    selectors: &ListingSelectors,
    base: &Url,
    today: NaiveDate,
) -> Result<ApplicationRecord, ScrapeError> {
    let first = |selector: &Selector, element: &'static str| {
        block
            .select(selector)
            .next()
            .ok_or(ScrapeError::MissingElement { index, element })
    };

    let layout = |detail: String| ScrapeError::UnexpectedLayout { index, detail };

    let anchor = first(&selectors.anchor, "a")?;
    let href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| layout("link without href".to_string()))?;
    let info_url = base.join(href)?.to_string();
    let council_reference = anchor.text().collect::<String>();

    let address = first(&selectors.strong, "strong")?.text().collect::<String>();

    let container = first(&selectors.container, "div")?.html();
    let lines: Vec<&str> = container.split('\n').collect();

    let description = lines
        .get(DESCRIPTION_LINE)
        .and_then(|line| line.trim().split(LINE_BREAK).nth(1))
        .ok_or_else(|| layout(format!("no description at line {}", DESCRIPTION_LINE)))?;

    let date_received = lines
        .get(DATE_LINE)
        .and_then(|line| line.trim().split(LINE_BREAK).next())
        .ok_or_else(|| layout(format!("no lodgement date at line {}", DATE_LINE)))?;

    let raw = RawApplication {
        council_reference,
        description: strip_topic(description).to_string(),
        date_received: Some(date_received.to_string()),
        address,
        info_url,
    };

    let record = normalize(raw, today);
    for (field, value) in [
        ("council reference", &record.council_reference),
        ("address", &record.address),
        ("description", &record.description),
    ] {
        if value.is_empty() {
            return Err(layout(format!("empty {}", field)));
        }
    }
    Ok(record)
}

/// "Alterations - Alterations and additions" -> "Alterations and additions"
fn strip_topic(description: &str) -> &str {
    match description.split_once('-') {
        Some((_, rest)) => rest.trim(),
        None => description,
    }
}
