use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::{AuthorityConfig, Settings};
use crate::error::{ScrapeError, SkipReason};
use crate::models::ApplicationRecord;
use crate::session::Session;
use crate::storage::RecordSink;
use crate::utils::http::create_client;

mod html_listing;
mod xml_feed;

pub use html_listing::HtmlListingScraper;
pub use xml_feed::XmlFeedScraper;

/// Outcome of extracting one application node.
pub type Extraction = Result<ApplicationRecord, SkipReason>;

#[async_trait]
pub trait ApplicationScraper: Send + Sync {
    async fn scrape(
        &self,
        session: &mut Session,
        sink: &dyn RecordSink,
        today: NaiveDate,
    ) -> Result<ScrapeSummary, ScrapeError>;
    fn authority(&self) -> &AuthorityConfig;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub stored: usize,
    pub skipped: usize,
}

impl ScrapeSummary {
    /// Hand a record to the sink, or log why the node was skipped.
    pub fn absorb(&mut self, extraction: Extraction, sink: &dyn RecordSink) -> Result<(), ScrapeError> {
        match extraction {
            Ok(record) => {
                sink.save(&record)?;
                self.stored += 1;
            }
            Err(reason) => {
                warn!("{}. So, skipping", reason);
                self.skipped += 1;
            }
        }
        Ok(())
    }
}

pub fn scraper_for(authority: &AuthorityConfig) -> Box<dyn ApplicationScraper> {
    if authority.use_html_scraper {
        Box::new(HtmlListingScraper::new(authority.clone()))
    } else {
        Box::new(XmlFeedScraper::new(authority.clone()))
    }
}

/// Full run for one authority: session set-up, extraction and storage.
pub async fn scrape_authority(
    settings: &Settings,
    authority: &AuthorityConfig,
    sink: &dyn RecordSink,
    today: NaiveDate,
) -> Result<ScrapeSummary, ScrapeError> {
    let client = create_client(settings, authority)?;
    let mut session = Session::new(client);

    // Landing page first, so a terms page is accepted before the data query
    session.fetch(&authority.search_url()).await?;

    let scraper = scraper_for(authority);
    let summary = scraper.scrape(&mut session, sink, today).await?;
    info!(
        "Stored {} applications for {} ({} skipped)",
        summary.stored,
        scraper.authority().key,
        summary.skipped
    );
    Ok(summary)
}
