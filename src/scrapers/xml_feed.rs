use async_trait::async_trait;
use chrono::NaiveDate;
use roxmltree::{Descendants, Document, Node};
use tracing::info;

use super::{ApplicationScraper, Extraction, ScrapeSummary};
use crate::config::{AuthorityConfig, FeedFormat};
use crate::error::{ScrapeError, SkipReason};
use crate::parsers::{
    descendant_text, info_url, normalize, resolve, RawApplication, ADDRESS_STRATEGIES,
    DESCRIPTION_STRATEGIES,
};
use crate::session::Session;
use crate::storage::RecordSink;

const DATA_SET: &str = "NewDataSet";
const APPLICATION: &str = "Application";

/// Scraper for authorities whose search endpoint serves the `o=xml` feed.
pub struct XmlFeedScraper {
    authority: AuthorityConfig,
}

impl XmlFeedScraper {
    pub fn new(authority: AuthorityConfig) -> Self {
        Self { authority }
    }
}

#[async_trait]
impl ApplicationScraper for XmlFeedScraper {
    async fn scrape(
        &self,
        session: &mut Session,
        sink: &dyn RecordSink,
        today: NaiveDate,
    ) -> Result<ScrapeSummary, ScrapeError> {
        let query_url = self.authority.query_url(FeedFormat::Xml)?;
        info!("Fetching XML feed for {}", self.authority.key);

        let body = session.fetch(&query_url).await?;
        store_feed(&body, &self.authority.search_url(), today, sink)
    }

    fn authority(&self) -> &AuthorityConfig {
        &self.authority
    }
}

/// Parse a feed body and push every record into `sink`. Parsing and walking
/// happen synchronously, after the fetch.
pub fn store_feed(
    body: &str,
    search_url: &str,
    today: NaiveDate,
    sink: &dyn RecordSink,
) -> Result<ScrapeSummary, ScrapeError> {
    let document = Document::parse(body.trim_start_matches('\u{feff}'))?;
    let mut summary = ScrapeSummary::default();
    for extraction in extract_records(&document, search_url, today)? {
        summary.absorb(extraction, sink)?;
    }
    Ok(summary)
}

/// Lazily yields one extraction per `<Application>`, in document order.
pub struct XmlRecords<'a, 'input: 'a> {
    applications: Descendants<'a, 'input>,
    search_url: &'a str,
    today: NaiveDate,
}

/// Fails only when the `<NewDataSet>` container is missing, which means the
/// feed itself has the wrong shape.
pub fn extract_records<'a, 'input>(
    document: &'a Document<'input>,
    search_url: &'a str,
    today: NaiveDate,
) -> Result<XmlRecords<'a, 'input>, ScrapeError> {
    let data_set = document
        .descendants()
        .find(|n| n.has_tag_name(DATA_SET))
        .ok_or(ScrapeError::MissingDataSet(DATA_SET))?;

    Ok(XmlRecords {
        applications: data_set.descendants(),
        search_url,
        today,
    })
}

impl<'a, 'input> Iterator for XmlRecords<'a, 'input> {
    type Item = Extraction;

    fn next(&mut self) -> Option<Self::Item> {
        let application = self.applications.find(|n| n.has_tag_name(APPLICATION))?;
        Some(extract_application(application, self.search_url, self.today))
    }
}

fn required_id(application: Node<'_, '_>, name: &'static str) -> Result<String, SkipReason> {
    descendant_text(application, name)
        .map(|text| text.trim().to_string())
        .ok_or(SkipReason::MissingIdentifier(name))
}

fn extract_application(application: Node<'_, '_>, search_url: &str, today: NaiveDate) -> Extraction {
    let council_reference = required_id(application, "ReferenceNumber")?;
    let application_id = required_id(application, "ApplicationId")?;

    let address = resolve(application, ADDRESS_STRATEGIES).ok_or_else(|| SkipReason::NoAddress {
        reference: council_reference.clone(),
    })?;

    // Opaque, but the detail page needs it
    let pprs = descendant_text(application, "ThePPRS").map(|text| text.trim().to_string());

    let description = resolve(application, DESCRIPTION_STRATEGIES).ok_or_else(|| {
        SkipReason::NoDescription {
            reference: council_reference.clone(),
        }
    })?;

    let raw = RawApplication {
        council_reference,
        description,
        date_received: descendant_text(application, "LodgementDate"),
        address: address.joined(),
        info_url: info_url(search_url, &application_id, pprs.as_deref()),
    };

    Ok(normalize(raw, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Period, Settings};
    use crate::models::{ApplicationRecord, DateReceived};
    use crate::storage::memory::MemorySink;
    use crate::utils::http::create_client;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEARCH_URL: &str = "https://datracker.example.gov.au/Pages/XC.Track/SearchApplication.aspx";

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<NewDataSet>
  <Application>
    <ApplicationId>1001</ApplicationId>
    <ReferenceNumber> DA/1/2020 </ReferenceNumber>
    <LodgementDate>2020-03-02T00:00:00+11:00</LodgementDate>
    <ApplicationDetails>Demolition &amp;amp; new dwelling</ApplicationDetails>
    <Address>
      <Line1>12 Castlereagh
      Street</Line1>
      <Line2>PENRITH</Line2>
      <Line3>NSW 2750</Line3>
    </Address>
    <ThePPRS>X9Z</ThePPRS>
  </Application>
  <Application>
    <ApplicationId>1002</ApplicationId>
    <ReferenceNumber>DA/2/2020</ReferenceNumber>
    <LodgementDate>sometime soon</LodgementDate>
    <SubNatureOfApplication>Swimming pool</SubNatureOfApplication>
    <Property>
      <ApplicationId>1002</ApplicationId>
      <Line1>4 River Rd</Line1>
    </Property>
  </Application>
  <Application>
    <ApplicationId>1003</ApplicationId>
    <ReferenceNumber>DA/3/2020</ReferenceNumber>
    <LodgementDate>2020-03-04T00:00:00</LodgementDate>
    <ApplicationDetails>Shed</ApplicationDetails>
  </Application>
  <Application>
    <ApplicationId>1004</ApplicationId>
    <ReferenceNumber>DA/4/2020</ReferenceNumber>
    <LodgementDate>2020-03-05T00:00:00</LodgementDate>
    <ApplicationDetails>Subdivision</ApplicationDetails>
    <Assess><Description>Lot 7 DP 1000 | 9 Hill St Some Town NSW 2753 | R2</Description></Assess>
  </Application>
  <Application>
    <ApplicationId>1005</ApplicationId>
    <ReferenceNumber>DA/5/2020</ReferenceNumber>
    <Address><Line1>1 Lonely Lane</Line1></Address>
  </Application>
</NewDataSet>"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn extract(xml: &str) -> Result<Vec<Extraction>, ScrapeError> {
        let document = Document::parse(xml)?;
        let records = extract_records(&document, SEARCH_URL, today())?;
        Ok(records.collect())
    }

    #[test]
    fn extracts_records_in_document_order() {
        let extractions = extract(FEED).unwrap();
        let references: Vec<String> = extractions
            .iter()
            .map(|e| match e {
                Ok(record) => record.council_reference.clone(),
                Err(reason) => format!("skip: {}", reason),
            })
            .collect();

        assert_eq!(
            references,
            vec![
                "DA/1/2020",
                "DA/2/2020",
                "skip: No address found for DA/3/2020",
                "DA/4/2020",
                "skip: Lack of description for DA/5/2020",
            ]
        );
    }

    #[test]
    fn builds_complete_record() {
        let extractions = extract(FEED).unwrap();
        assert_eq!(
            extractions[0],
            Ok(ApplicationRecord {
                council_reference: "DA/1/2020".to_string(),
                description: "Demolition & new dwelling".to_string(),
                date_received: DateReceived::Date(NaiveDate::from_ymd_opt(2020, 3, 2).unwrap()),
                address: "12 Castlereagh Street, PENRITH, NSW 2750".to_string(),
                date_scraped: today(),
                info_url: format!("{}?id=1001&pprs=X9Z", SEARCH_URL),
            })
        );
    }

    #[test]
    fn unparseable_date_still_emits_record() {
        let record = extract(FEED).unwrap().remove(1).unwrap();
        assert_eq!(record.date_received, DateReceived::NotAvailable);
        assert_eq!(record.description, "Swimming pool");
        assert_eq!(record.address, "4 River Rd");
        assert_eq!(record.info_url, format!("{}?id=1002", SEARCH_URL));
    }

    #[test]
    fn postcode_fallback_supplies_address() {
        let record = extract(FEED).unwrap().remove(3).unwrap();
        assert_eq!(record.address, "9 Hill St Some Town NSW 2753");
    }

    #[test]
    fn well_formed_feed_yields_one_record_per_application() {
        let xml = r#"<NewDataSet>
            <Application><ApplicationId>1</ApplicationId><ReferenceNumber>A</ReferenceNumber>
              <LodgementDate>2021-01-01</LodgementDate><ApplicationDetails>One</ApplicationDetails>
              <Address><Line1>1 A St</Line1></Address></Application>
            <Application><ApplicationId>2</ApplicationId><ReferenceNumber>B</ReferenceNumber>
              <LodgementDate>2021-01-02</LodgementDate><ApplicationDetails>Two</ApplicationDetails>
              <Address><Line1>2 B St</Line1></Address></Application>
        </NewDataSet>"#;

        let records: Vec<ApplicationRecord> = extract(xml)
            .unwrap()
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        for record in &records {
            assert!(record.date_received.as_date().is_some());
            assert!(!record.address.is_empty());
            assert!(!record.description.is_empty());
        }
    }

    #[test]
    fn missing_identifier_is_skipped() {
        let xml = r#"<NewDataSet><Application><ApplicationId>1</ApplicationId></Application></NewDataSet>"#;
        assert_eq!(
            extract(xml).unwrap(),
            vec![Err(SkipReason::MissingIdentifier("ReferenceNumber"))]
        );
    }

    #[test]
    fn missing_data_set_is_fatal() {
        let err = extract("<Applications><Application/></Applications>").unwrap_err();
        assert!(matches!(err, ScrapeError::MissingDataSet("NewDataSet")));

        let sink = MemorySink::default();
        assert!(store_feed("<Other/>", SEARCH_URL, today(), &sink).is_err());
        assert!(sink.records().is_empty());
    }

    #[test]
    fn store_feed_counts_skips() {
        let sink = MemorySink::default();
        let summary = store_feed(FEED, SEARCH_URL, today(), &sink).unwrap();

        assert_eq!(summary, ScrapeSummary { stored: 3, skipped: 2 });
        assert!(sink
            .records()
            .iter()
            .all(|record| record.council_reference != "DA/3/2020"));
    }

    #[tokio::test]
    async fn scrapes_feed_over_http() {
        let server = MockServer::start().await;
        let authority = AuthorityConfig::new(
            "penrith",
            &format!("{}/Pages/XC.Track", server.uri()),
            Period::Last28Days,
        )
        .types(&["DA", "DevApp"]);

        Mock::given(method("GET"))
            .and(path("/Pages/XC.Track/SearchApplication.aspx"))
            .and(query_param("o", "xml"))
            .and(query_param("d", "last28days"))
            .and(query_param("k", "LodgementDate"))
            .and(query_param("t", "DA,DevApp"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .mount(&server)
            .await;

        let client = create_client(&Settings::for_tests(), &authority).unwrap();
        let mut session = Session::new(client);
        let sink = MemorySink::default();

        let summary = XmlFeedScraper::new(authority.clone())
            .scrape(&mut session, &sink, today())
            .await
            .unwrap();

        assert_eq!(summary.stored, 3);
        assert_eq!(
            sink.records()[0].info_url,
            format!("{}?id=1001&pprs=X9Z", authority.search_url())
        );
    }
}
