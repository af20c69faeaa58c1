use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::fs;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// Dumps both renditions of an ICON search so a new portal's layout can be inspected.
///
/// Usage: probe_feed <search url> [period]
#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let search_url = args
        .next()
        .ok_or_else(|| anyhow!("usage: probe_feed <search url> [period]"))?;
    let period = args.next().unwrap_or_else(|| "last14days".to_string());

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .build()?;

    // Landing page first, some portals only set their session cookie here
    client.get(&search_url).send().await?;

    println!("Fetching XML feed...");
    let xml = client
        .get(&search_url)
        .query(&[("d", period.as_str()), ("k", "LodgementDate"), ("o", "xml")])
        .send()
        .await?
        .text()
        .await?;
    fs::write("feed_sample.xml", &xml)?;

    match roxmltree::Document::parse(xml.trim_start_matches('\u{feff}')) {
        Ok(document) => {
            let applications = document
                .descendants()
                .filter(|node| node.has_tag_name("Application"))
                .count();
            println!("Found {} <Application> elements", applications);
        }
        Err(e) => println!("Feed is not well-formed XML: {}", e),
    }

    println!("\nFetching HTML listing...");
    let html = client
        .get(&search_url)
        .query(&[("d", period.as_str()), ("k", "LodgementDate")])
        .send()
        .await?
        .text()
        .await?;
    fs::write("listing_sample.html", &html)?;

    let document = Html::parse_document(&html);
    for css in [".result", "input[name$='BtnAgree']", "table.grid"] {
        let selector = Selector::parse(css)
            .map_err(|e| anyhow!("{:?}", e))
            .with_context(|| format!("invalid selector {}", css))?;
        let count = document.select(&selector).count();
        if count > 0 {
            println!("Selector '{}' matched {} elements", css, count);
        }
    }

    Ok(())
}
