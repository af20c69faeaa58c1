use anyhow::Result;
use tracing::{error, info};

mod authorities;
mod config;
mod error;
mod models;
mod parsers;
mod scrapers;
mod session;
mod storage;
mod utils;

use crate::config::Config;
use crate::scrapers::scrape_authority;
use crate::storage::SqliteStorage;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("icon_scraper=info".parse()?),
        )
        .init();

    let config = Config::load()?;

    // Unknown keys fail here, before anything is fetched
    let requested: Vec<String> = std::env::args().skip(1).collect();
    let authorities = config.authorities.select(&requested)?;
    info!(
        "Scraping {} of {} authorities",
        authorities.len(),
        config.authorities.len()
    );

    let storage = SqliteStorage::open(&config.settings.database_path)?;
    storage.migrate()?;

    let mut failed = Vec::new();
    for authority in authorities {
        info!("Scraping {}", authority.key);

        let today = parsers::today();
        if let Err(e) = scrape_authority(&config.settings, authority, &storage, today).await {
            error!("Scraping {} failed: {}", authority.key, e);
            failed.push(authority.key.as_str());
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("scraping failed for: {}", failed.join(", "));
    }

    info!("{} applications in {}", storage.count()?, config.settings.database_path);
    Ok(())
}
