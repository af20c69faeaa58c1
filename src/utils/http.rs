use flate2::read::GzDecoder;
use reqwest::header::{ACCEPT_ENCODING, CONTENT_ENCODING};
use reqwest::{Client, ClientBuilder, Proxy, Response};
use std::io::Read;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::{AuthorityConfig, Settings, PROXY_ENV};
use crate::error::ScrapeError;

/// A fetched page with the URL it ended up at after redirects.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub body: String,
}

/// Client for one authority: honours its TLS and proxy settings and keeps
/// session cookies.
pub fn create_client(settings: &Settings, authority: &AuthorityConfig) -> Result<Client, ScrapeError> {
    let mut builder = ClientBuilder::new()
        .user_agent(settings.user_agent.as_str())
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .cookie_store(true)
        // Decompression happens in read_page so broken encodings can be fixed up
        .no_gzip();

    if !authority.ssl_verify {
        warn!("TLS certificate verification disabled for {}", authority.key);
        builder = builder.danger_accept_invalid_certs(true);
    }

    if authority.australian_proxy {
        match &settings.australian_proxy {
            Some(proxy) => builder = builder.proxy(Proxy::all(proxy.as_str())?),
            None => warn!(
                "{} wants the Australian proxy but neither australian_proxy nor {} is set",
                authority.key, PROXY_ENV
            ),
        }
    }

    Ok(builder.build()?)
}

pub async fn fetch_page(client: &Client, url: &str) -> Result<Page, ScrapeError> {
    debug!("GET {}", url);
    let response = client.get(url).header(ACCEPT_ENCODING, "gzip").send().await?;
    read_page(response).await
}

pub async fn read_page(response: Response) -> Result<Page, ScrapeError> {
    let url = response.url().clone();
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            status,
            url: url.to_string(),
        });
    }

    let encoding = response
        .headers()
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(normalize_content_encoding);
    let bytes = response.bytes().await?;

    let body = match encoding.as_deref() {
        Some("gzip") | Some("x-gzip") => gunzip(&bytes).map_err(|source| ScrapeError::Decode {
            url: url.to_string(),
            source,
        })?,
        _ => String::from_utf8_lossy(&bytes).into_owned(),
    };

    Ok(Page { url, body })
}

/// Collapse repeated codings. Some servers report `gzip,gzip` for a body
/// that is only compressed once.
pub fn normalize_content_encoding(value: &str) -> String {
    let mut codings: Vec<String> = Vec::new();
    for coding in value.split(',').map(|c| c.trim().to_ascii_lowercase()) {
        if !coding.is_empty() && codings.last() != Some(&coding) {
            codings.push(coding);
        }
    }
    codings.join(",")
}

fn gunzip(bytes: &[u8]) -> std::io::Result<String> {
    let mut decoded = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut decoded)?;
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}
