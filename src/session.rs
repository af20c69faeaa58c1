use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::info;
use url::Url;

use crate::error::ScrapeError;
use crate::utils::http::{fetch_page, read_page, Page};

const AGREE_BUTTON_SELECTOR: &str = "input[name$='BtnAgree'], input[value='I Agree']";
const INPUT_SELECTOR: &str = "input[name]";

/// Where a session stands with the portal's terms-and-conditions page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgreementState {
    Unknown,
    Pending,
    Agreed,
}

/// Form to POST to accept the terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementForm {
    pub action: Url,
    pub fields: Vec<(String, String)>,
}

/// One authority's HTTP session. The agreement is accepted at most once;
/// afterwards the cookie store carries it.
pub struct Session {
    client: Client,
    state: AgreementState,
}

impl Session {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: AgreementState::Unknown,
        }
    }

    /// Fetch `url`. If the portal answers with its agreement page, agree and
    /// issue the same request again.
    pub async fn fetch(&mut self, url: &str) -> Result<String, ScrapeError> {
        let page = fetch_page(&self.client, url).await?;
        if self.state == AgreementState::Agreed {
            return Ok(page.body);
        }

        let Some(form) = agreement_form(&page)? else {
            return Ok(page.body);
        };

        self.state = AgreementState::Pending;
        info!("Agreeing to terms and conditions at {}", page.url);
        let response = self
            .client
            .post(form.action.clone())
            .form(&form.fields)
            .send()
            .await?;
        read_page(response).await?;
        self.state = AgreementState::Agreed;

        Ok(fetch_page(&self.client, url).await?.body)
    }
}

#[cfg(test)]
impl Session {
    pub fn state(&self) -> AgreementState {
        self.state
    }
}

/// Detects the terms-and-conditions page and builds the form that accepts it.
pub fn agreement_form(page: &Page) -> Result<Option<AgreementForm>, ScrapeError> {
    let document = Html::parse_document(&page.body);
    let button_selector = Selector::parse(AGREE_BUTTON_SELECTOR)
        .map_err(|_| ScrapeError::Selector(AGREE_BUTTON_SELECTOR))?;
    let input_selector = Selector::parse(INPUT_SELECTOR)
        .map_err(|_| ScrapeError::Selector(INPUT_SELECTOR))?;

    let Some(button) = document.select(&button_selector).next() else {
        return Ok(None);
    };

    let form = button
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "form")
        .ok_or_else(|| ScrapeError::AgreementForm(page.url.to_string()))?;

    let action = match form.value().attr("action").filter(|a| !a.trim().is_empty()) {
        Some(action) => page.url.join(action.trim())?,
        None => page.url.clone(),
    };

    let mut fields: Vec<(String, String)> = form
        .select(&input_selector)
        .filter(|input| !is_button(input))
        .filter(|input| !is_unchecked(input))
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    if let Some(name) = button.value().attr("name") {
        let value = button.value().attr("value").unwrap_or_default();
        fields.push((name.to_string(), value.to_string()));
    }

    Ok(Some(AgreementForm { action, fields }))
}

fn input_type(input: &ElementRef<'_>) -> String {
    input
        .value()
        .attr("type")
        .unwrap_or("text")
        .to_ascii_lowercase()
}

fn is_button(input: &ElementRef<'_>) -> bool {
    matches!(input_type(input).as_str(), "submit" | "button" | "image" | "reset")
}

fn is_unchecked(input: &ElementRef<'_>) -> bool {
    matches!(input_type(input).as_str(), "checkbox" | "radio")
        && input.value().attr("checked").is_none()
}
