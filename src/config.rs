use serde::Deserialize;
use std::collections::BTreeMap;
use url::Url;

use crate::authorities::default_authorities;
use crate::error::ConfigError;

/// Environment variable consulted when no proxy is set in the settings.
pub const PROXY_ENV: &str = "MORPH_AUSTRALIAN_PROXY";

const SETTINGS_FILE: &str = "icon_scraper";
const ENV_PREFIX: &str = "ICON_SCRAPER";

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pub authorities: Authorities,
}

/// Runtime knobs: defaults, then `icon_scraper.toml`, then `ICON_SCRAPER_*`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub user_agent: String,
    pub database_path: String,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub australian_proxy: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Config {
            settings: Settings::load()?,
            authorities: Authorities::new(default_authorities())?,
        })
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings: Settings = config::Config::builder()
            .set_default("user_agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36")?
            .set_default("database_path", "data.sqlite")?
            .set_default("request_timeout_secs", 60)?
            .add_source(config::File::with_name(SETTINGS_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        if settings.australian_proxy.is_none() {
            settings.australian_proxy = std::env::var(PROXY_ENV).ok().filter(|p| !p.is_empty());
        }

        Ok(settings)
    }
}

#[cfg(test)]
impl Settings {
    pub fn for_tests() -> Self {
        Settings {
            user_agent: "icon-scraper-test".to_string(),
            database_path: ":memory:".to_string(),
            request_timeout_secs: 5,
            australian_proxy: None,
        }
    }
}

#[cfg(test)]
impl AuthorityConfig {
    pub fn via_australian_proxy(mut self) -> Self {
        self.australian_proxy = true;
        self
    }
}

/// Lookback window understood by the `d` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    ThisWeek,
    ThisMonth,
    Last14Days,
    Last28Days,
}

impl Period {
    pub fn as_param(&self) -> &'static str {
        match self {
            Period::ThisWeek => "thisweek",
            Period::ThisMonth => "thismonth",
            Period::Last14Days => "last14days",
            Period::Last28Days => "last28days",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Xml,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConfig {
    pub key: String,
    pub url: String,
    pub period: Period,
    pub types: Option<Vec<String>>,
    pub ssl_verify: bool,
    pub australian_proxy: bool,
    pub use_html_scraper: bool,
}

impl AuthorityConfig {
    pub fn new(key: &str, url: &str, period: Period) -> Self {
        Self {
            key: key.to_string(),
            url: url.to_string(),
            period,
            types: None,
            ssl_verify: true,
            australian_proxy: false,
            use_html_scraper: false,
        }
    }

    pub fn types<T: ToString>(mut self, types: &[T]) -> Self {
        self.types = Some(types.iter().map(ToString::to_string).collect());
        self
    }

    pub fn without_ssl_verify(mut self) -> Self {
        self.ssl_verify = false;
        self
    }

    pub fn html_listing(mut self) -> Self {
        self.use_html_scraper = true;
        self
    }

    /// Query endpoint, also the base of every `info_url`.
    pub fn search_url(&self) -> String {
        format!("{}/SearchApplication.aspx", self.url.trim_end_matches('/'))
    }

    pub fn query_params(&self, format: FeedFormat) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("d", self.period.as_param().to_string()),
            ("k", "LodgementDate".to_string()),
        ];
        if format == FeedFormat::Xml {
            params.push(("o", "xml".to_string()));
        }
        if let Some(types) = &self.types {
            params.push(("t", types.join(",")));
        }
        params
    }

    pub fn query_url(&self, format: FeedFormat) -> Result<String, serde_urlencoded::ser::Error> {
        let query = serde_urlencoded::to_string(self.query_params(format))?;
        Ok(format!("{}?{}", self.search_url(), query))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidAuthority {
            key: self.key.clone(),
            reason,
        };

        let url = Url::parse(&self.url).map_err(|e| invalid(format!("bad url: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if let Some(types) = &self.types {
            if types.is_empty() || types.iter().any(|t| t.trim().is_empty()) {
                return Err(invalid("empty application type filter".to_string()));
            }
        }
        Ok(())
    }
}

/// Immutable, validated mapping from authority key to its configuration.
#[derive(Debug, Clone, Default)]
pub struct Authorities(BTreeMap<String, AuthorityConfig>);

impl Authorities {
    pub fn new(entries: Vec<AuthorityConfig>) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for entry in entries {
            entry.validate()?;
            if map.contains_key(&entry.key) {
                return Err(ConfigError::InvalidAuthority {
                    key: entry.key,
                    reason: "duplicate key".to_string(),
                });
            }
            map.insert(entry.key.clone(), entry);
        }
        Ok(Self(map))
    }

    pub fn get(&self, key: &str) -> Result<&AuthorityConfig, ConfigError> {
        self.0
            .get(key)
            .ok_or_else(|| ConfigError::UnknownAuthority(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Resolve every requested key up front; an empty request means all.
    pub fn select(&self, keys: &[String]) -> Result<Vec<&AuthorityConfig>, ConfigError> {
        if keys.is_empty() {
            return Ok(self.0.values().collect());
        }
        keys.iter().map(|key| self.get(key)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_table_is_valid() {
        let authorities = Authorities::new(default_authorities()).unwrap();
        assert_eq!(authorities.len(), 30);
        assert!(authorities.get("northern_beaches").unwrap().use_html_scraper);
        assert!(!authorities.get("hornsby").unwrap().ssl_verify);
    }

    #[test]
    fn unknown_authority_is_a_typed_error() {
        let authorities = Authorities::new(default_authorities()).unwrap();
        let err = authorities
            .select(&["penrith".to_string(), "atlantis".to_string()])
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAuthority(key) if key == "atlantis"));
    }

    #[test]
    fn empty_selection_means_every_authority() {
        let authorities = Authorities::new(default_authorities()).unwrap();
        assert_eq!(authorities.select(&[]).unwrap().len(), authorities.len());
    }

    #[test]
    fn rejects_bad_url_and_duplicates() {
        let bad = AuthorityConfig::new("bad", "not a url", Period::ThisWeek);
        assert!(matches!(
            Authorities::new(vec![bad]),
            Err(ConfigError::InvalidAuthority { .. })
        ));

        let a = AuthorityConfig::new("a", "https://a.example/Pages/XC.Track", Period::ThisWeek);
        assert!(Authorities::new(vec![a.clone(), a]).is_err());
    }

    #[test]
    fn rejects_empty_type_filter() {
        let entry = AuthorityConfig::new("a", "https://a.example/Pages/XC.Track", Period::ThisWeek)
            .types::<&str>(&[]);
        assert!(Authorities::new(vec![entry]).is_err());
    }

    #[test]
    fn builds_query_urls() {
        let authority = AuthorityConfig::new(
            "penrith",
            "https://datracker.penrithcity.nsw.gov.au/track/Pages/XC.Track",
            Period::Last28Days,
        )
        .types(&["DA", "DevApp"]);

        assert_eq!(
            authority.query_url(FeedFormat::Xml).unwrap(),
            "https://datracker.penrithcity.nsw.gov.au/track/Pages/XC.Track/SearchApplication.aspx?d=last28days&k=LodgementDate&o=xml&t=DA%2CDevApp"
        );
        assert_eq!(
            authority.query_url(FeedFormat::Html).unwrap(),
            "https://datracker.penrithcity.nsw.gov.au/track/Pages/XC.Track/SearchApplication.aspx?d=last28days&k=LodgementDate&t=DA%2CDevApp"
        );
    }
}
