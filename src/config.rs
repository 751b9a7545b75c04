use crate::errors::ConfigError;
use crate::links::{
    DEFAULT_LINK_SELECTOR, LinkCollector, LinkPattern, LinkPatternConfig, LinkRewrite,
    LinkRewriteConfig, LinkRowsConfig,
};
use crate::parsers::Parser;
use crate::parsers::html;
use crate::parsers::row::{RowParser, SUPPORTED_FIELD_COUNTS};
use crate::parsers::text::FIELD_DELIMITER;
use crate::table::DEFAULT_COLUMNS;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use url::Url;

/// Configuration for one scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Page listing the detail pages to visit
    pub listing_url: String,

    /// Which links on the listing page to follow; without one the listing page
    /// is scraped directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_pattern: Option<LinkPatternConfig>,

    /// CSS selector for elements that may carry links
    #[serde(default = "default_link_selector")]
    pub link_selector: String,

    /// Regex rewrite applied to collected links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_rewrite: Option<LinkRewriteConfig>,

    /// Tabulate the matched links themselves instead of following them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_rows: Option<LinkRowsConfig>,

    /// CSS selector for the elements holding one row each
    #[serde(default = "default_block_selector")]
    pub block_selector: String,

    /// Leading blocks to ignore on each page (header rows)
    #[serde(default)]
    pub skip_blocks: usize,

    /// Field counts a row may have, out of {3, 4}
    #[serde(default = "default_expected_field_counts")]
    pub expected_field_counts: BTreeSet<usize>,

    /// Field delimiter used when flattening blocks
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Output column labels
    #[serde(default = "default_columns")]
    pub columns: [String; 4],

    /// How pages are fetched
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Page fetching backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackendConfig {
    /// A browser driven over WebDriver (ChromeDriver, geckodriver, ...)
    WebDriver(WebDriverConfig),

    /// Plain HTTP requests
    Http(HttpConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::WebDriver(WebDriverConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// CSS selector to wait for before reading a page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<String>,

    /// Per-page load timeout
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            wait_for: None,
            page_timeout_secs: default_page_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Skip TLS certificate checks (some government sites need it)
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: default_page_timeout_secs(),
            user_agent: default_user_agent(),
            accept_invalid_certs: false,
        }
    }
}

fn default_link_selector() -> String {
    DEFAULT_LINK_SELECTOR.to_string()
}

fn default_block_selector() -> String {
    "tr".to_string()
}

fn default_expected_field_counts() -> BTreeSet<usize> {
    SUPPORTED_FIELD_COUNTS.into_iter().collect()
}

fn default_delimiter() -> char {
    FIELD_DELIMITER
}

fn default_columns() -> [String; 4] {
    DEFAULT_COLUMNS.map(String::from)
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_page_timeout_secs() -> u64 {
    45
}

fn default_user_agent() -> String {
    concat!("scrape-table/", env!("CARGO_PKG_VERSION")).to_string()
}

impl ScrapeConfig {
    /// Create a new configuration with default values
    pub fn new(listing_url: &str) -> Self {
        Self {
            listing_url: listing_url.to_string(),
            link_pattern: None,
            link_selector: default_link_selector(),
            link_rewrite: None,
            link_rows: None,
            block_selector: default_block_selector(),
            skip_blocks: 0,
            expected_field_counts: default_expected_field_counts(),
            delimiter: default_delimiter(),
            columns: default_columns(),
            backend: BackendConfig::default(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `WEBDRIVER_URL` from the environment, if set and non-empty
    pub fn apply_env(&mut self) {
        if let BackendConfig::WebDriver(web) = &mut self.backend {
            if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
                if !webdriver_url.is_empty() {
                    web.webdriver_url = webdriver_url;
                }
            }
        }
    }

    /// Validates the configuration and compiles its selectors and patterns
    pub fn compile(&self) -> Result<Plan, ConfigError> {
        let listing_url = Url::parse(&self.listing_url).map_err(|e| ConfigError::Url {
            url: self.listing_url.clone(),
            reason: e.to_string(),
        })?;

        let links = match &self.link_pattern {
            Some(pattern) => {
                let mut collector = LinkCollector::new(LinkPattern::try_from(pattern)?)
                    .with_selector(&self.link_selector)?;
                if let Some(rewrite) = &self.link_rewrite {
                    collector = collector.with_rewrite(LinkRewrite::try_from(rewrite)?);
                }
                Some(collector)
            }
            None => None,
        };

        if self.link_rows.is_some() && links.is_none() {
            return Err(ConfigError::LinkRowsWithoutPattern);
        }

        let rows = RowParser::new(self.delimiter, self.expected_field_counts.clone())?;

        Ok(Plan {
            listing_url,
            links,
            link_rows: self.link_rows.clone(),
            block_selector_text: self.block_selector.clone(),
            block_selector: html::compile_selector(&self.block_selector)?,
            skip_blocks: self.skip_blocks,
            parser: Parser::new(rows),
            columns: self.columns.clone(),
        })
    }
}

/// A validated [`ScrapeConfig`], ready for the driver
#[derive(Debug, Clone)]
pub struct Plan {
    pub listing_url: Url,
    pub links: Option<LinkCollector>,
    pub link_rows: Option<LinkRowsConfig>,
    pub block_selector_text: String,
    pub block_selector: Selector,
    pub skip_blocks: usize,
    pub parser: Parser,
    pub columns: [String; 4],
}
