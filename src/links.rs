use crate::errors::ConfigError;
use crate::parsers::html::{self, Element, Page};
use crate::parsers::row::RawRow;
use crate::parsers::text;
use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Default selector for elements that can carry a link
pub const DEFAULT_LINK_SELECTOR: &str = "[href], [src]";

/// Attributes checked against the link pattern, in order
const LINK_ATTRIBUTES: [&str; 2] = ["href", "src"];

/// Name attribute used by [`LinkRowsConfig`] when none is given
pub const DEFAULT_NAME_ATTRIBUTE: &str = "title";

/// How a link pattern is written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPatternConfig {
    /// Attribute value contains this substring
    Contains(String),
    /// Attribute value matches this regex
    Regex(String),
}

/// Compiled form of [`LinkPatternConfig`]
#[derive(Debug, Clone)]
pub enum LinkPattern {
    Contains(String),
    Regex(Regex),
}

impl LinkPattern {
    pub fn contains(needle: impl Into<String>) -> Self {
        LinkPattern::Contains(needle.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, ConfigError> {
        Ok(LinkPattern::Regex(Regex::new(pattern)?))
    }

    pub fn is_match(&self, value: &str) -> bool {
        match self {
            LinkPattern::Contains(needle) => value.contains(needle.as_str()),
            LinkPattern::Regex(regex) => regex.is_match(value),
        }
    }
}

impl TryFrom<&LinkPatternConfig> for LinkPattern {
    type Error = ConfigError;

    fn try_from(config: &LinkPatternConfig) -> Result<Self, Self::Error> {
        match config {
            LinkPatternConfig::Contains(needle) => Ok(LinkPattern::contains(needle.clone())),
            LinkPatternConfig::Regex(pattern) => LinkPattern::regex(pattern),
        }
    }
}

/// Regex rewrite applied to every resolved link (e.g. roster page -> bio page)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRewriteConfig {
    pub pattern: String,
    pub replacement: String,
}

#[derive(Debug, Clone)]
pub struct LinkRewrite {
    pattern: Regex,
    replacement: String,
}

impl LinkRewrite {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.to_string(),
        })
    }

    /// Applies the rewrite, keeping the original URL if the result does not parse
    pub fn apply(&self, url: Url) -> Url {
        let rewritten = self.pattern.replace(url.as_str(), self.replacement.as_str());
        match Url::parse(&rewritten) {
            Ok(new_url) => new_url,
            Err(e) => {
                ::log::warn!("Rewrite of {} produced invalid URL {}: {}", url, rewritten, e);
                url
            }
        }
    }
}

impl TryFrom<&LinkRewriteConfig> for LinkRewrite {
    type Error = ConfigError;

    fn try_from(config: &LinkRewriteConfig) -> Result<Self, Self::Error> {
        LinkRewrite::new(&config.pattern, &config.replacement)
    }
}

/// An absolute link found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: Url,
    /// Position in discovery order, after dedup
    pub index: usize,
}

/// Collects matching links from a page
#[derive(Debug, Clone)]
pub struct LinkCollector {
    selector: Selector,
    pattern: LinkPattern,
    rewrite: Option<LinkRewrite>,
}

impl LinkCollector {
    pub fn new(pattern: LinkPattern) -> Self {
        Self {
            selector: html::compile_selector(DEFAULT_LINK_SELECTOR)
                .expect("default link selector is valid"),
            pattern,
            rewrite: None,
        }
    }

    /// Restrict collection to elements matching a CSS selector
    pub fn with_selector(mut self, selector: &str) -> Result<Self, ConfigError> {
        self.selector = html::compile_selector(selector)?;
        Ok(self)
    }

    pub fn with_rewrite(mut self, rewrite: LinkRewrite) -> Self {
        self.rewrite = Some(rewrite);
        self
    }

    /// Returns the page's matching links, absolute and deduplicated in first-seen order
    pub fn collect(&self, page: &Page) -> Vec<Link> {
        self.collect_elements(page)
            .into_iter()
            .map(|(link, _)| link)
            .collect()
    }

    /// Same as [`collect`](Self::collect), keeping the element each link was first seen on
    pub fn collect_elements<'a>(&self, page: &'a Page) -> Vec<(Link, Element<'a>)> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in page.select(&self.selector) {
            // href wins when both attributes match
            let Some(value) = LINK_ATTRIBUTES
                .into_iter()
                .filter_map(|name| element.attribute(name))
                .find(|value| self.pattern.is_match(value))
            else {
                continue;
            };

            let Some(mut url) = resolve(page.url(), value) else {
                ::log::debug!("Skipping unresolvable link {:?} on {}", value, page.url());
                continue;
            };

            if let Some(rewrite) = &self.rewrite {
                url = rewrite.apply(url);
            }

            if seen.insert(url.as_str().to_string()) {
                ::log::trace!("Collected link {}", url);
                let index = links.len();
                links.push((Link { url, index }, element));
            }
        }

        ::log::debug!("Collected {} links from {}", links.len(), page.url());
        links
    }
}

/// Collects links matching `pattern` using the default selector
pub fn collect(page: &Page, pattern: LinkPattern) -> Vec<Link> {
    LinkCollector::new(pattern).collect(page)
}

/// Resolves an attribute value against the page URL, dropping any fragment
///
/// Values that already carry a scheme are kept as they are; relative ones are
/// joined to the page URL.
pub fn resolve(base: &Url, value: &str) -> Option<Url> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let mut url = match Url::parse(value) {
        Ok(absolute) => absolute,
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(value).ok()?,
        Err(_) => return None,
    };
    if !matches!(url.scheme(), "http" | "https" | "file") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Tabulates collected links directly instead of following them
///
/// Each link gives one row: the name comes from an attribute of the element
/// the link was found on (falling back to its text), the link column is the
/// absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRowsConfig {
    #[serde(default = "default_name_attribute")]
    pub name_attribute: String,

    /// Removed from the start of every name (e.g. `"Inmate Information for "`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_prefix: Option<String>,
}

impl Default for LinkRowsConfig {
    fn default() -> Self {
        Self {
            name_attribute: default_name_attribute(),
            strip_prefix: None,
        }
    }
}

fn default_name_attribute() -> String {
    DEFAULT_NAME_ATTRIBUTE.to_string()
}

impl LinkRowsConfig {
    /// Builds one three-field row per link; the trailing column stays empty
    pub fn rows(&self, links: &[(Link, Element<'_>)]) -> Vec<RawRow> {
        links
            .iter()
            .map(|(link, element)| RawRow::ThreeField {
                name: self.name(element),
                link: link.url.to_string(),
                extra: String::new(),
            })
            .collect()
    }

    fn name(&self, element: &Element<'_>) -> String {
        let raw = match element.attribute(&self.name_attribute) {
            Some(value) => value.to_string(),
            None => element.inline_text(),
        };
        let name = match &self.strip_prefix {
            Some(prefix) => raw.trim().strip_prefix(prefix.as_str()).unwrap_or(raw.trim()),
            None => raw.trim(),
        };
        text::normalize_whitespace_in_segment(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, html: &str) -> Page {
        Page::from_html(Url::parse(url).unwrap(), html)
    }

    fn urls(links: &[Link]) -> Vec<&str> {
        links.iter().map(|l| l.url.as_str()).collect()
    }

    #[test]
    fn test_duplicates_collapse() {
        let page = page(
            "https://www.espn.com/nfl/teams",
            r#"<a href="/nfl/team/roster/_/name/buf">1</a>
               <a href="/nfl/team/roster/_/name/buf">2</a>
               <a href="/nfl/team/roster/_/name/buf">3</a>"#,
        );
        let links = collect(&page, LinkPattern::contains("roster"));
        assert_eq!(
            urls(&links),
            vec!["https://www.espn.com/nfl/team/roster/_/name/buf"]
        );
        assert_eq!(links[0].index, 0);
    }

    #[test]
    fn test_first_seen_order() {
        let page = page(
            "https://www.espn.com/nfl/teams",
            r#"<a href="/nfl/team/roster/_/name/nyj">jets</a>
               <a href="/nfl/team/stats/_/name/nyj">stats</a>
               <a href="/nfl/team/roster/_/name/buf">bills</a>
               <a href="/nfl/team/roster/_/name/nyj#top">jets again</a>
               <a href="https://www.espn.com/nfl/team/roster/_/name/mia">dolphins</a>"#,
        );
        let links = collect(&page, LinkPattern::contains("roster"));
        assert_eq!(
            urls(&links),
            vec![
                "https://www.espn.com/nfl/team/roster/_/name/nyj",
                "https://www.espn.com/nfl/team/roster/_/name/buf",
                "https://www.espn.com/nfl/team/roster/_/name/mia",
            ]
        );
        let indexes: Vec<usize> = links.iter().map(|l| l.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn test_relative_paths_resolve_against_page() {
        let page = page(
            "https://www.tdcj.texas.gov/death_row/dr_executed_offenders.html",
            r#"<a href="dr_info/coble.jpg" title="Inmate Information for Coble">x</a>
               <img src="/images/logo.png">"#,
        );
        let links = collect(&page, LinkPattern::regex(r"\.jpg$").unwrap());
        assert_eq!(
            urls(&links),
            vec!["https://www.tdcj.texas.gov/death_row/dr_info/coble.jpg"]
        );
    }

    #[test]
    fn test_src_attributes() {
        let page = page(
            "https://example.com/faces",
            r#"<img src="/photos/a.jpg"><img src="/photos/b.png">"#,
        );
        let links = collect(&page, LinkPattern::contains("jpg"));
        assert_eq!(urls(&links), vec!["https://example.com/photos/a.jpg"]);
    }

    #[test]
    fn test_src_checked_when_href_does_not_match() {
        let page = page(
            "https://example.com/gallery",
            r#"<a href="/about" src="/photos/c.jpg">both</a>
               <a href="/photos/d.jpg" src="/photos/e.jpg">both match</a>"#,
        );
        let links = collect(&page, LinkPattern::contains("jpg"));
        assert_eq!(
            urls(&links),
            vec![
                "https://example.com/photos/c.jpg",
                "https://example.com/photos/d.jpg",
            ]
        );
    }

    #[test]
    fn test_link_rows_from_titles() {
        let page = page(
            "https://www.tdcj.texas.gov/death_row/dr_executed_offenders.html",
            r#"<a href="dr_info/coble.jpg" title="Inmate Information for Coble">Inmate Info</a>
               <a href="dr_info/coble.jpg" title="Inmate Information for Coble">again</a>
               <a href="dr_info/ruiz.jpg" title="  Ruiz  ">Inmate Info</a>
               <a href="dr_info/lee.jpg"><b>Lee</b>, Roy</a>"#,
        );
        let collector = LinkCollector::new(LinkPattern::contains("jpg"));
        let found = collector.collect_elements(&page);
        let rows = LinkRowsConfig {
            name_attribute: "title".to_string(),
            strip_prefix: Some("Inmate Information for ".to_string()),
        }
        .rows(&found);

        let named: Vec<(String, String)> = rows
            .into_iter()
            .map(|row| match row {
                RawRow::ThreeField { name, link, extra } => {
                    assert!(extra.is_empty());
                    (name, link)
                }
                other => panic!("unexpected row {:?}", other),
            })
            .collect();
        assert_eq!(
            named,
            vec![
                (
                    "Coble".to_string(),
                    "https://www.tdcj.texas.gov/death_row/dr_info/coble.jpg".to_string()
                ),
                (
                    "Ruiz".to_string(),
                    "https://www.tdcj.texas.gov/death_row/dr_info/ruiz.jpg".to_string()
                ),
                (
                    "Lee, Roy".to_string(),
                    "https://www.tdcj.texas.gov/death_row/dr_info/lee.jpg".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_no_matches_is_empty() {
        let page = page("https://example.com/", r#"<a href="/about">about</a>"#);
        assert!(collect(&page, LinkPattern::contains("roster")).is_empty());
    }

    #[test]
    fn test_non_web_schemes_skipped() {
        let page = page(
            "https://example.com/",
            r#"<a href="mailto:roster@example.com">mail</a>
               <a href="javascript:roster()">js</a>"#,
        );
        assert!(collect(&page, LinkPattern::contains("roster")).is_empty());
    }

    #[test]
    fn test_rewrite() {
        let page = page(
            "https://www.espn.com/nfl/team/roster/_/name/buf",
            r#"<a href="https://www.espn.com/nfl/player/_/id/3918298/josh-allen">Josh</a>"#,
        );
        let collector = LinkCollector::new(LinkPattern::contains("player/_/id"))
            .with_rewrite(LinkRewrite::new(r"(.*player/)(_/.*)", "${1}bio/${2}").unwrap());
        let links = collector.collect(&page);
        assert_eq!(
            urls(&links),
            vec!["https://www.espn.com/nfl/player/bio/_/id/3918298/josh-allen"]
        );
    }

    #[test]
    fn test_custom_selector() {
        let page = page(
            "https://example.com/",
            r#"<nav><a href="/roster/nav">nav</a></nav>
               <main><a href="/roster/main">main</a></main>"#,
        );
        let collector = LinkCollector::new(LinkPattern::contains("roster"))
            .with_selector("main a")
            .unwrap();
        assert_eq!(
            urls(&collector.collect(&page)),
            vec!["https://example.com/roster/main"]
        );
    }

    #[test]
    fn test_pattern_from_config() {
        let config: LinkPatternConfig = serde_json::from_str(r#"{"regex": "roster"}"#).unwrap();
        assert!(LinkPattern::try_from(&config).unwrap().is_match("/roster/x"));

        let bad = LinkPatternConfig::Regex("(".to_string());
        assert!(matches!(
            LinkPattern::try_from(&bad),
            Err(ConfigError::Regex(_))
        ));
    }
}
