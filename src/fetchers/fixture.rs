use super::PageFetcher;
use crate::errors::FetchError;
use crate::parsers::html::Page;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

/// In-memory fetcher serving canned HTML, for tests and offline runs
#[derive(Debug, Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, Result<String, FetchError>>,
    visited: Vec<String>,
    closed: Arc<AtomicBool>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` for `url`
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(key(url), Ok(html.to_string()));
        self
    }

    /// Makes every fetch of `url` fail with `error`
    pub fn with_failure(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(key(url), Err(error));
        self
    }

    /// URLs requested so far, in order
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    /// Flag set once the fetcher has been closed
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

/// Stores URLs in their parsed form so `https://a.test` and `https://a.test/` match
fn key(url: &str) -> String {
    Url::parse(url)
        .map(String::from)
        .unwrap_or_else(|_| url.to_string())
}

impl PageFetcher for FixtureFetcher {
    async fn fetch(&mut self, url: &Url) -> Result<Page, FetchError> {
        self.visited.push(url.to_string());
        match self.pages.get(url.as_str()) {
            Some(Ok(html)) => Ok(Page::from_html(url.clone(), html)),
            Some(Err(e)) => Err(e.clone()),
            None => Err(FetchError::NotFound(url.to_string())),
        }
    }

    async fn close(self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
