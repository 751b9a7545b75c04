use super::PageFetcher;
use crate::config::HttpConfig;
use crate::errors::FetchError;
use crate::parsers::html::Page;
use std::time::Duration;
use url::Url;

/// Fetches raw HTML over plain HTTP, without running scripts
///
/// Good enough for static pages; use [`WebDriverFetcher`](super::WebDriverFetcher)
/// for pages that render their tables client-side.
pub struct HttpFetcher {
    client: reqwest::Client,
    page_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let page_timeout = Duration::from_secs(config.page_timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(page_timeout)
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| FetchError::Connect(e.to_string()))?;

        if config.accept_invalid_certs {
            ::log::warn!("TLS certificate verification is disabled");
        }

        Ok(Self {
            client,
            page_timeout,
        })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&mut self, url: &Url) -> Result<Page, FetchError> {
        ::log::debug!("GET: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| http_error(e, url, self.page_timeout))?;

        let html = response
            .text()
            .await
            .map_err(|e| http_error(e, url, self.page_timeout))?;

        ::log::debug!("Received {} bytes from {}", html.len(), url);
        Ok(Page::from_html(url.clone(), &html))
    }

    async fn close(self) {
        ::log::debug!("HTTP client released");
    }
}

fn http_error(error: reqwest::Error, url: &Url, page_timeout: Duration) -> FetchError {
    if error.is_timeout() {
        ::log::error!("Timeout loading: {}", url);
        FetchError::Timeout {
            url: url.to_string(),
            secs: page_timeout.as_secs(),
        }
    } else {
        ::log::error!("Failed to load {}: {}", url, error);
        FetchError::Http {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}
