use super::PageFetcher;
use crate::config::WebDriverConfig;
use crate::errors::FetchError;
use crate::parsers::html::Page;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

/// Alternatives tried when the configured WebDriver URL refuses the connection
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // geckodriver / Selenium default
    "http://127.0.0.1:4444",
];

/// Fetches pages through one WebDriver browser session
pub struct WebDriverFetcher {
    client: Client,
    page_timeout: Duration,
    wait_for: Option<String>,
}

impl WebDriverFetcher {
    /// Opens a browser session, trying the common local WebDriver ports if the
    /// configured one is not reachable
    pub async fn connect(config: &WebDriverConfig) -> Result<Self, FetchError> {
        let client = connect_to_webdriver(&config.webdriver_url, config.headless).await?;
        Ok(Self {
            client,
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            wait_for: config.wait_for.clone(),
        })
    }

    async fn load(&self, url: &Url) -> Result<String, FetchError> {
        self.client
            .goto(url.as_str())
            .await
            .map_err(|e| navigation_error(e, "navigating to", url))?;

        if let Some(selector) = &self.wait_for {
            ::log::debug!("Waiting for `{}` on {}", selector, url);
            self.client
                .wait()
                .at_most(self.page_timeout)
                .for_element(Locator::Css(selector))
                .await
                .map_err(|e| navigation_error(e, "waiting for content on", url))?;
        }

        self.client
            .source()
            .await
            .map_err(|e| navigation_error(e, "getting source for", url))
    }
}

impl PageFetcher for WebDriverFetcher {
    async fn fetch(&mut self, url: &Url) -> Result<Page, FetchError> {
        let started = std::time::Instant::now();
        ::log::debug!("FETCH: {}", url);

        let html = match timeout(self.page_timeout, self.load(url)).await {
            Ok(result) => result?,
            Err(_) => {
                ::log::error!("Timeout loading: {}", url);
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    secs: self.page_timeout.as_secs(),
                });
            }
        };

        ::log::debug!(
            "Loaded {} in {:.2} seconds",
            url,
            started.elapsed().as_secs_f64()
        );
        Ok(Page::from_html(url.clone(), &html))
    }

    async fn close(self) {
        match self.client.close().await {
            Ok(()) => ::log::debug!("WebDriver session closed"),
            Err(e) => ::log::warn!("Failed to close WebDriver session: {}", e),
        }
    }
}

/// Browser capabilities; headless flags for both Chrome and Firefox
fn capabilities(headless: bool) -> Capabilities {
    let mut caps = Capabilities::new();
    if headless {
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless=new", "--window-size=1920,1080"] }),
        );
        caps.insert(
            "moz:firefoxOptions".to_string(),
            json!({ "args": ["-headless"] }),
        );
    }
    caps
}

/// Connects to the WebDriver instance
async fn connect_to_webdriver(webdriver_url: &str, headless: bool) -> Result<Client, FetchError> {
    let caps = capabilities(headless);

    let first_error = match try_connect(webdriver_url, &caps).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                webdriver_url,
                e
            );
            e.to_string()
        }
    };

    for url in FALLBACK_WEBDRIVER_URLS {
        if url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = try_connect(url, &caps).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(FetchError::Connect(format!(
        "no WebDriver reachable at {}: {}",
        webdriver_url, first_error
    )))
}

async fn try_connect(
    webdriver_url: &str,
    caps: &Capabilities,
) -> Result<Client, fantoccini::error::NewSessionError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(caps.clone());
    builder.connect(webdriver_url).await
}

/// Maps a WebDriver command error to a navigation failure
fn navigation_error(error: fantoccini::error::CmdError, context: &str, url: &Url) -> FetchError {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while {} {}", context, url);
    } else {
        ::log::error!("Failed {} {}: {}", context, url, error);
    }
    FetchError::Navigation {
        url: url.to_string(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_capabilities() {
        let caps = capabilities(true);
        assert!(caps.contains_key("goog:chromeOptions"));
        assert!(caps.contains_key("moz:firefoxOptions"));
        assert!(capabilities(false).is_empty());
    }
}
