pub mod fixture;
pub mod http;
pub mod web;

use crate::errors::FetchError;
use crate::parsers::html::Page;
use std::future::Future;
use url::Url;

pub use fixture::FixtureFetcher;
pub use http::HttpFetcher;
pub use web::WebDriverFetcher;

/// Source of pages for a scrape run
///
/// A fetcher owns one session (browser, HTTP client) for the whole run and is
/// handed to the driver explicitly. Callers must `close` it when the run ends.
pub trait PageFetcher {
    /// Loads `url` and returns a snapshot of the rendered page
    fn fetch(&mut self, url: &Url) -> impl Future<Output = Result<Page, FetchError>>;

    /// Releases the underlying session
    fn close(self) -> impl Future<Output = ()>
    where
        Self: Sized;
}
