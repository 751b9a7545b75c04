// Re-export modules
pub mod config;
pub mod driver;
pub mod errors;
pub mod fetchers;
pub mod links;
pub mod output;
pub mod parsers;
pub mod table;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{BackendConfig, Plan, ScrapeConfig};
pub use driver::{Outcome, PipelineDriver, RunReport, State};
pub use errors::{ConfigError, ErrorKind, FetchError, ScrapeError};
pub use table::{ResultTable, Row};

use fetchers::{HttpFetcher, PageFetcher, WebDriverFetcher};

/// Runs a plan with an already opened fetcher, then closes the fetcher
///
/// The fetcher is closed whatever the outcome, including a failed listing page.
pub async fn run_with<F: PageFetcher>(plan: &Plan, mut fetcher: F) -> Outcome {
    let outcome = PipelineDriver::new(plan).run(&mut fetcher).await;
    fetcher.close().await;
    outcome
}

/// Compiles the configuration, opens the configured backend and runs the scrape
///
/// A backend that cannot be opened ends the run as [`Outcome::Failed`].
pub async fn run(config: &ScrapeConfig) -> Result<Outcome, ConfigError> {
    let plan = config.compile()?;

    let outcome = match &config.backend {
        BackendConfig::WebDriver(web) => {
            ::log::info!("Using WebDriver backend at {}", web.webdriver_url);
            match WebDriverFetcher::connect(web).await {
                Ok(fetcher) => run_with(&plan, fetcher).await,
                Err(e) => failed_to_start(&plan, e),
            }
        }
        BackendConfig::Http(http) => {
            ::log::info!("Using HTTP backend");
            match HttpFetcher::new(http) {
                Ok(fetcher) => run_with(&plan, fetcher).await,
                Err(e) => failed_to_start(&plan, e),
            }
        }
    };

    Ok(outcome)
}

fn failed_to_start(plan: &Plan, error: FetchError) -> Outcome {
    ::log::error!("Failed to start scraper: {}", error);
    Outcome::Failed {
        error: ScrapeError::Fetch(error),
        table: ResultTable::with_columns(plan.columns.clone()),
    }
}
