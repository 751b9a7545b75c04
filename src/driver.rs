use crate::config::Plan;
use crate::errors::ScrapeError;
use crate::fetchers::PageFetcher;
use crate::parsers::RawBlock;
use crate::parsers::html::Page;
use crate::parsers::text;
use crate::table::{ResultTable, TableAssembler};

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    FetchingListing,
    CollectingLinks,
    /// Working on the link with this discovery index
    ProcessingLink(usize),
    Assembling,
    Done,
    Failed,
}

impl State {
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Done | State::Failed)
    }
}

/// Everything a successful run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub table: ResultTable,

    /// Per-link and per-row failures, in the order they happened
    pub failures: Vec<ScrapeError>,

    /// Ratings that could not be coerced; their rows were kept
    pub warnings: Vec<ScrapeError>,

    /// Number of detail pages attempted
    pub pages: usize,
}

/// Terminal result of [`PipelineDriver::run`]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done(RunReport),
    /// The run could not start; the table is always empty
    Failed {
        error: ScrapeError,
        table: ResultTable,
    },
}

impl Outcome {
    pub fn table(&self) -> &ResultTable {
        match self {
            Outcome::Done(report) => &report.table,
            Outcome::Failed { table, .. } => table,
        }
    }

    /// Recoverable failures; always empty for a failed run
    pub fn failures(&self) -> &[ScrapeError] {
        match self {
            Outcome::Done(report) => &report.failures,
            Outcome::Failed { .. } => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Drives one scrape run from listing page to assembled table
///
/// Only a failure on the listing page ends the run early. Failures on detail
/// pages and rows are recorded and the run moves on.
pub struct PipelineDriver<'a> {
    plan: &'a Plan,
    state: State,
}

impl<'a> PipelineDriver<'a> {
    pub fn new(plan: &'a Plan) -> Self {
        Self {
            plan,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn transition(&mut self, next: State) {
        ::log::trace!("Driver state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Runs the pipeline with the given fetcher
    ///
    /// The fetcher is borrowed, not closed; closing it is the caller's job (see
    /// [`run_with`](crate::run_with)).
    pub async fn run<F: PageFetcher>(&mut self, fetcher: &mut F) -> Outcome {
        let plan = self.plan;

        self.transition(State::FetchingListing);
        ::log::info!("Fetching listing page {}", plan.listing_url);
        let listing = match fetcher.fetch(&plan.listing_url).await {
            Ok(page) => page,
            Err(e) => {
                ::log::error!("Listing page unavailable: {}", e);
                self.transition(State::Failed);
                return Outcome::Failed {
                    error: ScrapeError::Fetch(e),
                    table: ResultTable::with_columns(plan.columns.clone()),
                };
            }
        };

        self.transition(State::CollectingLinks);
        let mut assembler = TableAssembler::new(plan.columns.clone());
        let mut warnings = Vec::new();
        let mut pages = 0;

        match (&plan.links, &plan.link_rows) {
            (None, _) => {
                ::log::info!("No link pattern; scraping the listing page itself");
                self.transition(State::ProcessingLink(0));
                pages += 1;
                if let Err(e) = extract_rows(plan, &listing, &mut assembler, &mut warnings) {
                    ::log::warn!("Skipping {}: {}", listing.url(), e);
                    assembler.record(e);
                }
            }
            (Some(collector), Some(link_rows)) => {
                let found = collector.collect_elements(&listing);
                ::log::info!("Tabulating {} links from the listing page", found.len());
                for row in link_rows.rows(&found) {
                    assembler.push(Ok(row));
                }
            }
            (Some(collector), None) => {
                let links = collector.collect(&listing);
                drop(listing);
                ::log::info!("Found {} links to scrape", links.len());

                for link in links {
                    self.transition(State::ProcessingLink(link.index));
                    pages += 1;
                    ::log::info!("Scraping link {}: {}", link.index, link.url);

                    let result = match fetcher.fetch(&link.url).await {
                        Ok(page) => extract_rows(plan, &page, &mut assembler, &mut warnings),
                        Err(e) => Err(ScrapeError::Fetch(e)),
                    };

                    if let Err(e) = result {
                        ::log::warn!("Skipping {}: {}", link.url, e);
                        assembler.record(e);
                    }
                }
            }
        }

        self.transition(State::Assembling);
        let assembled = assembler.finish();
        ::log::info!(
            "Assembled {} rows from {} pages ({} failures, {} warnings)",
            assembled.table.len(),
            pages,
            assembled.failures.len(),
            warnings.len()
        );

        self.transition(State::Done);
        Outcome::Done(RunReport {
            table: assembled.table,
            failures: assembled.failures,
            warnings,
            pages,
        })
    }
}

/// Extracts every row block of one detail page into the assembler
///
/// Row-level problems are recorded and skipped. The page as a whole fails when
/// the block selector matches nothing or no row parses.
fn extract_rows(
    plan: &Plan,
    page: &Page,
    assembler: &mut TableAssembler,
    warnings: &mut Vec<ScrapeError>,
) -> Result<(), ScrapeError> {
    let url = page.url().to_string();
    let elements = page.select(&plan.block_selector);
    if elements.is_empty() {
        return Err(ScrapeError::MissingElement {
            url,
            selector: plan.block_selector_text.clone(),
        });
    }

    let added = push_blocks(
        plan,
        &url,
        elements.iter().map(|e| e.text()),
        assembler,
        warnings,
    );
    if added == 0 {
        return Err(ScrapeError::NoRows { url });
    }
    ::log::debug!("Extracted {} rows from {}", added, url);
    Ok(())
}

/// Normalizes and parses each block, returning how many rows were accepted
fn push_blocks<I>(
    plan: &Plan,
    url: &str,
    texts: I,
    assembler: &mut TableAssembler,
    warnings: &mut Vec<ScrapeError>,
) -> usize
where
    I: IntoIterator<Item = String>,
{
    let before = assembler.row_count();
    for (row, text) in texts.into_iter().enumerate().skip(plan.skip_blocks) {
        let block = RawBlock::new(url, text);
        match plan.parser.parse_block(&block) {
            Ok(parsed) => {
                if let Some(value) = parsed.uncoerced_rating {
                    let warning = ScrapeError::Coercion {
                        url: url.to_string(),
                        row,
                        value,
                    };
                    ::log::debug!("{}", warning);
                    warnings.push(warning);
                }
                assembler.push(Ok(parsed.row));
            }
            Err(e) => assembler.push(Err(ScrapeError::Parse {
                url: url.to_string(),
                row,
                fields: e.fields,
                expected: e.expected,
            })),
        }
    }
    assembler.row_count() - before
}

/// Builds a table from a plain-text dump instead of fetched pages
///
/// Blank lines separate blocks. Failures are attributed to the plan's listing URL.
pub fn parse_text(plan: &Plan, text: &str) -> RunReport {
    let url = plan.listing_url.to_string();
    let mut assembler = TableAssembler::new(plan.columns.clone());
    let mut warnings = Vec::new();

    let added = push_blocks(
        plan,
        &url,
        text::blocks_from_text(text),
        &mut assembler,
        &mut warnings,
    );
    if added == 0 {
        assembler.record(ScrapeError::NoRows { url });
    }

    let assembled = assembler.finish();
    RunReport {
        table: assembled.table,
        failures: assembled.failures,
        warnings,
        pages: 1,
    }
}
