use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use scrape_table::config::{BackendConfig, HttpConfig, WebDriverConfig};
use scrape_table::links::{LinkPatternConfig, LinkRowsConfig};
use scrape_table::output::Format;
use scrape_table::{ConfigError, ScrapeConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scrape-table")]
#[command(about = "Scrapes listing and detail pages into a typed table")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a listing page, follow its links and tabulate the detail pages
    Scrape(ScrapeArgs),

    /// Tabulate a saved text dump (blank-line separated blocks)
    ParseText(ParseTextArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ScrapeArgs {
    /// Listing page URL (overrides the config file)
    #[arg(required_unless_present = "config")]
    pub listing_url: Option<String>,

    /// Path to a JSON scrape configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Follow links whose href/src contains this text
    #[arg(long, conflicts_with = "regex")]
    pub contains: Option<String>,

    /// Follow links whose href/src matches this regex
    #[arg(long)]
    pub regex: Option<String>,

    /// Tabulate the matched links instead of following them, naming each row
    /// by this attribute (e.g. title)
    #[arg(long, value_name = "ATTRIBUTE")]
    pub link_rows: Option<String>,

    /// Prefix removed from every link row name
    #[arg(long, requires = "link_rows")]
    pub strip_prefix: Option<String>,

    /// CSS selector for row blocks on each detail page
    #[arg(short, long)]
    pub block_selector: Option<String>,

    /// Leading blocks to skip on each page (header rows)
    #[arg(long)]
    pub skip_blocks: Option<usize>,

    /// Page fetching backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Per-page timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ClapArgs, Debug)]
pub struct ParseTextArgs {
    /// Text file to read
    pub file: PathBuf,

    /// Leading blocks to skip (header rows)
    #[arg(long, default_value_t = 0)]
    pub skip_blocks: usize,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ClapArgs, Debug)]
pub struct OutputArgs {
    /// Output file (defaults to a name derived from the URL or file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Csv)]
    pub format: FormatArg,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Webdriver,
    Http,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => Format::Csv,
            FormatArg::Json => Format::Json,
        }
    }
}

impl ScrapeArgs {
    /// Loads the config file, if any, and applies the command-line overrides
    pub fn to_config(&self) -> Result<ScrapeConfig, ConfigError> {
        let mut config = match (&self.config, &self.listing_url) {
            (Some(path), _) => ScrapeConfig::from_file(path)?,
            (None, Some(url)) => ScrapeConfig::new(url),
            (None, None) => {
                return Err(ConfigError::Url {
                    url: String::new(),
                    reason: "no listing URL or config file given".to_string(),
                });
            }
        };

        if let Some(url) = &self.listing_url {
            config.listing_url = url.clone();
        }
        if let Some(needle) = &self.contains {
            config.link_pattern = Some(LinkPatternConfig::Contains(needle.clone()));
        }
        if let Some(regex) = &self.regex {
            config.link_pattern = Some(LinkPatternConfig::Regex(regex.clone()));
        }
        if let Some(name_attribute) = &self.link_rows {
            config.link_rows = Some(LinkRowsConfig {
                name_attribute: name_attribute.clone(),
                strip_prefix: self.strip_prefix.clone(),
            });
        }
        if let Some(selector) = &self.block_selector {
            config.block_selector = selector.clone();
        }
        if let Some(skip) = self.skip_blocks {
            config.skip_blocks = skip;
        }

        match (self.backend, &config.backend) {
            (Some(BackendArg::Http), BackendConfig::WebDriver(_)) => {
                config.backend = BackendConfig::Http(HttpConfig::default());
            }
            (Some(BackendArg::Webdriver), BackendConfig::Http(_)) => {
                config.backend = BackendConfig::WebDriver(WebDriverConfig::default());
            }
            _ => {}
        }

        config.apply_env();

        match &mut config.backend {
            BackendConfig::WebDriver(web) => {
                if let Some(url) = &self.webdriver_url {
                    web.webdriver_url = url.clone();
                }
                if let Some(secs) = self.timeout {
                    web.page_timeout_secs = secs;
                }
            }
            BackendConfig::Http(http) => {
                if let Some(secs) = self.timeout {
                    http.page_timeout_secs = secs;
                }
            }
        }

        Ok(config)
    }
}
