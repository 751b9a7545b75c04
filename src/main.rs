use clap::Parser;
use scrape_table::output::{self, Format};
use scrape_table::{Outcome, RunReport, ScrapeConfig, driver, utils};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use url::Url;

mod args;
use args::{Args, Command, OutputArgs, ParseTextArgs, ScrapeArgs};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Command::Scrape(scrape) => run_scrape(scrape).await,
        Command::ParseText(text) => run_parse_text(text),
    }
}

async fn run_scrape(args: ScrapeArgs) -> ExitCode {
    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    ::log::info!("Starting scrape of {}", config.listing_url);
    let start_time = std::time::Instant::now();

    let outcome = match scrape_table::run(&config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    ::log::info!(
        "Scrape finished in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );

    match outcome {
        Outcome::Done(report) => {
            let path = output_path(&args.output, &config.listing_url);
            finish(&report, &path, args.output.format.into())
        }
        Outcome::Failed { error, .. } => {
            ::log::error!("Scrape failed: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn run_parse_text(args: ParseTextArgs) -> ExitCode {
    let source = match std::path::absolute(&args.file) {
        Ok(path) => path,
        Err(e) => {
            ::log::error!("Cannot resolve {}: {}", args.file.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let source_url = match Url::from_file_path(&source) {
        Ok(url) => url.to_string(),
        Err(()) => {
            ::log::error!("Cannot turn {} into a URL", source.display());
            return ExitCode::FAILURE;
        }
    };

    let mut config = ScrapeConfig::new(&source_url);
    config.skip_blocks = args.skip_blocks;
    config.delimiter = args.delimiter;
    let plan = match config.compile() {
        Ok(plan) => plan,
        Err(e) => {
            ::log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let text = match std::fs::read_to_string(&args.file) {
        Ok(text) => text,
        Err(e) => {
            ::log::error!("Failed to read {}: {}", args.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let report = driver::parse_text(&plan, &text);
    let format = Format::from(args.output.format);
    let path = args
        .output
        .output
        .clone()
        .unwrap_or_else(|| args.file.with_extension(format!("table.{}", format.extension())));
    finish(&report, &path, format)
}

fn output_path(args: &OutputArgs, source: &str) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| utils::default_output_path(source, args.format.into()))
}

/// Logs the failure summary and writes the table
fn finish(report: &RunReport, path: &Path, format: Format) -> ExitCode {
    for failure in &report.failures {
        ::log::warn!("{}", failure);
    }
    ::log::info!(
        "{} rows, {} failures, {} warnings",
        report.table.len(),
        report.failures.len(),
        report.warnings.len()
    );

    let file = match File::create(path) {
        Ok(file) => file,
        Err(e) => {
            ::log::error!("Failed to create {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match output::write_table(&report.table, format, BufWriter::new(file)) {
        Ok(()) => {
            ::log::info!("Wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
