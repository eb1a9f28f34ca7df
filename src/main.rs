mod analysis;
mod api;
mod models;
mod pipeline;
mod report;
mod screening;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::api::YahooClient;
use crate::models::Config;
use crate::screening::{ScreeningFetcher, TickerAggregator};

#[derive(Parser)]
#[command(
    name = "value-screener",
    about = "Monthly value screening workflow: fetch screening pages, aggregate tickers, compute valuation metrics, write a dated CSV report",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Log into the screening site and save one results page per market cap threshold
    Fetch,
    /// Parse saved screening pages into the deduplicated ticker list
    Aggregate,
    /// Validate and process the ticker list, then write the report
    Process,
    /// Run the full workflow (default)
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Fetch => run_fetch(&config).await?,
        Command::Aggregate => {
            run_aggregate(&config)?;
        }
        Command::Process => run_process(&config).await?,
        Command::Run => {
            info!("starting value screening workflow");
            run_fetch(&config).await?;
            run_aggregate(&config)?;
            run_process(&config).await?;
            info!("value screening workflow completed successfully");
        }
    }

    Ok(())
}

async fn run_fetch(config: &Config) -> Result<()> {
    info!("fetching screening pages from the screening site");
    let fetcher = ScreeningFetcher::new(config)?;
    fetcher.fetch_all(&config.market_caps).await?;
    info!("screening pages fetched");
    Ok(())
}

fn run_aggregate(config: &Config) -> Result<Vec<String>> {
    info!("collecting tickers from screening pages");
    let aggregator = TickerAggregator::new(config);
    let tickers = aggregator.aggregate(&config.market_caps)?;
    info!(
        "ticker list created at {} ({} tickers)",
        config.ticker_list_path.display(),
        tickers.len()
    );
    Ok(tickers)
}

async fn run_process(config: &Config) -> Result<()> {
    info!("validating and processing tickers");
    let provider = YahooClient::new(config)?;
    let records = pipeline::process_ticker_file(&provider, &config.ticker_list_path).await;
    info!("all tickers processed, total valid tickers: {}", records.len());

    let path = report::write_report(&records, &config.output_dir)?;
    info!("final report written to {}", path.display());
    Ok(())
}
