use std::path::Path;

use tracing::{info, warn};

use crate::analysis::{compute_metrics, validate, Validation};
use crate::api::MarketDataProvider;
use crate::models::TickerMetrics;
use crate::screening::ticker_list;

/// Validate and process tickers in list order, collecting the metrics of
/// every ticker that survives both steps. Output order is input order
/// restricted to successes; nothing a single ticker does aborts the loop.
pub async fn process_all(
    provider: &dyn MarketDataProvider,
    tickers: &[String],
) -> Vec<TickerMetrics> {
    let mut processed = Vec::new();

    for ticker in tickers {
        match validate(provider, ticker).await {
            Validation::Valid(fundamentals) => match compute_metrics(ticker, &fundamentals) {
                Some(metrics) => {
                    info!("successfully processed ticker: {}", ticker);
                    processed.push(metrics);
                }
                None => warn!("metrics unavailable for {}, skipping", ticker),
            },
            Validation::NoData => {
                warn!("skipping invalid ticker or missing data: {}", ticker);
            }
            Validation::Failed(e) => {
                warn!("skipping {}: provider error: {}", ticker, e);
            }
        }
    }

    processed
}

/// Read the persisted ticker list and process every symbol in it.
pub async fn process_ticker_file(
    provider: &dyn MarketDataProvider,
    path: &Path,
) -> Vec<TickerMetrics> {
    let tickers = ticker_list::read_tickers(path);
    info!("processing {} tickers from {}", tickers.len(), path.display());
    process_all(provider, &tickers).await
}
