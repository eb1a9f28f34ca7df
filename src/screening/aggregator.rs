use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use super::{extract_tickers, screening_file_name, ticker_list};
use crate::models::Config;

/// Combines per-threshold screening pages into one sorted, deduplicated
/// ticker list on disk.
pub struct TickerAggregator {
    results_dir: PathBuf,
    ticker_list_path: PathBuf,
}

impl TickerAggregator {
    pub fn new(config: &Config) -> Self {
        Self {
            results_dir: config.results_dir.clone(),
            ticker_list_path: config.ticker_list_path.clone(),
        }
    }

    /// Extract tickers from every threshold's saved page, union them, and
    /// persist the sorted unique list. A missing or unreadable page
    /// contributes zero tickers; failing to persist the final list is
    /// fatal for the run.
    pub fn aggregate(&self, market_caps: &[u64]) -> Result<Vec<String>> {
        info!("aggregating tickers for {} thresholds", market_caps.len());

        let mut unique = BTreeSet::new();
        for &cap in market_caps {
            let path = self.results_dir.join(screening_file_name(cap));
            let html = match fs::read_to_string(&path) {
                Ok(html) => html,
                Err(e) => {
                    warn!("cannot read {}: {}", path.display(), e);
                    continue;
                }
            };

            let tickers = extract_tickers(&html);
            if tickers.is_empty() {
                warn!("no tickers found in {}", path.display());
            } else {
                info!("retrieved {} tickers from {}", tickers.len(), path.display());
            }
            unique.extend(tickers);
        }

        let sorted: Vec<String> = unique.into_iter().collect();
        info!("total unique tickers found: {}", sorted.len());

        ticker_list::write_tickers(&self.ticker_list_path, &sorted)?;
        Ok(sorted)
    }
}
