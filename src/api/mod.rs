use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::models::Fundamentals;

pub mod yahoo_client;
pub use yahoo_client::YahooClient;

/// Errors surfaced by a market data provider. Kept separate from
/// "no data for this ticker", which is a normal outcome, not an error.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("market data request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed market data payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result of a fundamentals lookup for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(Fundamentals),
    /// The provider knows nothing about this ticker.
    NotFound,
}

/// Common trait for market data clients
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MarketDataProvider {
    async fn fetch_fundamentals(&self, ticker: &str) -> Result<FetchOutcome, ProviderError>;
}

/// Simple rate limiter for API requests
pub struct ApiRateLimiter {
    delay: Duration,
}

impl ApiRateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        let delay = if requests_per_minute > 0 {
            Duration::from_millis(60_000 / requests_per_minute as u64)
        } else {
            Duration::from_secs(1)
        };

        Self { delay }
    }

    pub async fn wait(&self) {
        tokio::time::sleep(self.delay).await;
    }
}
