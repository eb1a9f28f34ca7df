use tracing::debug;

use crate::api::{FetchOutcome, MarketDataProvider, ProviderError};
use crate::models::Fundamentals;

/// Outcome of validating one ticker. "No data" and "the provider broke"
/// are deliberately distinct variants so a future retry policy can treat
/// them differently; today the processing flow skips both.
#[derive(Debug)]
pub enum Validation {
    /// The ticker has usable balance sheet data; the fetched fundamentals
    /// ride along so the caller does not fetch twice.
    Valid(Fundamentals),
    NoData,
    Failed(ProviderError),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }
}

/// A ticker is valid when the provider returns at least one quarterly
/// balance sheet row with a usable equity value. Provider errors never
/// propagate out of here.
pub async fn validate(provider: &dyn MarketDataProvider, ticker: &str) -> Validation {
    match provider.fetch_fundamentals(ticker).await {
        Ok(FetchOutcome::Found(fundamentals)) => {
            let has_equity = fundamentals
                .balance_sheets
                .iter()
                .any(|row| row.total_stockholder_equity.is_some());
            if has_equity {
                debug!("ticker '{}' valid", ticker);
                Validation::Valid(fundamentals)
            } else {
                debug!("ticker '{}' has no usable equity field", ticker);
                Validation::NoData
            }
        }
        Ok(FetchOutcome::NotFound) => Validation::NoData,
        Err(e) => Validation::Failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataProvider;
    use crate::models::{CompanyProfile, QuarterlyBalanceSheet};
    use reqwest::StatusCode;

    fn fundamentals_with_equity(equity: Option<f64>) -> Fundamentals {
        Fundamentals {
            balance_sheets: vec![QuarterlyBalanceSheet {
                end_date: None,
                total_stockholder_equity: equity,
                cash: None,
                long_term_debt: None,
                current_debt: None,
            }],
            income_statements: Vec::new(),
            profile: CompanyProfile::default(),
        }
    }

    #[tokio::test]
    async fn equity_row_makes_a_ticker_valid() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_fetch_fundamentals()
            .returning(|_| Ok(FetchOutcome::Found(fundamentals_with_equity(Some(100.0)))));

        assert!(validate(&provider, "AAPL").await.is_valid());
    }

    #[tokio::test]
    async fn missing_equity_is_no_data() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_fetch_fundamentals()
            .returning(|_| Ok(FetchOutcome::Found(fundamentals_with_equity(None))));

        assert!(matches!(validate(&provider, "X").await, Validation::NoData));
    }

    #[tokio::test]
    async fn empty_balance_sheet_is_no_data() {
        let mut provider = MockMarketDataProvider::new();
        provider.expect_fetch_fundamentals().returning(|_| {
            Ok(FetchOutcome::Found(Fundamentals::default()))
        });

        assert!(matches!(validate(&provider, "X").await, Validation::NoData));
    }

    #[tokio::test]
    async fn provider_not_found_is_no_data() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_fetch_fundamentals()
            .returning(|_| Ok(FetchOutcome::NotFound));

        assert!(matches!(validate(&provider, "X").await, Validation::NoData));
    }

    #[tokio::test]
    async fn provider_errors_are_contained() {
        let mut provider = MockMarketDataProvider::new();
        provider.expect_fetch_fundamentals().returning(|_| {
            Err(ProviderError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_owned(),
            })
        });

        assert!(matches!(validate(&provider, "X").await, Validation::Failed(_)));
    }
}
