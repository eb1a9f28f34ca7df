use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{ApiRateLimiter, FetchOutcome, MarketDataProvider, ProviderError};
use crate::models::{
    CompanyProfile, Config, Fundamentals, QuarterlyBalanceSheet, QuarterlyIncomeStatement,
};

/// quoteSummary modules needed to compute the report metrics.
const MODULES: &str = "balanceSheetHistoryQuarterly,incomeStatementHistoryQuarterly,price,defaultKeyStatistics,financialData";

/// Market data client for the Yahoo Finance quoteSummary API.
pub struct YahooClient {
    client: Client,
    base_url: String,
    rate_limiter: ApiRateLimiter,
}

impl YahooClient {
    /// Create a new client from the shared configuration.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .user_agent("value-screener/0.1")
            .build()?;

        Ok(Self {
            client,
            base_url: config.provider_base_url.trim_end_matches('/').to_string(),
            rate_limiter: ApiRateLimiter::new(config.rate_limit_per_minute),
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_fundamentals(&self, ticker: &str) -> Result<FetchOutcome, ProviderError> {
        self.rate_limiter.wait().await;

        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}",
            self.base_url, ticker, MODULES
        );
        debug!("requesting fundamentals for {}", ticker);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let body = response.text().await?;
        let envelope: QuoteSummaryEnvelope = serde_json::from_str(&body)?;
        let summary = envelope.quote_summary;

        if let Some(error) = summary.error {
            if error.is_not_found() {
                return Ok(FetchOutcome::NotFound);
            }
            return Err(ProviderError::Status {
                status: StatusCode::BAD_GATEWAY,
                body: format!("{}: {}", error.code, error.description.unwrap_or_default()),
            });
        }

        match summary.result.unwrap_or_default().into_iter().next() {
            Some(result) => Ok(FetchOutcome::Found(result.into_fundamentals())),
            None => Ok(FetchOutcome::NotFound),
        }
    }
}

// ----------------------------------------------------------------------------
// Wire format
// ----------------------------------------------------------------------------

/// Numeric fields arrive as `{"raw": 123.0, "fmt": "123"}`.
#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

impl RawValue {
    fn value(field: &Option<RawValue>) -> Option<f64> {
        field.as_ref().and_then(|v| v.raw)
    }

    fn date(field: &Option<RawValue>) -> Option<NaiveDate> {
        Self::value(field)
            .and_then(|ts| DateTime::from_timestamp(ts as i64, 0))
            .map(|dt| dt.date_naive())
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<QuoteSummaryResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: Option<String>,
}

impl ApiError {
    fn is_not_found(&self) -> bool {
        self.code.eq_ignore_ascii_case("not found")
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.contains("Quote not found"))
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "balanceSheetHistoryQuarterly")]
    balance_sheet_history: Option<BalanceSheetHistory>,
    #[serde(rename = "incomeStatementHistoryQuarterly")]
    income_statement_history: Option<IncomeStatementHistory>,
    price: Option<PriceModule>,
    #[serde(rename = "defaultKeyStatistics")]
    key_statistics: Option<KeyStatisticsModule>,
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Deserialize)]
struct BalanceSheetHistory {
    #[serde(rename = "balanceSheetStatements", default)]
    statements: Vec<RawBalanceSheet>,
}

#[derive(Debug, Deserialize)]
struct RawBalanceSheet {
    #[serde(rename = "endDate")]
    end_date: Option<RawValue>,
    #[serde(rename = "totalStockholderEquity")]
    total_stockholder_equity: Option<RawValue>,
    cash: Option<RawValue>,
    #[serde(rename = "longTermDebt")]
    long_term_debt: Option<RawValue>,
    #[serde(rename = "shortLongTermDebt")]
    short_long_term_debt: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct IncomeStatementHistory {
    #[serde(rename = "incomeStatementHistory", default)]
    statements: Vec<RawIncomeStatement>,
}

#[derive(Debug, Deserialize)]
struct RawIncomeStatement {
    #[serde(rename = "endDate")]
    end_date: Option<RawValue>,
    #[serde(rename = "netIncome")]
    net_income: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct PriceModule {
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "marketCap")]
    market_cap: Option<RawValue>,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct KeyStatisticsModule {
    #[serde(rename = "trailingEps")]
    trailing_eps: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "currentPrice")]
    current_price: Option<RawValue>,
}

impl QuoteSummaryResult {
    fn into_fundamentals(self) -> Fundamentals {
        let balance_sheets = self
            .balance_sheet_history
            .map(|h| h.statements)
            .unwrap_or_default()
            .into_iter()
            .map(|row| QuarterlyBalanceSheet {
                end_date: RawValue::date(&row.end_date),
                total_stockholder_equity: RawValue::value(&row.total_stockholder_equity),
                cash: RawValue::value(&row.cash),
                long_term_debt: RawValue::value(&row.long_term_debt),
                current_debt: RawValue::value(&row.short_long_term_debt),
            })
            .collect();

        let income_statements = self
            .income_statement_history
            .map(|h| h.statements)
            .unwrap_or_default()
            .into_iter()
            .map(|row| QuarterlyIncomeStatement {
                end_date: RawValue::date(&row.end_date),
                net_income: RawValue::value(&row.net_income),
            })
            .collect();

        let current_price = self
            .financial_data
            .and_then(|d| d.current_price)
            .and_then(|v| v.raw)
            .or_else(|| {
                self.price
                    .as_ref()
                    .and_then(|p| RawValue::value(&p.regular_market_price))
            });

        let profile = CompanyProfile {
            name: self.price.as_ref().and_then(|p| p.long_name.clone()),
            market_cap: self.price.as_ref().and_then(|p| RawValue::value(&p.market_cap)),
            current_price,
            trailing_eps: self
                .key_statistics
                .and_then(|s| RawValue::value(&s.trailing_eps)),
        };

        Fundamentals {
            balance_sheets,
            income_statements,
            profile,
        }
    }
}
