use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One quarterly balance sheet row, most useful fields only.
/// Rows are ordered most-recent-first, matching the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QuarterlyBalanceSheet {
    pub end_date: Option<NaiveDate>,
    pub total_stockholder_equity: Option<f64>,
    pub cash: Option<f64>,
    pub long_term_debt: Option<f64>,
    pub current_debt: Option<f64>,
}

/// One quarterly income statement row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QuarterlyIncomeStatement {
    pub end_date: Option<NaiveDate>,
    pub net_income: Option<f64>,
}

/// Company metadata reported alongside the statements.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub market_cap: Option<f64>,
    pub current_price: Option<f64>,
    pub trailing_eps: Option<f64>,
}

/// Everything the provider returns for one ticker.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Fundamentals {
    /// Quarterly balance sheet rows, most recent first.
    pub balance_sheets: Vec<QuarterlyBalanceSheet>,
    /// Quarterly income statement rows, most recent first.
    pub income_statements: Vec<QuarterlyIncomeStatement>,
    pub profile: CompanyProfile,
}

/// Computed valuation metrics for one ticker. Field order matches the
/// report columns; the serde renames are the CSV header names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerMetrics {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Stock name")]
    pub stock_name: String,
    #[serde(rename = "Equity")]
    pub equity: i64,
    #[serde(rename = "Cash")]
    pub cash: i64,
    #[serde(rename = "Debt")]
    pub debt: i64,
    #[serde(rename = "Market cap")]
    pub market_cap: i64,
    #[serde(rename = "Faustmann")]
    pub faustmann: f64,
    #[serde(rename = "ROIC")]
    pub roic: f64,
    #[serde(rename = "Debt to equity")]
    pub debt_to_equity: f64,
    #[serde(rename = "P/E")]
    pub price_earnings: f64,
}

/// Login credentials for the screening site.
#[derive(Debug, Clone)]
pub struct ScreenerCredentials {
    pub username: String,
    pub password: String,
}

/// Market cap thresholds (in millions) submitted to the screener, one
/// results page per threshold.
pub const DEFAULT_MARKET_CAPS: [u64; 13] = [
    250, 500, 1000, 1500, 2500, 5000, 10000, 25000, 50000, 75000, 100000, 250000, 500000,
];

/// Process-wide configuration, passed into each component at construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory that receives the ticker list and the final report.
    pub output_dir: PathBuf,
    /// Directory holding the per-threshold screening HTML files.
    pub results_dir: PathBuf,
    /// Aggregated ticker list, one symbol per line.
    pub ticker_list_path: PathBuf,
    pub screener_base_url: String,
    pub screener_credentials: Option<ScreenerCredentials>,
    pub provider_base_url: String,
    pub request_timeout_secs: u64,
    pub rate_limit_per_minute: u32,
    pub market_caps: Vec<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let output_dir = PathBuf::from(
            std::env::var("SCREENER_OUTPUT_DIR").unwrap_or_else(|_| "monthly_value_screen".to_string()),
        );
        let results_dir = match std::env::var("SCREENER_RESULTS_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => output_dir.join("screening_html"),
        };
        let ticker_list_path = output_dir.join("tickers.csv");

        // Credentials are only required by the fetch stage; the fetcher
        // rejects a config without them.
        let screener_credentials = match (
            std::env::var("SCREENER_USERNAME"),
            std::env::var("SCREENER_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) => Some(ScreenerCredentials { username, password }),
            _ => None,
        };

        Ok(Config {
            output_dir,
            results_dir,
            ticker_list_path,
            screener_base_url: std::env::var("SCREENER_BASE_URL")
                .unwrap_or_else(|_| "https://www.magicformulainvesting.com".to_string()),
            screener_credentials,
            provider_base_url: std::env::var("MARKET_DATA_BASE_URL")
                .unwrap_or_else(|_| "https://query2.finance.yahoo.com".to_string()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            rate_limit_per_minute: std::env::var("RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(120),
            market_caps: DEFAULT_MARKET_CAPS.to_vec(),
        })
    }
}
