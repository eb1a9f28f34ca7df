use tracing::{debug, warn};

use crate::models::{Fundamentals, TickerMetrics};

/// Compute the report metrics for one ticker from its raw statements.
///
/// Level fields come from the most recent quarter, absent values counting
/// as zero. Every ratio resolves to 0.0 on a zero denominator instead of
/// erroring. Returns `None` when a whole statement is missing, which the
/// caller must treat as a skip rather than a failure.
pub fn compute_metrics(ticker: &str, fundamentals: &Fundamentals) -> Option<TickerMetrics> {
    if fundamentals.balance_sheets.is_empty() || fundamentals.income_statements.is_empty() {
        warn!("no financial statements available for {}, skipping", ticker);
        return None;
    }

    let latest = &fundamentals.balance_sheets[0];
    let equity = dollars(latest.total_stockholder_equity);
    let cash = dollars(latest.cash);
    let debt = dollars(latest.long_term_debt) + dollars(latest.current_debt);

    let profile = &fundamentals.profile;
    let market_cap = dollars(profile.market_cap);

    let faustmann = ratio(market_cap as f64, (equity + cash - debt) as f64, 3);

    // TTM net income: up to the four most recent quarters, absent
    // quarters count as zero.
    let net_income_ttm: i64 = fundamentals
        .income_statements
        .iter()
        .take(4)
        .map(|quarter| dollars(quarter.net_income))
        .sum();

    let roic = ratio(net_income_ttm as f64, (equity + debt) as f64, 3);
    let debt_to_equity = ratio(debt as f64, equity as f64, 3);
    let price_earnings = ratio(
        profile.current_price.unwrap_or(0.0),
        profile.trailing_eps.unwrap_or(0.0),
        2,
    );

    let metrics = TickerMetrics {
        ticker: ticker.to_owned(),
        stock_name: profile.name.clone().unwrap_or_else(|| "N/A".to_owned()),
        equity,
        cash,
        debt,
        market_cap,
        faustmann,
        roic,
        debt_to_equity,
        price_earnings,
    };
    debug!("computed metrics for {}: {:?}", ticker, metrics);
    Some(metrics)
}

fn dollars(value: Option<f64>) -> i64 {
    value.unwrap_or(0.0) as i64
}

fn ratio(numerator: f64, denominator: f64, places: u32) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let scale = 10f64.powi(places as i32);
    (numerator / denominator * scale).round() / scale
}
