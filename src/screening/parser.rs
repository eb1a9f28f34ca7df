use scraper::{Html, Selector};
use tracing::{info, warn};

/// Extract stock tickers from one screening results page.
///
/// The page is expected to contain a `<table class="screeningdata">` whose
/// body holds one row per stock, with the ticker in the second cell. A page
/// without that structure yields an empty list, never an error, so a broken
/// download cannot abort the aggregation.
pub fn extract_tickers(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Some(table) = document.select(&selector("table.screeningdata")).next() else {
        warn!("no table with class 'screeningdata' found in document");
        return Vec::new();
    };
    let Some(tbody) = table.select(&selector("tbody")).next() else {
        warn!("screening table has no tbody");
        return Vec::new();
    };

    let mut tickers = Vec::new();
    for row in tbody.select(&selector("tr")) {
        let cells: Vec<String> = row
            .select(&selector("td"))
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect();
        // Rows need at least rank + ticker columns.
        if cells.len() < 2 {
            continue;
        }
        if !cells[1].is_empty() {
            tickers.push(cells[1].clone());
        }
    }

    info!("extracted {} tickers", tickers.len());
    tickers
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}
