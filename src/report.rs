use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::info;

use crate::models::TickerMetrics;

/// Report file name for a given run date, e.g. `value_screen_2026_August.csv`.
pub fn report_file_name(date: NaiveDate) -> String {
    format!("value_screen_{}.csv", date.format("%Y_%B"))
}

/// Serialize the processed records to a dated CSV file under `output_dir`,
/// header first, rows in input order. Any filesystem failure here is fatal
/// and surfaced to the caller.
pub fn write_report(records: &[TickerMetrics], output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory {}", output_dir.display()))?;

    let path = output_dir.join(report_file_name(Local::now().date_naive()));
    write_report_to(records, &path)?;
    Ok(path)
}

fn write_report_to(records: &[TickerMetrics], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create report file {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .flush()
        .with_context(|| format!("cannot write report file {}", path.display()))?;

    info!("final report created at {} ({} rows)", path.display(), records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use pretty_assertions::assert_eq;

    fn record(ticker: &str) -> TickerMetrics {
        TickerMetrics {
            ticker: ticker.to_owned(),
            stock_name: "Apple Inc.".to_owned(),
            equity: 100,
            cash: 20,
            debt: 30,
            market_cap: 900,
            faustmann: 10.0,
            roic: 0.308,
            debt_to_equity: 0.3,
            price_earnings: 25.0,
        }
    }

    #[test]
    fn file_name_encodes_year_and_month() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(report_file_name(date), "value_screen_2026_August.csv");
    }

    #[test]
    fn writes_header_and_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&[record("AAPL"), record("MSFT")], dir.path()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Ticker,Stock name,Equity,Cash,Debt,Market cap,Faustmann,ROIC,Debt to equity,P/E"
        );
        assert!(lines[1].starts_with("AAPL,Apple Inc.,100,20,30,900,10.0,0.308,0.3,25"));
        assert!(lines[2].starts_with("MSFT,"));
    }

    #[test]
    fn report_name_uses_the_current_month() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&[record("AAPL")], dir.path()).unwrap();

        let today = Local::now().date_naive();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.contains(&today.year().to_string()));
    }

    #[test]
    fn empty_run_still_produces_a_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&[], dir.path()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn unwritable_directory_is_fatal() {
        let result = write_report(&[record("AAPL")], Path::new("/dev/null/impossible"));
        assert!(result.is_err());
    }
}
