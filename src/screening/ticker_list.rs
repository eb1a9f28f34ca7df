use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

/// Read the aggregated ticker list, one symbol per line.
///
/// Blank lines and blank cells are skipped with a warning. An unreadable
/// file yields an empty list so a missing aggregation step surfaces as
/// "zero tickers processed" rather than a crash.
pub fn read_tickers(path: &Path) -> Vec<String> {
    let mut reader = match csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
    {
        Ok(reader) => reader,
        Err(e) => {
            error!("cannot read ticker list {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut tickers = Vec::new();
    for (line, record) in reader.records().enumerate() {
        match record {
            Ok(record) => {
                let ticker = record.get(0).map(str::trim).unwrap_or("");
                if ticker.is_empty() {
                    warn!(
                        "empty ticker on line {} of {}, skipping",
                        line + 1,
                        path.display()
                    );
                } else {
                    tickers.push(ticker.to_owned());
                }
            }
            Err(e) => warn!("unreadable line {} of {}: {}", line + 1, path.display(), e),
        }
    }

    info!("parsed {} tickers from {}", tickers.len(), path.display());
    tickers
}

/// Persist the aggregated ticker list, one symbol per line. Unlike the
/// read side, a write failure here is fatal for the run.
pub fn write_tickers(path: &Path, tickers: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("cannot open ticker list {}", path.display()))?;
    for ticker in tickers {
        writer.write_record([ticker.as_str()])?;
    }
    writer
        .flush()
        .with_context(|| format!("cannot write ticker list {}", path.display()))?;

    info!("wrote {} tickers to {}", tickers.len(), path.display());
    Ok(())
}
