use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::errors::CoreError;
use crate::models::portfolio::AllocationEntry;

/// Header of the allocation file.
pub const PORTFOLIO_HEADER: [&str; 3] = ["Date", "Ticker", "Weight"];

/// Header of the benchmark registry file.
pub const BENCHMARK_HEADER: [&str; 3] = ["Name", "Tickers", "Weights"];

/// One line of the allocation file.
///
/// Layout:
/// ```text
/// Date,Ticker,Weight
/// 2024-01-01,AAPL,40
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Weight")]
    pub weight: f64,
}

impl From<&AllocationEntry> for AllocationRecord {
    fn from(entry: &AllocationEntry) -> Self {
        Self {
            date: entry.as_of,
            ticker: entry.ticker.clone(),
            weight: entry.weight,
        }
    }
}

impl From<AllocationRecord> for AllocationEntry {
    fn from(record: AllocationRecord) -> Self {
        AllocationEntry::new(record.ticker, record.weight, record.date)
    }
}

/// Read every record of a headered CSV file. Fields are trimmed.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

/// Replace `path` with a CSV holding `header` followed by `records`.
///
/// The content goes to a temporary file in the destination directory that
/// is then renamed over `path`, so readers see either the old file or the
/// complete new one. The header is written even when `records` is empty.
pub fn write_records_atomically<T: Serialize>(
    path: &Path,
    header: &[&str],
    records: &[T],
) -> Result<(), CoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file());
        writer.write_record(header)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
