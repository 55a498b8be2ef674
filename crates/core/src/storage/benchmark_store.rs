use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::models::benchmark::BenchmarkRecord;
use crate::services::benchmark_service::BenchmarkRegistry;

use super::format::{self, BENCHMARK_HEADER};

/// Benchmark registry kept in a `Name,Tickers,Weights` CSV file.
///
/// `Tickers` and `Weights` hold comma-joined positional lists, quoted by the
/// CSV writer, e.g. `"60% Equity / 40% Bonds","SPY,IEF","0.6,0.4"`.
#[derive(Debug, Clone)]
pub struct BenchmarkStore {
    path: PathBuf,
}

impl BenchmarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted records, or `None` if the file does not exist.
    pub fn load(&self) -> Result<Option<Vec<BenchmarkRecord>>, CoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let records: Vec<BenchmarkRecord> = format::read_records(&self.path)?;
        tracing::debug!(path = %self.path.display(), count = records.len(), "loaded benchmarks");
        Ok(Some(records))
    }

    pub fn save(&self, records: &[BenchmarkRecord]) -> Result<(), CoreError> {
        format::write_records_atomically(&self.path, &BENCHMARK_HEADER, records)
    }

    /// Load the registry, writing the built-in benchmarks first if the file is missing.
    pub fn load_or_seed(&self) -> Result<BenchmarkRegistry, CoreError> {
        match self.load()? {
            Some(records) => Ok(BenchmarkRegistry::new(records)),
            None => {
                let defaults = BenchmarkRecord::defaults();
                self.save(&defaults)?;
                tracing::info!(path = %self.path.display(), "seeded default benchmarks");
                Ok(BenchmarkRegistry::new(defaults))
            }
        }
    }
}
