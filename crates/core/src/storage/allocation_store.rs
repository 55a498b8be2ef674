use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

use super::format::{self, AllocationRecord, PORTFOLIO_HEADER};

/// Durable home of the canonical allocation snapshot.
///
/// `save` replaces the whole snapshot; it never merges.
pub trait AllocationStore: Send + Sync {
    /// The persisted snapshot, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<Portfolio>, CoreError>;

    /// Replace the persisted snapshot. Must be all-or-nothing.
    fn save(&self, portfolio: &Portfolio) -> Result<(), CoreError>;

    /// Where the snapshot lives (for logs/errors).
    fn location(&self) -> String;
}

impl<S: AllocationStore + ?Sized> AllocationStore for Arc<S> {
    fn load(&self) -> Result<Option<Portfolio>, CoreError> {
        (**self).load()
    }

    fn save(&self, portfolio: &Portfolio) -> Result<(), CoreError> {
        (**self).save(portfolio)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

/// Allocation snapshot kept in a `Date,Ticker,Weight` CSV file.
#[derive(Debug, Clone)]
pub struct CsvAllocationStore {
    path: PathBuf,
}

impl CsvAllocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AllocationStore for CsvAllocationStore {
    fn load(&self) -> Result<Option<Portfolio>, CoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let records: Vec<AllocationRecord> = format::read_records(&self.path)?;
        tracing::debug!(path = %self.path.display(), rows = records.len(), "loaded allocation");
        Ok(Some(Portfolio::new(
            records.into_iter().map(Into::into).collect(),
        )))
    }

    fn save(&self, portfolio: &Portfolio) -> Result<(), CoreError> {
        let records: Vec<AllocationRecord> = portfolio.entries.iter().map(Into::into).collect();
        format::write_records_atomically(&self.path, &PORTFOLIO_HEADER, &records)?;
        tracing::debug!(path = %self.path.display(), rows = records.len(), "wrote allocation");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Allocation snapshot held in memory. Useful for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryAllocationStore {
    snapshot: Mutex<Option<Portfolio>>,
}

impl InMemoryAllocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `portfolio`.
    pub fn with_portfolio(portfolio: Portfolio) -> Self {
        Self {
            snapshot: Mutex::new(Some(portfolio)),
        }
    }

    /// Current snapshot, cloned.
    pub fn snapshot(&self) -> Option<Portfolio> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl AllocationStore for InMemoryAllocationStore {
    fn load(&self) -> Result<Option<Portfolio>, CoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, portfolio: &Portfolio) -> Result<(), CoreError> {
        *self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(portfolio.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
