use serde::{Deserialize, Serialize};

/// An editable allocation row. Either field may be incomplete while editing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationRow {
    pub ticker: String,
    /// Percentage weight; `None` until the user enters one.
    pub weight: Option<f64>,
}

impl AllocationRow {
    pub fn new(ticker: impl Into<String>, weight: f64) -> Self {
        Self {
            ticker: ticker.into(),
            weight: Some(weight),
        }
    }

    /// Placeholder row appended by "Add Asset".
    pub fn blank() -> Self {
        Self::default()
    }

    /// A row counts toward a save only with a non-blank ticker and a weight.
    pub fn is_complete(&self) -> bool {
        !self.ticker.trim().is_empty() && self.weight.is_some()
    }
}

/// A single-field edit applied to one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowEdit {
    Ticker(String),
    Weight(Option<f64>),
}

/// Lifecycle of the allocation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableState {
    /// Rows mirror the last persisted snapshot.
    Loaded,
    /// Rows were edited in memory and not saved yet.
    Dirty,
}

impl std::fmt::Display for TableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableState::Loaded => write!(f, "Loaded"),
            TableState::Dirty => write!(f, "Dirty"),
        }
    }
}
