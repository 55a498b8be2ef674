use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::allocation::{AllocationRow, RowEdit, TableState};
use crate::models::portfolio::{AllocationEntry, Portfolio, WEIGHT_SUM_TOLERANCE};
use crate::storage::allocation_store::AllocationStore;

/// The editable allocation table and its persisted snapshot.
///
/// Holds two views:
/// - `rows`: what the user is editing, possibly incomplete or not summing to 100.
/// - `persisted`: the canonical portfolio as last loaded or saved.
///
/// Every transition takes `&mut self`, so edits and saves on one table are
/// serialized. There is no concurrency control across processes: a second
/// writer on the same file simply overwrites.
pub struct AllocationTable {
    store: Box<dyn AllocationStore>,
    rows: Vec<AllocationRow>,
    persisted: Portfolio,
    state: TableState,
}

impl std::fmt::Debug for AllocationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocationTable")
            .field("store", &self.store.location())
            .field("rows", &self.rows.len())
            .field("persisted", &self.persisted.len())
            .field("state", &self.state)
            .finish()
    }
}

impl AllocationTable {
    /// Load the persisted snapshot from `store`.
    ///
    /// When nothing has been persisted yet, the seed portfolio is written to
    /// the store and used.
    pub fn load(store: Box<dyn AllocationStore>) -> Result<Self, CoreError> {
        let persisted = Self::read_or_seed(store.as_ref())?;
        Ok(Self {
            store,
            rows: rows_from(&persisted),
            persisted,
            state: TableState::Loaded,
        })
    }

    /// Re-read the store, discarding unsaved edits.
    pub fn reload(&mut self) -> Result<(), CoreError> {
        let persisted = Self::read_or_seed(self.store.as_ref())?;
        self.rows = rows_from(&persisted);
        self.persisted = persisted;
        self.state = TableState::Loaded;
        Ok(())
    }

    /// Append an empty placeholder row.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(AllocationRow::blank());
        self.state = TableState::Dirty;
        self.rows.len() - 1
    }

    /// Update one field of the row at `index` in place.
    pub fn edit_row(&mut self, index: usize, edit: RowEdit) -> Result<(), CoreError> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(CoreError::RowNotFound(index))?;
        match edit {
            RowEdit::Ticker(ticker) => row.ticker = ticker,
            RowEdit::Weight(weight) => row.weight = weight,
        }
        self.state = TableState::Dirty;
        Ok(())
    }

    /// Validate and persist the rows, stamped with today's local date.
    pub fn save(&mut self) -> Result<&Portfolio, CoreError> {
        let today = chrono::Local::now().date_naive();
        self.save_as_of(today)
    }

    /// Validate and persist the rows, stamping every entry with `as_of`.
    ///
    /// Incomplete rows (blank ticker or no weight) are dropped. The remaining
    /// weights must each lie in `0..=100` and sum to 100 within
    /// `WEIGHT_SUM_TOLERANCE`. On any failure
    /// the rows, the state and the store are left exactly as they were.
    pub fn save_as_of(&mut self, as_of: NaiveDate) -> Result<&Portfolio, CoreError> {
        let entries: Vec<AllocationEntry> = self
            .rows
            .iter()
            .filter(|row| row.is_complete())
            .filter_map(|row| {
                row.weight
                    .map(|weight| AllocationEntry::new(row.ticker.trim(), weight, as_of))
            })
            .collect();
        let candidate = Portfolio::new(entries);

        if let Some(bad) = candidate
            .entries
            .iter()
            .find(|e| e.weight.is_finite() && !(0.0..=100.0).contains(&e.weight))
        {
            tracing::warn!(
                ticker = %bad.ticker,
                weight = bad.weight,
                "allocation rejected: weight out of range"
            );
            return Err(CoreError::Validation(format!(
                "Weight for {} is {}%; each weight must be between 0 and 100",
                bad.ticker, bad.weight
            )));
        }

        let total = candidate.total_weight();
        // Written as a negated `<=` so that a NaN total is rejected too.
        if !((total - 100.0).abs() <= WEIGHT_SUM_TOLERANCE) {
            tracing::warn!(total, "allocation rejected: weights do not sum to 100");
            return Err(CoreError::WeightSum { actual: total });
        }

        self.store.save(&candidate)?;
        tracing::info!(
            store = %self.store.location(),
            entries = candidate.len(),
            %as_of,
            "allocation saved"
        );

        self.rows = rows_from(&candidate);
        self.persisted = candidate;
        self.state = TableState::Loaded;
        Ok(&self.persisted)
    }

    /// Rows as currently edited.
    pub fn rows(&self) -> &[AllocationRow] {
        &self.rows
    }

    /// The canonical snapshot as last loaded or saved.
    pub fn portfolio(&self) -> &Portfolio {
        &self.persisted
    }

    pub fn state(&self) -> TableState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == TableState::Dirty
    }

    /// Sum of the weights entered so far, ignoring rows without one.
    pub fn pending_total(&self) -> f64 {
        self.rows.iter().filter_map(|r| r.weight).sum()
    }

    fn read_or_seed(store: &dyn AllocationStore) -> Result<Portfolio, CoreError> {
        match store.load()? {
            Some(portfolio) => Ok(portfolio),
            None => {
                let seed = Portfolio::seed();
                store.save(&seed)?;
                tracing::info!(store = %store.location(), "seeded default allocation");
                Ok(seed)
            }
        }
    }
}

fn rows_from(portfolio: &Portfolio) -> Vec<AllocationRow> {
    portfolio
        .entries
        .iter()
        .map(|e| AllocationRow::new(e.ticker.clone(), e.weight))
        .collect()
}
