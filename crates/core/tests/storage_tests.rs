// ═══════════════════════════════════════════════════════════════════
// Storage Tests: CSV allocation store, benchmark store, atomic writes
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use std::path::Path;

use portfolio_insights_core::errors::CoreError;
use portfolio_insights_core::models::{
    allocation::RowEdit,
    benchmark::BenchmarkRecord,
    portfolio::{AllocationEntry, Portfolio},
};
use portfolio_insights_core::services::allocation_service::AllocationTable;
use portfolio_insights_core::storage::{
    allocation_store::{AllocationStore, CsvAllocationStore, InMemoryAllocationStore},
    benchmark_store::BenchmarkStore,
    format::{self, AllocationRecord, PORTFOLIO_HEADER},
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn sixty_forty() -> Portfolio {
    Portfolio::new(vec![
        AllocationEntry::new("SPY", 60.0, d(2026, 3, 1)),
        AllocationEntry::new("IEF", 40.0, d(2026, 3, 1)),
    ])
}

fn first_line(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

// ═══════════════════════════════════════════════════════════════════
// CsvAllocationStore
// ═══════════════════════════════════════════════════════════════════

mod csv_allocation_store {
    use super::*;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvAllocationStore::new(dir.path().join("portfolio.csv"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvAllocationStore::new(dir.path().join("portfolio.csv"));

        store.save(&sixty_forty()).unwrap();

        assert_eq!(store.load().unwrap(), Some(sixty_forty()));
        assert_eq!(first_line(store.path()), "Date,Ticker,Weight");
    }

    #[test]
    fn fractional_weights_survive() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvAllocationStore::new(dir.path().join("portfolio.csv"));
        let portfolio = Portfolio::new(vec![
            AllocationEntry::new("AAPL", 33.333_333, d(2026, 3, 1)),
            AllocationEntry::new("MSFT", 66.666_667, d(2026, 3, 1)),
        ]);

        store.save(&portfolio).unwrap();
        assert_eq!(store.load().unwrap(), Some(portfolio));
    }

    #[test]
    fn empty_portfolio_still_writes_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvAllocationStore::new(dir.path().join("portfolio.csv"));

        store.save(&Portfolio::default()).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.trim_end(), "Date,Ticker,Weight");
        assert_eq!(store.load().unwrap(), Some(Portfolio::default()));
    }

    #[test]
    fn save_replaces_rather_than_merges() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvAllocationStore::new(dir.path().join("portfolio.csv"));
        store.save(&Portfolio::seed()).unwrap();

        store.save(&sixty_forty()).unwrap();

        assert_eq!(store.load().unwrap().unwrap().tickers(), vec!["SPY", "IEF"]);
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("nested").join("portfolio.csv");
        let store = CsvAllocationStore::new(&path);

        store.save(&sixty_forty()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn leaves_no_temporary_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvAllocationStore::new(dir.path().join("portfolio.csv"));
        store.save(&sixty_forty()).unwrap();
        store.save(&Portfolio::seed()).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn reads_hand_edited_file_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.csv");
        std::fs::write(&path, "Date, Ticker, Weight\n2024-01-01, AAPL , 70\n2024-01-01,MSFT,30.0\n")
            .unwrap();

        let portfolio = CsvAllocationStore::new(&path).load().unwrap().unwrap();
        assert_eq!(portfolio.tickers(), vec!["AAPL", "MSFT"]);
        assert_eq!(portfolio.entries[0].weight, 70.0);
        assert_eq!(portfolio.as_of(), Some(d(2024, 1, 1)));
    }

    #[test]
    fn malformed_file_is_a_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.csv");
        std::fs::write(&path, "Date,Ticker,Weight\nyesterday,AAPL,lots\n").unwrap();

        let err = CsvAllocationStore::new(&path).load().unwrap_err();
        assert!(matches!(err, CoreError::Csv(_)));
    }

    #[test]
    fn location_is_the_path() {
        let store = CsvAllocationStore::new("data/portfolio.csv");
        assert_eq!(store.location(), "data/portfolio.csv");
    }
}

// ═══════════════════════════════════════════════════════════════════
// AllocationTable over a CSV file
// ═══════════════════════════════════════════════════════════════════

mod table_on_disk {
    use super::*;

    #[test]
    fn first_load_seeds_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.csv");

        let table = AllocationTable::load(Box::new(CsvAllocationStore::new(&path))).unwrap();

        assert_eq!(table.portfolio(), &Portfolio::seed());
        let on_disk = CsvAllocationStore::new(&path).load().unwrap();
        assert_eq!(on_disk, Some(Portfolio::seed()));
    }

    #[test]
    fn rejected_save_leaves_the_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.csv");
        let mut table = AllocationTable::load(Box::new(CsvAllocationStore::new(&path))).unwrap();
        let before = std::fs::read(&path).unwrap();

        table.edit_row(0, RowEdit::Weight(Some(39.0))).unwrap();
        assert!(matches!(
            table.save_as_of(d(2026, 10, 18)),
            Err(CoreError::WeightSum { .. })
        ));

        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn accepted_save_is_visible_to_a_fresh_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.csv");
        let mut table = AllocationTable::load(Box::new(CsvAllocationStore::new(&path))).unwrap();

        table.edit_row(0, RowEdit::Ticker("VT".into())).unwrap();
        table.save_as_of(d(2026, 10, 18)).unwrap();

        let reopened = AllocationTable::load(Box::new(CsvAllocationStore::new(&path))).unwrap();
        assert_eq!(reopened.portfolio().tickers(), vec!["VT", "MSFT", "GOOG"]);
        assert_eq!(reopened.portfolio().as_of(), Some(d(2026, 10, 18)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// InMemoryAllocationStore
// ═══════════════════════════════════════════════════════════════════

mod in_memory_store {
    use super::*;

    #[test]
    fn starts_empty() {
        let store = InMemoryAllocationStore::new();
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.location(), "memory");
    }

    #[test]
    fn save_replaces_snapshot() {
        let store = InMemoryAllocationStore::with_portfolio(Portfolio::seed());
        store.save(&sixty_forty()).unwrap();
        assert_eq!(store.snapshot(), Some(sixty_forty()));
    }
}

// ═══════════════════════════════════════════════════════════════════
// BenchmarkStore
// ═══════════════════════════════════════════════════════════════════

mod benchmark_store {
    use super::*;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = BenchmarkStore::new(dir.path().join("benchmarks.csv"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn load_or_seed_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = BenchmarkStore::new(dir.path().join("benchmarks.csv"));

        let registry = store.load_or_seed().unwrap();

        assert_eq!(registry.records(), BenchmarkRecord::defaults().as_slice());
        assert_eq!(store.load().unwrap(), Some(BenchmarkRecord::defaults()));
        assert_eq!(first_line(store.path()), "Name,Tickers,Weights");
    }

    #[test]
    fn lists_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let store = BenchmarkStore::new(dir.path().join("benchmarks.csv"));
        store.save(&BenchmarkRecord::defaults()).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(r#"60% Equity / 40% Bonds,"SPY,IEF","0.6,0.4""#));
    }

    #[test]
    fn existing_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benchmarks.csv");
        std::fs::write(&path, "Name,Tickers,Weights\nTech,\"QQQ,XLK\",\"0.5,0.5\"\n").unwrap();

        let registry = BenchmarkStore::new(&path).load_or_seed().unwrap();

        assert_eq!(registry.names(), vec!["Tech"]);
        let def = registry.get("Tech").unwrap();
        assert_eq!(def.tickers, vec!["QQQ", "XLK"]);
        assert_eq!(def.weights, vec![0.5, 0.5]);
    }

    #[test]
    fn malformed_rows_load_but_fail_on_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benchmarks.csv");
        std::fs::write(&path, "Name,Tickers,Weights\nBroken,\"SPY,IEF\",1\n").unwrap();

        let registry = BenchmarkStore::new(&path).load_or_seed().unwrap();

        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.get("Broken"),
            Err(CoreError::MalformedBenchmark { .. })
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// format helpers
// ═══════════════════════════════════════════════════════════════════

mod csv_format {
    use super::*;

    #[test]
    fn write_then_read_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let records = vec![AllocationRecord {
            date: d(2026, 1, 2),
            ticker: "SPY".into(),
            weight: 100.0,
        }];

        format::write_records_atomically(&path, &PORTFOLIO_HEADER, &records).unwrap();
        let back: Vec<AllocationRecord> = format::read_records(&path).unwrap();

        assert_eq!(back, records);
    }

    #[test]
    fn entry_record_conversion() {
        let entry = AllocationEntry::new("SPY", 100.0, d(2026, 1, 2));
        let record = AllocationRecord::from(&entry);
        assert_eq!(record.ticker, "SPY");
        assert_eq!(AllocationEntry::from(record), entry);
    }
}
