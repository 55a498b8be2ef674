pub mod allocation_store;
pub mod benchmark_store;
pub mod format;
