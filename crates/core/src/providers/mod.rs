pub mod registry;
pub mod traits;

// API provider implementations
pub mod alphavantage;
pub mod yahoo_finance;
