pub mod allocation;
pub mod analytics;
pub mod benchmark;
pub mod chart;
pub mod portfolio;
pub mod price;
pub mod settings;
pub mod timeframe;
