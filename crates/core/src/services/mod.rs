pub mod allocation_service;
pub mod benchmark_service;
pub mod indicator_service;
pub mod kpi_service;
pub mod price_service;
pub mod returns_service;
