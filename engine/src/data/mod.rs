// Market data access: the provider seam plus in-memory and CSV-backed sources.
pub mod csv_parser;
pub mod market_data;
pub mod provider;

pub use csv_parser::CsvMarketDataProvider;
pub use market_data::MarketDataStore;
pub use provider::MarketDataProvider;
