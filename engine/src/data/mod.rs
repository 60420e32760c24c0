// Price data ingestion: text/CSV parsing and remote market data
pub mod market_data;
pub mod sample;
pub mod series_parser;

pub use market_data::MarketDataGateway;
pub use series_parser::{InputShape, SeriesParser};
