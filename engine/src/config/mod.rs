pub mod settings;

pub use settings::{ChartSettings, DashboardSettings, MarketDataSettings};
