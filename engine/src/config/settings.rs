// Dashboard settings, loaded from a JSON file with environment overrides
use crate::error::{EngineError, Result};
use serde::Deserialize;
use shared::models::{IndicatorKind, IndicatorSpec, OutputSize, DEFAULT_PERIOD};
use std::path::Path;

pub const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";
pub const DEFAULT_PRICES: &str = "45,46,47,44,43,42,44,46,49,50,52,51,53,55,54,56,58,57,59,60";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    pub indicator: IndicatorKind,
    pub period: usize,
    pub prices: String,
    pub chart: ChartSettings,
    pub market_data: MarketDataSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartSettings {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketDataSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub output_size: OutputSize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            indicator: IndicatorKind::Sma,
            period: DEFAULT_PERIOD,
            prices: DEFAULT_PRICES.to_string(),
            chart: ChartSettings::default(),
            market_data: MarketDataSettings::default(),
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        ChartSettings {
            width: 940.0,
            height: 172.0,
        }
    }
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        MarketDataSettings {
            base_url: "https://www.alphavantage.co/query".to_string(),
            api_key: None,
            timeout_secs: 10,
            output_size: OutputSize::Compact,
        }
    }
}

impl DashboardSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::ConfigError(format!("Failed to read '{}': {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let settings: DashboardSettings = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Applies environment overrides. Currently only the market data API key.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_key(std::env::var(API_KEY_ENV).ok())
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.market_data.api_key = Some(key);
        }
        self
    }

    pub fn indicator_spec(&self) -> IndicatorSpec {
        IndicatorSpec::new(self.indicator, self.period)
    }

    fn validate(&self) -> Result<()> {
        if !(self.chart.width > 0.0 && self.chart.height > 0.0) {
            return Err(EngineError::ConfigError(format!(
                "chart dimensions must be positive, got {}x{}",
                self.chart.width, self.chart.height
            )));
        }
        if self.market_data.timeout_secs == 0 {
            return Err(EngineError::ConfigError("market_data.timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}
