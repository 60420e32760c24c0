use shared::models::ParseIndicatorKindError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("HTTP error: {source}")]
    HttpError {
        #[from]
        source: reqwest::Error,
    },

    #[error("Market data error: {0}")]
    MarketDataError(String),

    #[error("Market data API rate limit exceeded, retry later")]
    RateLimited,

    #[error("No market data API key configured (set ALPHAVANTAGE_API_KEY or market_data.api_key)")]
    MissingApiKey,

    #[error("Invalid indicator: {0}")]
    InvalidIndicator(String),
}

impl From<ParseIndicatorKindError> for EngineError {
    fn from(err: ParseIndicatorKindError) -> Self {
        EngineError::InvalidIndicator(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
