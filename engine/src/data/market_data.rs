// Alpha Vantage client for OHLCV price history
use crate::config::MarketDataSettings;
use crate::error::{EngineError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use shared::models::{OutputSize, PriceBar, TimeInterval};
use shared::utils::parse_finite;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// JSON field names of one time-series entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BarFields {
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    /// Tried in order; a bar with none of them gets volume 0.
    pub volume: Vec<String>,
}

impl BarFields {
    pub fn equity() -> Self {
        BarFields {
            open: "1. open".to_string(),
            high: "2. high".to_string(),
            low: "3. low".to_string(),
            close: "4. close".to_string(),
            volume: vec!["5. volume".to_string(), "6. volume".to_string()],
        }
    }

    pub fn crypto(market: &str) -> Self {
        let market = market.to_uppercase();
        BarFields {
            open: format!("1a. open ({})", market),
            high: format!("2a. high ({})", market),
            low: format!("3a. low ({})", market),
            close: format!("4a. close ({})", market),
            volume: vec!["5. volume".to_string()],
        }
    }
}

pub fn series_function(interval: TimeInterval) -> &'static str {
    match interval {
        TimeInterval::Minute1 | TimeInterval::Minute5 | TimeInterval::Minute15 | TimeInterval::Minute60 => {
            "TIME_SERIES_INTRADAY"
        }
        TimeInterval::Daily => "TIME_SERIES_DAILY",
        TimeInterval::Weekly => "TIME_SERIES_WEEKLY",
        TimeInterval::Monthly => "TIME_SERIES_MONTHLY",
    }
}

/// Query parameters for an equity request, without the API key.
pub fn stock_query(symbol: &str, interval: TimeInterval, output_size: OutputSize) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("function", series_function(interval).to_string()),
        ("symbol", symbol.to_uppercase()),
        ("outputsize", output_size.as_str().to_string()),
    ];
    if interval.is_intraday() {
        params.push(("interval", interval.as_str().to_string()));
    }
    params
}

/// Query parameters for a daily crypto request, without the API key.
pub fn crypto_query(symbol: &str, market: &str) -> Vec<(&'static str, String)> {
    vec![
        ("function", "DIGITAL_CURRENCY_DAILY".to_string()),
        ("symbol", symbol.to_uppercase()),
        ("market", market.to_uppercase()),
    ]
}

/// Extracts price bars from an API response body, oldest first.
///
/// API-level failures arrive as 200 responses carrying an `Error Message` or
/// `Note` field; those are turned into errors here. Entries whose timestamp
/// or prices do not parse are skipped.
pub fn parse_time_series(body: &Value, fields: &BarFields) -> Result<Vec<PriceBar>> {
    if let Some(message) = body.get("Error Message") {
        let message = message.as_str().map(str::to_string).unwrap_or_else(|| message.to_string());
        return Err(EngineError::MarketDataError(format!("API error: {}", message)));
    }
    if body.get("Note").is_some() {
        return Err(EngineError::RateLimited);
    }

    let series = body
        .as_object()
        .and_then(|obj| obj.iter().find(|(key, _)| key.contains("Time Series")))
        .and_then(|(_, series)| series.as_object())
        .ok_or_else(|| EngineError::MarketDataError("Invalid API response - no time series data found".to_string()))?;

    let mut bars: Vec<PriceBar> = series
        .iter()
        .filter_map(|(stamp, values)| {
            let bar = parse_bar(stamp, values, fields);
            if bar.is_none() {
                warn!(timestamp = %stamp, "Skipping malformed time series entry");
            }
            bar
        })
        .collect();
    bars.sort_by_key(|bar| bar.timestamp);
    Ok(bars)
}

fn parse_bar(stamp: &str, values: &Value, fields: &BarFields) -> Option<PriceBar> {
    let field = |name: &str| values.get(name).and_then(Value::as_str).and_then(parse_finite);
    let volume = fields.volume.iter().find_map(|name| field(name.as_str())).unwrap_or(0.0);
    Some(PriceBar {
        timestamp: parse_timestamp(stamp)?,
        open: field(fields.open.as_str())?,
        high: field(fields.high.as_str())?,
        low: field(fields.low.as_str())?,
        close: field(fields.close.as_str())?,
        volume,
    })
}

/// Accepts `YYYY-MM-DD` and `YYYY-MM-DD HH:MM:SS`.
pub fn parse_timestamp(stamp: &str) -> Option<NaiveDateTime> {
    let stamp = stamp.trim();
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(stamp, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

pub struct MarketDataGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    output_size: OutputSize,
}

impl MarketDataGateway {
    pub fn new(settings: &MarketDataSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        debug!(base_url = %settings.base_url, has_api_key = settings.api_key.is_some(), "MarketDataGateway initialised");
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            output_size: settings.output_size,
        })
    }

    pub fn output_size(&self) -> OutputSize {
        self.output_size
    }

    #[instrument(skip(self), name = "market_data::fetch_stock_data")]
    pub async fn fetch_stock_data(
        &self,
        symbol: &str,
        interval: TimeInterval,
        output_size: OutputSize,
    ) -> Result<Vec<PriceBar>> {
        let body = self.get_json(stock_query(symbol, interval, output_size)).await?;
        let bars = parse_time_series(&body, &BarFields::equity())?;
        debug!(count = bars.len(), "Fetched stock bars");
        Ok(bars)
    }

    #[instrument(skip(self), name = "market_data::fetch_crypto_data")]
    pub async fn fetch_crypto_data(&self, symbol: &str, market: &str) -> Result<Vec<PriceBar>> {
        let body = self.get_json(crypto_query(symbol, market)).await?;
        let bars = parse_time_series(&body, &BarFields::crypto(market))?;
        debug!(count = bars.len(), "Fetched crypto bars");
        Ok(bars)
    }

    async fn get_json(&self, mut params: Vec<(&'static str, String)>) -> Result<Value> {
        let api_key = self.api_key.as_ref().ok_or(EngineError::MissingApiKey)?;
        params.push(("apikey", api_key.clone()));

        let resp = self.client.get(&self.base_url).query(&params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EngineError::MarketDataError(format!("API request returned HTTP {}", status)));
        }
        Ok(resp.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stock_query_daily() {
        let params = stock_query("aapl", TimeInterval::Daily, OutputSize::Compact);
        assert_eq!(
            params,
            vec![
                ("function", "TIME_SERIES_DAILY".to_string()),
                ("symbol", "AAPL".to_string()),
                ("outputsize", "compact".to_string()),
            ]
        );
    }

    #[test]
    fn test_stock_query_intraday_adds_interval() {
        let params = stock_query("msft", TimeInterval::Minute5, OutputSize::Full);
        assert_eq!(params[0], ("function", "TIME_SERIES_INTRADAY".to_string()));
        assert!(params.contains(&("interval", "5min".to_string())));
        assert!(params.contains(&("outputsize", "full".to_string())));
    }

    #[test]
    fn test_crypto_query() {
        let params = crypto_query("btc", "eur");
        assert!(params.contains(&("market", "EUR".to_string())));
        assert!(params.contains(&("symbol", "BTC".to_string())));
    }

    #[test]
    fn test_parse_daily_series_sorted() {
        let body = json!({
            "Meta Data": { "2. Symbol": "IBM" },
            "Time Series (Daily)": {
                "2024-01-03": { "1. open": "11.0", "2. high": "12.0", "3. low": "10.5", "4. close": "11.5", "5. volume": "2000" },
                "2024-01-02": { "1. open": "10.0", "2. high": "11.0", "3. low": "9.5", "4. close": "10.5", "5. volume": "1000" }
            }
        });
        let bars = parse_time_series(&body, &BarFields::equity()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, parse_timestamp("2024-01-02").unwrap());
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[1].volume, 2000.0);
    }

    #[test]
    fn test_parse_intraday_and_volume_fallback() {
        let body = json!({
            "Time Series (5min)": {
                "2024-01-02 16:00:00": { "1. open": "1", "2. high": "2", "3. low": "0.5", "4. close": "1.5", "6. volume": "77" },
                "2024-01-02 15:55:00": { "1. open": "1", "2. high": "2", "3. low": "0.5", "4. close": "1.25" }
            }
        });
        let bars = parse_time_series(&body, &BarFields::equity()).unwrap();
        assert_eq!(bars[0].close, 1.25);
        assert_eq!(bars[0].volume, 0.0);
        assert_eq!(bars[1].volume, 77.0);
    }

    #[test]
    fn test_parse_crypto_fields() {
        let body = json!({
            "Time Series (Digital Currency Daily)": {
                "2024-01-02": { "1a. open (USD)": "42000", "2a. high (USD)": "43000", "3a. low (USD)": "41000", "4a. close (USD)": "42500.5", "5. volume": "12.5" }
            }
        });
        let bars = parse_time_series(&body, &BarFields::crypto("usd")).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 42500.5);
        assert_eq!(bars[0].volume, 12.5);
    }

    #[test]
    fn test_parse_skips_malformed_entries() {
        let body = json!({
            "Time Series (Daily)": {
                "not-a-date": { "1. open": "1", "2. high": "1", "3. low": "1", "4. close": "1" },
                "2024-01-02": { "1. open": "1", "2. high": "1", "3. low": "1", "4. close": "n/a" },
                "2024-01-03": { "1. open": "1", "2. high": "1", "3. low": "1", "4. close": "3" }
            }
        });
        let bars = parse_time_series(&body, &BarFields::equity()).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 3.0);
    }

    #[test]
    fn test_parse_api_errors() {
        let err = parse_time_series(&json!({ "Error Message": "Invalid API call" }), &BarFields::equity()).unwrap_err();
        assert!(err.to_string().contains("Invalid API call"));

        let err = parse_time_series(&json!({ "Note": "Thank you for using Alpha Vantage!" }), &BarFields::equity()).unwrap_err();
        assert!(matches!(err, EngineError::RateLimited));

        let err = parse_time_series(&json!({ "Meta Data": {} }), &BarFields::equity()).unwrap_err();
        assert!(err.to_string().contains("no time series data found"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let settings = MarketDataSettings {
            base_url: "http://127.0.0.1:9/query".to_string(),
            api_key: None,
            ..MarketDataSettings::default()
        };
        let gateway = MarketDataGateway::new(&settings).unwrap();
        let err = gateway
            .fetch_stock_data("IBM", TimeInterval::Daily, OutputSize::Compact)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingApiKey));
    }
}
