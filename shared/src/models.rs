use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Ordered, chronological price sequence. Every element is finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    values: Vec<f64>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from raw values, dropping anything that is not finite.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self {
            values: values.into_iter().filter(|v| v.is_finite()).collect(),
        }
    }

    /// Close column of a set of OHLCV bars, in the order given.
    pub fn from_bars(bars: &[PriceBar]) -> Self {
        Self::from_values(bars.iter().map(|b| b.close))
    }

    /// Appends `value` if it is finite. Returns whether it was kept.
    pub fn push(&mut self, value: f64) -> bool {
        if value.is_finite() {
            self.values.push(value);
            true
        } else {
            false
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Comma-joined text form, shortest round-trip formatting per value.
    pub fn to_text(&self) -> String {
        self.values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<f64> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 3] = [IndicatorKind::Sma, IndicatorKind::Ema, IndicatorKind::Rsi];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Rsi => "RSI",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown indicator '{0}', expected one of SMA, EMA, RSI")]
pub struct ParseIndicatorKindError(pub String);

impl FromStr for IndicatorKind {
    type Err = ParseIndicatorKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sma" => Ok(IndicatorKind::Sma),
            "ema" => Ok(IndicatorKind::Ema),
            "rsi" => Ok(IndicatorKind::Rsi),
            _ => Err(ParseIndicatorKindError(s.to_string())),
        }
    }
}

pub const DEFAULT_PERIOD: usize = 14;

/// Indicator kind plus lookback period. The period is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    kind: IndicatorKind,
    period: usize,
}

impl IndicatorSpec {
    pub fn new(kind: IndicatorKind, period: usize) -> Self {
        Self {
            kind,
            period: period.max(1),
        }
    }

    pub fn kind(&self) -> IndicatorKind {
        self.kind
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn with_kind(self, kind: IndicatorKind) -> Self {
        Self::new(kind, self.period)
    }

    pub fn with_period(self, period: usize) -> Self {
        Self::new(self.kind, period)
    }

    pub fn label(&self) -> String {
        format!("{}({})", self.kind, self.period)
    }
}

impl Default for IndicatorSpec {
    fn default() -> Self {
        Self::new(IndicatorKind::Sma, DEFAULT_PERIOD)
    }
}

/// One entry per input price; `None` marks positions still in warm-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    values: Vec<Option<f64>>,
}

impl IndicatorResult {
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index and value of the first computed entry.
    pub fn first_available(&self) -> Option<(usize, f64)> {
        self.values
            .iter()
            .enumerate()
            .find_map(|(i, v)| v.map(|v| (i, v)))
    }

    /// Computed entries only, with their positions.
    pub fn available(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
    }
}

impl From<Vec<Option<f64>>> for IndicatorResult {
    fn from(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }
}

impl FromIterator<Option<f64>> for IndicatorResult {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// OHLCV row as delivered by the market data gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInterval {
    #[serde(rename = "1min")]
    Minute1,
    #[serde(rename = "5min")]
    Minute5,
    #[serde(rename = "15min")]
    Minute15,
    #[serde(rename = "60min")]
    Minute60,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl TimeInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInterval::Minute1 => "1min",
            TimeInterval::Minute5 => "5min",
            TimeInterval::Minute15 => "15min",
            TimeInterval::Minute60 => "60min",
            TimeInterval::Daily => "daily",
            TimeInterval::Weekly => "weekly",
            TimeInterval::Monthly => "monthly",
        }
    }

    pub fn is_intraday(&self) -> bool {
        matches!(
            self,
            TimeInterval::Minute1 | TimeInterval::Minute5 | TimeInterval::Minute15 | TimeInterval::Minute60
        )
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1min" => Ok(TimeInterval::Minute1),
            "5min" => Ok(TimeInterval::Minute5),
            "15min" => Ok(TimeInterval::Minute15),
            "60min" => Ok(TimeInterval::Minute60),
            "daily" => Ok(TimeInterval::Daily),
            "weekly" => Ok(TimeInterval::Weekly),
            "monthly" => Ok(TimeInterval::Monthly),
            other => Err(format!("unknown interval '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    #[default]
    Compact,
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

impl FromStr for OutputSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(OutputSize::Compact),
            "full" => Ok(OutputSize::Full),
            other => Err(format!("unknown output size '{}'", other)),
        }
    }
}
