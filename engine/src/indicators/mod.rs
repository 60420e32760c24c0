// Technical indicators module
pub mod ema;
pub mod rsi;
pub mod sma;

pub use ema::Ema;
pub use rsi::Rsi;
pub use sma::Sma;

use serde_json::Value;
use shared::models::{IndicatorKind, IndicatorResult, IndicatorSpec, PriceSeries};

/// A rolling indicator expressed as a step over an accumulator.
///
/// `step` consumes one price and returns the value for that position, or
/// `None` while the indicator is still warming up. The accumulator starts from
/// `Default` on every run, so no state leaks between series.
pub trait Recurrence {
    type Acc: Default;

    fn step(&self, acc: &mut Self::Acc, price: f64) -> Option<f64>;

    fn fold(&self, prices: &[f64]) -> IndicatorResult {
        prices
            .iter()
            .scan(Self::Acc::default(), |acc, &price| Some(self.step(acc, price)))
            .collect()
    }
}

// Common trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value;
    fn calculate(&self, prices: &PriceSeries) -> IndicatorResult;
}

pub fn calculator_for(spec: IndicatorSpec) -> Box<dyn IndicatorCalculator> {
    match spec.kind() {
        IndicatorKind::Sma => Box::new(Sma::new(spec.period())),
        IndicatorKind::Ema => Box::new(Ema::new(spec.period())),
        IndicatorKind::Rsi => Box::new(Rsi::new(spec.period())),
    }
}

/// Runs `spec` over `series` from a fresh state. The result has one entry per price.
pub fn compute(spec: IndicatorSpec, series: &PriceSeries) -> IndicatorResult {
    let calculator = calculator_for(spec);
    let result = calculator.calculate(series);
    tracing::debug!(
        indicator = calculator.name(),
        prices = series.len(),
        available = result.available().count(),
        "Computed indicator series"
    );
    result
}
