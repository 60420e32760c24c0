// Exponential Moving Average (EMA) indicator implementation
use super::{IndicatorCalculator, Recurrence};
use serde_json::Value;
use shared::models::{IndicatorResult, PriceSeries};

/// EMA seeded with the SMA of the first `period` prices, so it becomes
/// available at the same position as `Sma::new(period)`.
pub struct Ema {
    name: String,
    period: usize,
    multiplier: f64,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            name: format!("EMA({})", period),
            period,
            multiplier: 2.0 / (period as f64 + 1.0),
        }
    }
}

#[derive(Debug, Default)]
pub struct EmaState {
    seen: usize,
    seed_sum: f64,
    ema: Option<f64>,
}

impl Recurrence for Ema {
    type Acc = EmaState;

    fn step(&self, acc: &mut EmaState, price: f64) -> Option<f64> {
        let next = match acc.ema {
            Some(previous) => Some(previous + self.multiplier * (price - previous)),
            None => {
                acc.seen += 1;
                acc.seed_sum += price;
                (acc.seen == self.period).then(|| acc.seed_sum / self.period as f64)
            }
        };
        acc.ema = next;
        next
    }
}

impl IndicatorCalculator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, prices: &PriceSeries) -> IndicatorResult {
        self.fold(prices.values())
    }
}
