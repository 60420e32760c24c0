// Relative Strength Index (RSI) indicator implementation
use super::{IndicatorCalculator, Recurrence};
use serde_json::Value;
use shared::models::{IndicatorResult, PriceSeries};

/// RSI with Wilder smoothing of average gain and loss.
///
/// The averages are seeded with the plain mean of the first `period` changes
/// and then updated with factor `1/period`. Values appear once `period`
/// changes (`period + 1` prices) have been observed.
pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            name: format!("RSI({})", period),
            period,
        }
    }

    fn strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            if avg_gain > 0.0 {
                100.0
            } else {
                // No movement at all in the window
                50.0
            }
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - (100.0 / (1.0 + rs))
        }
    }
}

#[derive(Debug, Default)]
pub struct RsiState {
    previous: Option<f64>,
    changes: usize,
    avg_gain: f64,
    avg_loss: f64,
}

impl Recurrence for Rsi {
    type Acc = RsiState;

    fn step(&self, acc: &mut RsiState, price: f64) -> Option<f64> {
        let previous = acc.previous.replace(price)?;
        let change = price - previous;
        let (gain, loss) = if change > 0.0 { (change, 0.0) } else { (0.0, -change) };
        let period = self.period as f64;

        acc.changes += 1;
        if acc.changes <= self.period {
            // Warm-up: accumulate sums, turned into means on the last one
            acc.avg_gain += gain;
            acc.avg_loss += loss;
            if acc.changes < self.period {
                return None;
            }
            acc.avg_gain /= period;
            acc.avg_loss /= period;
        } else {
            acc.avg_gain += (gain - acc.avg_gain) / period;
            acc.avg_loss += (loss - acc.avg_loss) / period;
        }
        Some(Self::strength_index(acc.avg_gain, acc.avg_loss))
    }
}

impl IndicatorCalculator for Rsi {
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
