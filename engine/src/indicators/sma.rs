// Simple Moving Average (SMA) indicator implementation
use super::{IndicatorCalculator, Recurrence};
use serde_json::Value;
use shared::models::{IndicatorResult, PriceSeries};
use std::collections::VecDeque;

pub struct Sma {
    name: String,
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            name: format!("SMA({})", period),
            period,
        }
    }
}

/// Window plus a Neumaier-compensated running sum.
#[derive(Debug, Default)]
pub struct SmaState {
    window: VecDeque<f64>,
    sum: f64,
    compensation: f64,
}

impl SmaState {
    fn add(&mut self, value: f64) {
        let total = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - total) + value;
        } else {
            self.compensation += (value - total) + self.sum;
        }
        self.sum = total;
    }

    fn resum(&mut self) {
        self.sum = 0.0;
        self.compensation = 0.0;
        for i in 0..self.window.len() {
            self.add(self.window[i]);
        }
    }

    fn mean(&self) -> f64 {
        let n = self.window.len() as f64;
        let total = self.sum + self.compensation;
        if total.is_finite() {
            total / n
        } else {
            // sum overflowed; the mean itself may still be representable
            self.window.iter().map(|v| v / n).sum()
        }
    }
}

impl Recurrence for Sma {
    type Acc = SmaState;

    fn step(&self, acc: &mut SmaState, price: f64) -> Option<f64> {
        acc.window.push_back(price);
        acc.add(price);
        if acc.window.len() > self.period {
            if let Some(oldest) = acc.window.pop_front() {
                acc.add(-oldest);
            }
        }
        if !(acc.sum.is_finite() && acc.compensation.is_finite()) {
            acc.resum();
        }
        (acc.window.len() == self.period).then(|| acc.mean())
    }
}

impl IndicatorCalculator for Sma {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(values: &[f64]) -> PriceSeries {
        PriceSeries::from_values(values.iter().copied())
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a value");
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn test_sma_calculation() {
        let results = Sma::new(3).calculate(&prices(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        // expected: -, -, (1+2+3)/3=2.0, (2+3+4)/3=3.0, (3+4+5)/3=4.0
        assert_eq!(results.get(0), None);
        assert_eq!(results.get(1), None);
        assert_close(results.get(2), 2.0);
        assert_close(results.get(3), 3.0);
        assert_close(results.get(4), 4.0);
    }

    #[test]
    fn test_sma_reference_series() {
        let data = [45.0, 46.0, 47.0, 44.0, 43.0, 42.0, 44.0, 46.0, 49.0, 50.0];
        let results = Sma::new(5).calculate(&prices(&data));
        assert_eq!(results.first_available(), Some((4, 45.0)));
        for (i, expected) in [45.0, 44.4, 44.0, 43.8, 44.8, 46.2].into_iter().enumerate() {
            assert_close(results.get(i + 4), expected);
        }
    }

    #[test]
    fn test_sma_matches_direct_mean() {
        let data: Vec<f64> = (0..200).map(|i| 100.0 + ((i * 37) % 23) as f64 * 0.173).collect();
        let period = 9;
        let results = Sma::new(period).calculate(&prices(&data));
        for i in (period - 1)..data.len() {
            let direct = data[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
            assert_close(results.get(i), direct);
        }
    }

    #[test]
    fn test_sma_recovers_after_large_value_leaves_window() {
        let results = Sma::new(1).calculate(&prices(&[1e16, 1.0, 1.0, 1.0]));
        assert_eq!(results.values(), &[Some(1e16), Some(1.0), Some(1.0), Some(1.0)]);

        let results = Sma::new(2).calculate(&prices(&[0.1, 1e17, 3.0, 5.0, 7.0]));
        assert_eq!(results.get(0), None);
        assert_close(results.get(3), 4.0);
        assert_close(results.get(4), 6.0);

        let data = [3.0, 1e18, -2.5, 4.0, 9.0, 1e-3, 7.25, 1e15, 2.0, 6.0, 8.0];
        let period = 3;
        let results = Sma::new(period).calculate(&prices(&data));
        for i in (period - 1)..data.len() {
            let window = &data[i + 1 - period..=i];
            if window.iter().all(|v| v.abs() < 1e6) {
                let direct = window.iter().sum::<f64>() / period as f64;
                assert_close(results.get(i), direct);
            }
        }
    }

    #[test]
    fn test_sma_near_max_values_stay_finite() {
        let results = Sma::new(2).calculate(&prices(&[1e308, 1e308, 1.0, 1.0]));
        assert_eq!(results.get(1), Some(1e308));
        assert!(results.get(2).unwrap().is_finite());
        assert_close(results.get(3), 1.0);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let results = Sma::new(3).calculate(&prices(&[1.0, 2.0]));
        assert_eq!(results.values(), &[None, None]);
    }

    #[test]
    fn test_sma_period_one() {
        let results = Sma::new(1).calculate(&prices(&[1.0, 2.0, 3.0]));
        // SMA(1) is just the price
        assert_eq!(results.values(), &[Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_sma_empty_data() {
        assert!(Sma::new(3).calculate(&PriceSeries::new()).is_empty());
    }

    #[test]
    fn test_sma_period_zero_is_clamped() {
        let sma = Sma::new(0);
        assert_eq!(sma.name(), "SMA(1)");
        assert_eq!(sma.calculate(&prices(&[7.0])).values(), &[Some(7.0)]);
    }
}
