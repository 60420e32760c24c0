// Synthetic daily OHLCV history for running without an API key
use chrono::{Duration, NaiveDate, NaiveTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shared::models::PriceBar;

const BASE_PRICE: f64 = 2500.0;

/// Upper bound on generated history, roughly a century of days.
pub const MAX_SAMPLE_DAYS: u32 = 36_500;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generates `days + 1` daily bars ending at `end`, oldest first. `days` is
/// capped at `MAX_SAMPLE_DAYS` and dates before the calendar minimum are
/// skipped.
///
/// Closes drift upward by 0.5 per day around `BASE_PRICE` with bounded
/// noise. The same `seed` always produces the same bars.
pub fn sample_data(end: NaiveDate, days: u32, seed: u64) -> Vec<PriceBar> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let days = days.min(MAX_SAMPLE_DAYS);

    (0..=days)
        .rev()
        .filter_map(|i| {
            let date = end.checked_sub_signed(Duration::days(i64::from(i)))?;
            let volatility = rng.gen::<f64>() * 50.0;
            let trend = f64::from(days - i) * 0.5;
            let close = BASE_PRICE + trend + (rng.gen::<f64>() - 0.5) * volatility;
            let open = close + (rng.gen::<f64>() - 0.5) * 20.0;
            let high = open.max(close) + rng.gen::<f64>() * 15.0;
            let low = open.min(close) - rng.gen::<f64>() * 15.0;

            Some(PriceBar {
                timestamp: date.and_time(NaiveTime::MIN),
                open: round2(open),
                high: round2(high),
                low: round2(low),
                close: round2(close),
                volume: (rng.gen::<f64>() * 10_000_000.0).floor(),
            })
        })
        .collect()
}
