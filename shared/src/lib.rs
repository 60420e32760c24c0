pub mod models;
pub mod utils;

pub use models::{
    IndicatorKind, IndicatorResult, IndicatorSpec, OutputSize, ParseIndicatorKindError, PriceBar,
    PriceSeries, TimeInterval, DEFAULT_PERIOD,
};
