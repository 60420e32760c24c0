// Table and sparkline view models for an indicator run
use serde::Serialize;
use shared::models::{IndicatorResult, PriceSeries};
use shared::utils::{format_price, format_value};
use tabled::builder::Builder;
use tabled::settings::Style;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// 1-based position in the series.
    pub index: usize,
    pub close: f64,
    pub value: Option<f64>,
}

pub fn table_rows(series: &PriceSeries, result: &IndicatorResult) -> Vec<TableRow> {
    series
        .iter()
        .enumerate()
        .map(|(i, close)| TableRow {
            index: i + 1,
            close,
            value: result.get(i),
        })
        .collect()
}

fn value_range(result: &IndicatorResult) -> Option<(f64, f64)> {
    result.available().fold(None, |range, (_, v)| match range {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

/// Chart coordinates of the available values, x spread over the full series
/// length and y scaled to `height` (top = maximum). A flat line sits at
/// mid-height.
pub fn sparkline_points(result: &IndicatorResult, width: f64, height: f64) -> Vec<(f64, f64)> {
    let Some((min, max)) = value_range(result) else {
        return Vec::new();
    };
    let last = result.len().saturating_sub(1);

    result
        .available()
        .map(|(i, v)| {
            let x = if last == 0 { 0.0 } else { i as f64 / last as f64 * (width - 1.0) };
            let y = if max == min {
                height / 2.0
            } else {
                height - (v - min) / (max - min) * height
            };
            (x, y)
        })
        .collect()
}

/// One block glyph per available value.
pub fn render_sparkline(result: &IndicatorResult) -> String {
    let Some((min, max)) = value_range(result) else {
        return String::new();
    };
    let top = (SPARK_LEVELS.len() - 1) as f64;

    result
        .available()
        .map(|(_, v)| {
            let level = if max == min { 3 } else { ((v - min) / (max - min) * top).round() as usize };
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

pub fn render_table(value_header: &str, rows: &[TableRow]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["#".to_string(), "Close".to_string(), value_header.to_string()]);
    for row in rows {
        builder.push_record([row.index.to_string(), format_price(row.close), format_value(row.value)]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
