// Dashboard session: current inputs snapshot, recomputation and file uploads
use crate::config::{ChartSettings, DashboardSettings};
use crate::data::series_parser::SeriesParser;
use crate::error::Result;
use crate::indicators;
use crate::services::report::{sparkline_points, table_rows, TableRow};
use serde::Serialize;
use shared::models::{IndicatorKind, IndicatorResult, IndicatorSpec, PriceSeries};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Immutable snapshot of everything a recomputation depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardInputs {
    pub spec: IndicatorSpec,
    pub price_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub spec: IndicatorSpec,
    pub series: PriceSeries,
    pub result: IndicatorResult,
    pub rows: Vec<TableRow>,
    pub points: Vec<(f64, f64)>,
}

/// Parses the price text and runs the indicator from scratch.
pub fn recompute(inputs: &DashboardInputs, chart: &ChartSettings) -> DashboardView {
    let series = SeriesParser::parse_free_text(&inputs.price_text);
    let result = indicators::compute(inputs.spec, &series);
    let rows = table_rows(&series, &result);
    let points = sparkline_points(&result, chart.width, chart.height);
    DashboardView {
        spec: inputs.spec,
        series,
        result,
        rows,
        points,
    }
}

/// Monotonic identifier of one file read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UploadTicket(u64);

/// Issues upload tickets. Only the most recently issued ticket may apply its
/// contents; reads that finish after a newer one started are discarded.
#[derive(Debug, Clone, Default)]
pub struct UploadTracker {
    latest: Arc<AtomicU64>,
}

impl UploadTracker {
    pub fn issue(&self) -> UploadTicket {
        UploadTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: UploadTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Takes a ticket and reads the file. The caller hands both to
/// `DashboardSession::finish_upload`.
pub async fn read_upload(tracker: &UploadTracker, path: impl AsRef<Path>) -> Result<(UploadTicket, String)> {
    let ticket = tracker.issue();
    let contents = tokio::fs::read_to_string(path.as_ref()).await?;
    Ok((ticket, contents))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Applied { values: usize },
    /// The file held no numeric values; inputs are left unchanged.
    Empty,
    /// A newer upload was started before this one finished.
    Stale,
}

pub struct DashboardSession {
    inputs: DashboardInputs,
    chart: ChartSettings,
    uploads: UploadTracker,
}

impl DashboardSession {
    pub fn new(settings: &DashboardSettings) -> Self {
        Self {
            inputs: DashboardInputs {
                spec: settings.indicator_spec(),
                price_text: settings.prices.clone(),
            },
            chart: settings.chart.clone(),
            uploads: UploadTracker::default(),
        }
    }

    pub fn inputs(&self) -> &DashboardInputs {
        &self.inputs
    }

    pub fn set_price_text(&mut self, text: impl Into<String>) {
        self.inputs = DashboardInputs {
            price_text: text.into(),
            ..self.inputs.clone()
        };
    }

    pub fn set_indicator(&mut self, kind: IndicatorKind) {
        self.inputs.spec = self.inputs.spec.with_kind(kind);
    }

    /// Period below 1 is clamped to 1.
    pub fn set_period(&mut self, period: usize) {
        self.inputs.spec = self.inputs.spec.with_period(period);
    }

    pub fn upload_tracker(&self) -> UploadTracker {
        self.uploads.clone()
    }

    pub fn begin_upload(&self) -> UploadTicket {
        self.uploads.issue()
    }

    /// Applies the contents of an uploaded table if `ticket` is still the
    /// newest one. The price text is replaced by the comma-joined values.
    pub fn finish_upload(&mut self, ticket: UploadTicket, contents: &str) -> UploadOutcome {
        if !self.uploads.is_current(ticket) {
            tracing::warn!(?ticket, "Discarding stale upload, a newer one was started");
            return UploadOutcome::Stale;
        }
        let series = SeriesParser::parse_table(contents);
        if series.is_empty() {
            tracing::info!(?ticket, "Upload contained no numeric values, keeping current prices");
            return UploadOutcome::Empty;
        }
        tracing::info!(?ticket, values = series.len(), "Applied uploaded prices");
        self.set_price_text(series.to_text());
        UploadOutcome::Applied { values: series.len() }
    }

    pub async fn load_file(&mut self, path: impl AsRef<Path>) -> Result<UploadOutcome> {
        let (ticket, contents) = read_upload(&self.uploads, path).await?;
        Ok(self.finish_upload(ticket, &contents))
    }

    pub fn view(&self) -> DashboardView {
        recompute(&self.inputs, &self.chart)
    }
}
