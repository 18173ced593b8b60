//! Panel renderers.
//!
//! Selection and formatting live here; the display surface is abstracted
//! behind [`RenderSink`] so the page, the terminal snapshot and tests all see
//! exactly the same writes.

pub mod html;
pub mod text;

use crate::format::{format_number, format_time, or_dash};
use crate::loader::LoadError;
use crate::records::{AlertRecord, RunRecord};
use serde::Serialize;
use std::cmp::Ordering;

pub use html::HtmlSink;
pub use text::TextSink;

pub const NO_RUNS: &str = "No runs recorded yet.";
pub const NO_ALERTS: &str = "No alerts recorded yet.";

/// Display regions that can show plain text in place of their content. The
/// run table is only ever replaced by rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Latest,
    Alerts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestView {
    pub status: String,
    pub model_signature: String,
    pub equity: String,
    pub buying_power: String,
    pub timestamp: String,
    pub positions: String,
    pub account_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRow {
    pub timestamp: String,
    pub run_id: String,
    pub model_signature: String,
    pub status: String,
    pub equity: String,
    pub buying_power: String,
}

impl RunRow {
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.timestamp,
            &self.run_id,
            &self.model_signature,
            &self.status,
            &self.equity,
            &self.buying_power,
        ]
    }
}

pub const RUN_COLUMNS: [&str; 6] = [
    "Time",
    "Run ID",
    "Model",
    "Status",
    "Equity",
    "Buying Power",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertItem {
    pub event: String,
    pub timestamp: String,
    pub details: String,
    pub delivery_error: bool,
}

/// A display surface the renderers write into. Each call replaces the
/// previous content of its panel.
pub trait RenderSink {
    /// Plain text (placeholder or error message) in place of a panel's content.
    fn set_panel_text(&mut self, panel: Panel, text: &str);
    fn set_latest(&mut self, view: &LatestView);
    fn set_run_rows(&mut self, rows: &[RunRow]);
    fn set_alert_items(&mut self, items: &[AlertItem]);
}

impl LatestView {
    pub fn from_run(run: &RunRecord) -> Self {
        Self {
            status: or_dash(run.status.as_deref()),
            model_signature: or_dash(run.model_signature.as_deref()),
            equity: format_number(run.equity.as_ref()),
            buying_power: format_number(run.buying_power.as_ref()),
            timestamp: format_time(run.timestamp.as_deref()),
            positions: run
                .position_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| or_dash(None)),
            account_error: run.account_error.clone(),
        }
    }
}

impl RunRow {
    pub fn from_run(run: &RunRecord) -> Self {
        Self {
            timestamp: format_time(run.timestamp.as_deref()),
            run_id: or_dash(run.run_id.as_deref()),
            model_signature: or_dash(run.model_signature.as_deref()),
            status: or_dash(run.status.as_deref()),
            equity: format_number(run.equity.as_ref()),
            buying_power: format_number(run.buying_power.as_ref()),
        }
    }
}

impl AlertItem {
    pub fn from_alert(alert: &AlertRecord) -> Self {
        let details = match &alert.details {
            Some(d) => serde_json::to_string_pretty(d).unwrap_or_else(|_| d.to_string()),
            None => "{}".to_string(),
        };
        Self {
            event: or_dash(alert.event.as_deref()),
            timestamp: format_time(alert.timestamp.as_deref()),
            details,
            delivery_error: alert.is_delivery_error(),
        }
    }
}

/// Sort runs newest first. Runs without a timestamp go last; among equal
/// timestamps the later line in the file comes first.
pub fn sort_runs_desc(runs: &mut [RunRecord]) {
    runs.reverse();
    runs.sort_by(|a, b| match (&a.timestamp, &b.timestamp) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Write the latest-run panel. `None` only writes the placeholder.
pub fn render_latest(sink: &mut impl RenderSink, run: Option<&RunRecord>) {
    match run {
        None => sink.set_panel_text(Panel::Latest, NO_RUNS),
        Some(run) => sink.set_latest(&LatestView::from_run(run)),
    }
}

/// Replace the run table body with one row per run, in the given order.
pub fn render_run_table(sink: &mut impl RenderSink, runs: &[RunRecord]) {
    let rows: Vec<RunRow> = runs.iter().map(RunRow::from_run).collect();
    sink.set_run_rows(&rows);
}

/// Write the newest `limit` alerts (file order is chronological), newest first.
pub fn render_alerts(sink: &mut impl RenderSink, alerts: &[AlertRecord], limit: usize) {
    if alerts.is_empty() {
        sink.set_panel_text(Panel::Alerts, NO_ALERTS);
        return;
    }
    let start = alerts.len().saturating_sub(limit);
    let items: Vec<AlertItem> = alerts[start..].iter().rev().map(AlertItem::from_alert).collect();
    sink.set_alert_items(&items);
}

/// User-facing text for a failed load.
pub fn error_text(err: &LoadError) -> String {
    match err {
        LoadError::Fetch { path, status } => format!("Failed to load {}: HTTP {}", path, status),
        LoadError::Transport { path, source } => format!("Failed to load {}: {}", path, source),
        LoadError::Io { path, source } => format!("Failed to read {}: {}", path, source),
        LoadError::Parse { line, .. } => format!("Invalid JSON line: {}", line),
    }
}
