//! Plain-text sink for one-shot terminal snapshots.

use super::{AlertItem, LatestView, Panel, RenderSink, RunRow, RUN_COLUMNS};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct TextSink {
    latest: Vec<String>,
    runs: Vec<String>,
    alerts: Vec<String>,
}

impl TextSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSink for TextSink {
    fn set_panel_text(&mut self, panel: Panel, text: &str) {
        let lines = vec![text.to_string()];
        match panel {
            Panel::Latest => self.latest = lines,
            Panel::Alerts => self.alerts = lines,
        }
    }

    fn set_latest(&mut self, view: &LatestView) {
        let mut lines = vec![
            format!("Status:       {}", view.status),
            format!("Model:        {}", view.model_signature),
            format!("Equity:       {}", view.equity),
            format!("Buying power: {}", view.buying_power),
            format!("Positions:    {}", view.positions),
            format!("Updated:      {}", view.timestamp),
        ];
        if let Some(err) = &view.account_error {
            lines.push(format!("Account error: {}", err));
        }
        self.latest = lines;
    }

    fn set_run_rows(&mut self, rows: &[RunRow]) {
        // Column widths fitted to the widest cell.
        let mut widths = RUN_COLUMNS.map(str::len);
        for row in rows {
            for (w, cell) in widths.iter_mut().zip(row.cells()) {
                *w = (*w).max(cell.chars().count());
            }
        }
        let line = |cells: [&str; 6]| {
            cells
                .iter()
                .zip(widths.iter())
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![line(RUN_COLUMNS)];
        out.extend(rows.iter().map(|r| line(r.cells())));
        self.runs = out;
    }

    fn set_alert_items(&mut self, items: &[AlertItem]) {
        let mut out = Vec::new();
        for item in items {
            let marker = if item.delivery_error { "!" } else { "*" };
            out.push(format!("{} {}  {}", marker, item.event, item.timestamp));
            out.extend(item.details.lines().map(|l| format!("    {}", l)));
        }
        self.alerts = out;
    }
}

impl fmt::Display for TextSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = [
            ("Latest Run", &self.latest),
            ("Run History", &self.runs),
            ("Recent Alerts", &self.alerts),
        ];
        for (i, (title, lines)) in sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "== {} ==", title)?;
            for line in lines.iter() {
                writeln!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}
