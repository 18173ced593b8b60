//! HTML page sink. Each panel is held as an escaped fragment and assembled
//! into the full dashboard page by [`HtmlSink::render_page`].

use super::{AlertItem, LatestView, Panel, RenderSink, RunRow, NO_RUNS, RUN_COLUMNS};

/// Panels nothing wrote to stay empty.
#[derive(Debug, Clone, Default)]
pub struct HtmlSink {
    latest: String,
    run_rows: String,
    alerts: String,
}

impl HtmlSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest_html(&self) -> &str {
        &self.latest
    }

    pub fn run_rows_html(&self) -> &str {
        &self.run_rows
    }

    pub fn alerts_html(&self) -> &str {
        &self.alerts
    }

    /// Assemble the complete page. `refresh_secs == 0` disables auto-refresh.
    pub fn render_page(&self, refresh_secs: u64) -> String {
        let refresh = if refresh_secs > 0 {
            format!("<meta http-equiv=\"refresh\" content=\"{}\">", refresh_secs)
        } else {
            String::new()
        };
        let header: String = RUN_COLUMNS.iter().map(|c| format!("<th>{}</th>", c)).collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
{refresh}
<title>Live Trading Monitor</title>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ font-family: 'SF Mono', 'Fira Code', monospace; background: #0d1117; color: #c9d1d9; padding: 20px; }}
  h1 {{ color: #58a6ff; margin-bottom: 20px; font-size: 1.4em; }}
  h2 {{ color: #8b949e; margin: 20px 0 10px 0; font-size: 1.1em; border-bottom: 1px solid #21262d; padding-bottom: 5px; }}
  .cards {{ display: flex; gap: 15px; margin-bottom: 20px; flex-wrap: wrap; }}
  .card {{ background: #161b22; border: 1px solid #30363d; border-radius: 8px; padding: 15px 20px; min-width: 160px; }}
  .card .label {{ color: #8b949e; font-size: 0.75em; text-transform: uppercase; letter-spacing: 1px; }}
  .card .value {{ font-size: 1.3em; font-weight: bold; margin-top: 4px; }}
  .panel-text {{ color: #8b949e; padding: 10px 0; }}
  .warn {{ color: #e74c3c; margin-bottom: 10px; }}
  table {{ width: 100%; border-collapse: collapse; background: #161b22; border: 1px solid #30363d; border-radius: 8px; overflow: hidden; margin-bottom: 15px; }}
  th {{ background: #21262d; color: #8b949e; text-align: left; padding: 8px 12px; font-size: 0.8em; text-transform: uppercase; letter-spacing: 0.5px; }}
  td {{ padding: 8px 12px; border-top: 1px solid #21262d; font-size: 0.85em; }}
  tr:hover {{ background: #1c2128; }}
  .alert {{ background: #161b22; border: 1px solid #30363d; border-radius: 6px; padding: 10px 14px; margin-bottom: 10px; }}
  .alert.delivery {{ border-color: #e74c3c; }}
  .alert .event {{ font-weight: bold; color: #e67e22; }}
  .alert .time {{ color: #8b949e; font-size: 0.8em; margin-left: 8px; }}
  .alert pre {{ margin-top: 6px; font-size: 0.8em; white-space: pre-wrap; color: #8b949e; }}
</style>
</head>
<body>
<h1>Live Trading Monitor</h1>

<h2>Latest Run</h2>
<div id="latest-summary">
{latest}
</div>

<h2>Run History</h2>
<table>
  <thead><tr>{header}</tr></thead>
  <tbody id="runs-body">
  {run_rows}
  </tbody>
</table>

<h2>Recent Alerts</h2>
<div id="alerts-summary">
{alerts}
</div>
</body>
</html>"#,
            refresh = refresh,
            latest = self.latest,
            header = header,
            run_rows = self.run_rows,
            alerts = self.alerts,
        )
    }
}

impl RenderSink for HtmlSink {
    fn set_panel_text(&mut self, panel: Panel, text: &str) {
        match panel {
            Panel::Latest => self.latest = text_block(text),
            Panel::Alerts => self.alerts = text_block(text),
        }
    }

    fn set_latest(&mut self, view: &LatestView) {
        let card = |label: &str, value: &str| {
            format!(
                "<div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
                label,
                escape_html(value)
            )
        };
        let warning = view
            .account_error
            .as_deref()
            .map(|e| format!("<div class=\"warn\">Account error: {}</div>", escape_html(e)))
            .unwrap_or_default();

        self.latest = format!(
            "{}<div class=\"cards\">{}{}{}{}{}{}</div>",
            warning,
            card("Status", &view.status),
            card("Model", &view.model_signature),
            card("Equity", &view.equity),
            card("Buying Power", &view.buying_power),
            card("Positions", &view.positions),
            card("Updated", &view.timestamp),
        );
    }

    fn set_run_rows(&mut self, rows: &[RunRow]) {
        self.run_rows = if rows.is_empty() {
            placeholder_row(NO_RUNS)
        } else {
            rows.iter()
                .map(|row| {
                    let cells: String = row
                        .cells()
                        .iter()
                        .map(|c| format!("<td>{}</td>", escape_html(c)))
                        .collect();
                    format!("<tr>{}</tr>", cells)
                })
                .collect()
        };
    }

    fn set_alert_items(&mut self, items: &[AlertItem]) {
        self.alerts = items
            .iter()
            .map(|item| {
                format!(
                    "<div class=\"alert{}\"><span class=\"event\">{}</span><span class=\"time\">{}</span><pre>{}</pre></div>",
                    if item.delivery_error { " delivery" } else { "" },
                    escape_html(&item.event),
                    escape_html(&item.timestamp),
                    escape_html(&item.details),
                )
            })
            .collect();
    }
}

fn text_block(text: &str) -> String {
    format!("<div class=\"panel-text\">{}</div>", escape_html(text))
}

fn placeholder_row(text: &str) -> String {
    format!(
        "<tr><td colspan=\"{}\" style=\"text-align:center;color:#666\">{}</td></tr>",
        RUN_COLUMNS.len(),
        escape_html(text)
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
