//! Axum-based monitoring dashboard for the live trading agent.
//!
//! Provides:
//!   GET /              → HTML dashboard (auto-refresh)
//!   GET /api/latest    → JSON view of the most recent run
//!   GET /data/<file>   → raw JSONL logs from the data directory

use crate::config::Config;
use crate::loader::LogSource;
use crate::render::{
    error_text, render_alerts, render_latest, render_run_table, sort_runs_desc, HtmlSink,
    LatestView, Panel, RenderSink,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{info, warn};

/// One render pass over the two logs.
#[derive(Debug, Clone)]
pub struct Dashboard {
    source: LogSource,
    runs_path: String,
    alerts_path: String,
    run_rows: usize,
    alert_items: usize,
}

impl Dashboard {
    pub fn new(source: LogSource, runs_path: impl Into<String>, alerts_path: impl Into<String>) -> Self {
        Self {
            source,
            runs_path: runs_path.into(),
            alerts_path: alerts_path.into(),
            run_rows: 25,
            alert_items: 5,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            LogSource::from_config(&config.data),
            config.data.runs_path.clone(),
            config.data.alerts_path.clone(),
        )
        .with_limits(config.dashboard.run_rows, config.dashboard.alert_items)
    }

    pub fn with_limits(mut self, run_rows: usize, alert_items: usize) -> Self {
        self.run_rows = run_rows;
        self.alert_items = alert_items;
        self
    }

    /// Load both logs and write every panel. A failed load only affects its
    /// own panel.
    pub async fn refresh<S: RenderSink>(&self, sink: &mut S) {
        match self.source.load_runs(&self.runs_path).await {
            Ok(mut runs) => {
                sort_runs_desc(&mut runs);
                render_latest(sink, runs.first());
                runs.truncate(self.run_rows);
                render_run_table(sink, &runs);
            }
            Err(e) => {
                warn!(path = %self.runs_path, error = %e, "failed to load runs");
                sink.set_panel_text(Panel::Latest, &error_text(&e));
            }
        }

        match self.source.load_alerts(&self.alerts_path).await {
            Ok(alerts) => render_alerts(sink, &alerts, self.alert_items),
            Err(e) => {
                warn!(path = %self.alerts_path, error = %e, "failed to load alerts");
                sink.set_panel_text(Panel::Alerts, &error_text(&e));
            }
        }
    }
}

/// Shared state for the dashboard routes.
#[derive(Clone)]
pub struct DashboardState {
    pub dashboard: Arc<Dashboard>,
    pub refresh_secs: u64,
}

/// Build the Axum router. `data_dir` is served under `/data`.
pub fn build_router(state: DashboardState, data_dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(dashboard_html))
        .route("/api/latest", get(api_latest))
        .nest_service("/data", ServeDir::new(data_dir))
        .with_state(state)
}

/// Start the dashboard server.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = DashboardState {
        dashboard: Arc::new(Dashboard::from_config(config)),
        refresh_secs: config.dashboard.refresh_secs,
    };
    let app = build_router(state, config.data.dir.clone());
    let listener = tokio::net::TcpListener::bind(&config.dashboard.bind).await?;
    info!(addr = %config.dashboard.bind, "dashboard listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// --- Handlers ---

async fn dashboard_html(State(state): State<DashboardState>) -> Html<String> {
    let mut sink = HtmlSink::new();
    state.dashboard.refresh(&mut sink).await;
    Html(sink.render_page(state.refresh_secs))
}

async fn api_latest(State(state): State<DashboardState>) -> impl IntoResponse {
    let dashboard = &state.dashboard;
    match dashboard.source.load_runs(&dashboard.runs_path).await {
        Ok(mut runs) => {
            sort_runs_desc(&mut runs);
            let latest = runs.first().map(LatestView::from_run);
            Json(serde_json::json!({
                "latest": latest,
                "total_runs": runs.len(),
            }))
            .into_response()
        }
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": error_text(&e) })),
        )
            .into_response(),
    }
}
