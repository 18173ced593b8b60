use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Directory the live agent appends its JSONL logs to.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    /// Base URL the logs are fetched from. Unset means read `dir` directly.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_runs_path")]
    pub runs_path: String,
    #[serde(default = "default_alerts_path")]
    pub alerts_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Page auto-refresh interval in seconds (0 disables it).
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    /// Rows shown in the run history table.
    #[serde(default = "default_run_rows")]
    pub run_rows: usize,
    /// Alerts shown in the alert panel.
    #[serde(default = "default_alert_items")]
    pub alert_items: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_runs_path() -> String {
    "/data/live_runs.jsonl".to_string()
}
fn default_alerts_path() -> String {
    "/data/live_alerts.jsonl".to_string()
}
fn default_bind() -> String {
    "127.0.0.1:3040".to_string()
}
fn default_refresh_secs() -> u64 {
    30
}
fn default_run_rows() -> usize {
    25
}
fn default_alert_items() -> usize {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            base_url: None,
            runs_path: default_runs_path(),
            alerts_path: default_alerts_path(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            refresh_secs: default_refresh_secs(),
            run_rows: default_run_rows(),
            alert_items: default_alert_items(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.apply_env();
        Ok(config)
    }

    /// Default config with environment overrides (no file needed).
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("LIVEDASH_DATA_DIR") {
            self.data.dir = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("LIVEDASH_DATA_URL") {
            self.data.base_url = if url.is_empty() { None } else { Some(url) };
        }
        if let Ok(bind) = std::env::var("LIVEDASH_BIND") {
            self.dashboard.bind = bind;
        }
    }
}
