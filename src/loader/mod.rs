//! JSONL log loader.
//!
//! A load is all-or-nothing: the resource is retrieved, blank lines are
//! skipped, and every remaining line must parse as JSON or the whole load
//! fails with the offending line.

use crate::config::DataConfig;
use crate::records::{AlertRecord, RunRecord};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load {path}: {status}")]
    Fetch { path: String, status: u16 },
    #[error("request for {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON line: {line}")]
    Parse {
        line: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the JSONL resources are retrieved from.
#[derive(Debug, Clone)]
pub enum LogSource {
    /// GET `<base_url><path>`.
    Http {
        client: reqwest::Client,
        base_url: String,
    },
    /// Read the resource's file name from a local directory.
    Dir(PathBuf),
}

impl LogSource {
    pub fn http(base_url: impl Into<String>) -> Self {
        LogSource::Http {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(dir: impl Into<PathBuf>) -> Self {
        LogSource::Dir(dir.into())
    }

    pub fn from_config(config: &DataConfig) -> Self {
        match &config.base_url {
            Some(url) => Self::http(url.clone()),
            None => Self::dir(config.dir.clone()),
        }
    }

    /// Retrieve the raw body of `path`.
    pub async fn fetch(&self, path: &str) -> Result<String, LoadError> {
        match self {
            LogSource::Http { client, base_url } => {
                let url = format!("{}{}", base_url, path);
                let resp = client.get(&url).send().await.map_err(|e| LoadError::Transport {
                    path: path.to_string(),
                    source: e,
                })?;

                if !resp.status().is_success() {
                    return Err(LoadError::Fetch {
                        path: path.to_string(),
                        status: resp.status().as_u16(),
                    });
                }

                resp.text().await.map_err(|e| LoadError::Transport {
                    path: path.to_string(),
                    source: e,
                })
            }
            LogSource::Dir(dir) => {
                let file = dir.join(file_name(path));
                match tokio::fs::read_to_string(&file).await {
                    Ok(body) => Ok(body),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LoadError::Fetch {
                        path: path.to_string(),
                        status: 404,
                    }),
                    Err(e) => Err(LoadError::Io {
                        path: path.to_string(),
                        source: e,
                    }),
                }
            }
        }
    }

    /// Retrieve `path` and parse it as JSONL, preserving file order.
    pub async fn load(&self, path: &str) -> Result<Vec<Value>, LoadError> {
        let body = self.fetch(path).await?;
        let records = parse_jsonl(&body)?;
        debug!(path, records = records.len(), "loaded log");
        Ok(records)
    }

    pub async fn load_runs(&self, path: &str) -> Result<Vec<RunRecord>, LoadError> {
        let values = self.load(path).await?;
        Ok(values.iter().map(RunRecord::from_value).collect())
    }

    pub async fn load_alerts(&self, path: &str) -> Result<Vec<AlertRecord>, LoadError> {
        let values = self.load(path).await?;
        Ok(values.iter().map(AlertRecord::from_value).collect())
    }
}

/// Parse newline-delimited JSON. Whitespace-only lines are skipped; the first
/// malformed line aborts the parse.
pub fn parse_jsonl(body: &str) -> Result<Vec<Value>, LoadError> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str::<Value>(line).map_err(|e| LoadError::Parse {
                line: line.to_string(),
                source: e,
            })
        })
        .collect()
}

/// Last path segment of a resource path (`/data/live_runs.jsonl` → `live_runs.jsonl`).
fn file_name(path: &str) -> &Path {
    Path::new(path.rsplit('/').next().unwrap_or(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_preserves_order_and_skips_blank_lines() {
        let body = "{\"a\":1}\n\n   \n{\"a\":2}\r\n\t\n{\"a\":3}\n";
        let records = parse_jsonl(body).unwrap();
        assert_eq!(records, vec![json!({"a": 1}), json!({"a": 2}), json!({"a": 3})]);
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(parse_jsonl("").unwrap().is_empty());
        assert!(parse_jsonl("\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_line_fails_whole_load() {
        for body in [
            "{not json}\n{\"a\":1}",
            "{\"a\":1}\n{not json}\n{\"a\":2}",
            "{\"a\":1}\n{\"a\":2}\n{not json",
        ] {
            match parse_jsonl(body) {
                Err(LoadError::Parse { line, .. }) => assert!(line.starts_with("{not json")),
                other => panic!("expected parse error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/data/live_runs.jsonl"), Path::new("live_runs.jsonl"));
        assert_eq!(file_name("live_alerts.jsonl"), Path::new("live_alerts.jsonl"));
    }

    #[test]
    fn test_fetch_error_message() {
        let err = LoadError::Fetch {
            path: "/data/live_runs.jsonl".to_string(),
            status: 500,
        };
        assert_eq!(err.to_string(), "Failed to load /data/live_runs.jsonl: 500");
    }

    #[tokio::test]
    async fn test_dir_source_loads_runs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("live_runs.jsonl"),
            "{\"run_id\":\"a\",\"equity\":1}\n\n{\"run_id\":\"b\",\"equity\":\"2\"}\n",
        )
        .unwrap();

        let source = LogSource::dir(dir.path());
        let runs = source.load_runs("/data/live_runs.jsonl").await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].run_id.as_deref(), Some("a"));
        assert_eq!(runs[1].run_id.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_dir_source_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let source = LogSource::dir(dir.path());
        match source.load("/data/live_alerts.jsonl").await {
            Err(LoadError::Fetch { path, status }) => {
                assert_eq!(path, "/data/live_alerts.jsonl");
                assert_eq!(status, 404);
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[test]
    fn test_http_source_trims_trailing_slash() {
        match LogSource::http("http://127.0.0.1:8000/") {
            LogSource::Http { base_url, .. } => assert_eq!(base_url, "http://127.0.0.1:8000"),
            LogSource::Dir(_) => panic!("expected http source"),
        }
    }
}
