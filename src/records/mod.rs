//! Typed views of the two JSONL record kinds written by the live agent.
//!
//! The producer is loosely typed (`equity` may be a float or a numeric string,
//! any field may be missing), so records are built from raw `serde_json::Value`s
//! with lenient field access instead of a strict `Deserialize` derive. A line
//! that parses as JSON always yields a record.

use serde::Serialize;
use serde_json::Value;

/// Event name the agent uses when delivering another alert failed.
pub const DELIVERY_ERROR_EVENT: &str = "alert_delivery_error";

/// A numeric field that may arrive as a JSON number or as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => n.as_f64().map(Amount::Number),
            Value::Bool(b) => Some(Amount::Number(if *b { 1.0 } else { 0.0 })),
            Value::String(s) => Some(Amount::Text(s.clone())),
            other => Some(Amount::Text(other.to_string())),
        }
    }
}

/// One line of `live_runs.jsonl`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunRecord {
    pub timestamp: Option<String>,
    pub run_id: Option<String>,
    pub model_signature: Option<String>,
    pub status: Option<String>,
    pub equity: Option<Amount>,
    pub buying_power: Option<Amount>,
    /// Number of open positions reported by the broker, when known.
    pub position_count: Option<usize>,
    /// Broker error recorded instead of an account snapshot.
    pub account_error: Option<String>,
}

impl RunRecord {
    pub fn from_value(value: &Value) -> Self {
        let positions = value.get("positions").and_then(Value::as_array);
        Self {
            timestamp: text_field(value, "timestamp"),
            run_id: text_field(value, "run_id"),
            model_signature: text_field(value, "model_signature"),
            status: text_field(value, "status"),
            equity: value.get("equity").and_then(Amount::from_value),
            buying_power: value.get("buying_power").and_then(Amount::from_value),
            // A failed position listing is logged as a single `{"error": ..}` entry.
            position_count: positions
                .filter(|p| !p.iter().any(|entry| entry.get("error").is_some()))
                .map(Vec::len),
            account_error: value
                .get("account")
                .and_then(|account| text_field(account, "error")),
        }
    }
}

/// One line of `live_alerts.jsonl`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertRecord {
    pub timestamp: Option<String>,
    pub event: Option<String>,
    pub details: Option<Value>,
}

impl AlertRecord {
    pub fn from_value(value: &Value) -> Self {
        Self {
            timestamp: text_field(value, "timestamp"),
            event: text_field(value, "event"),
            details: value.get("details").filter(|d| !d.is_null()).cloned(),
        }
    }

    pub fn is_delivery_error(&self) -> bool {
        self.event.as_deref() == Some(DELIVERY_ERROR_EVENT)
    }
}

/// Reads `key` as display text. Non-string scalars keep their JSON spelling,
/// empty strings count as missing.
fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_record_from_producer_line() {
        let value = json!({
            "timestamp": "2024-01-02T03:04:05.123456",
            "run_id": "run-42",
            "model_signature": "gpt-live",
            "status": "completed",
            "account": {"equity": "10500.25", "buying_power": "20000"},
            "equity": 10500.25,
            "buying_power": "20000",
            "positions": [{"symbol": "AAPL"}, {"symbol": "BTCUSD"}],
            "details": {}
        });
        let run = RunRecord::from_value(&value);

        assert_eq!(run.timestamp.as_deref(), Some("2024-01-02T03:04:05.123456"));
        assert_eq!(run.run_id.as_deref(), Some("run-42"));
        assert_eq!(run.status.as_deref(), Some("completed"));
        assert_eq!(run.equity, Some(Amount::Number(10500.25)));
        assert_eq!(run.buying_power, Some(Amount::Text("20000".to_string())));
        assert_eq!(run.position_count, Some(2));
        assert!(run.account_error.is_none());
    }

    #[test]
    fn test_run_record_missing_and_null_fields() {
        let run = RunRecord::from_value(&json!({"run_id": 7, "status": "", "equity": null}));
        assert_eq!(run.run_id.as_deref(), Some("7"));
        assert!(run.status.is_none());
        assert!(run.equity.is_none());
        assert!(run.timestamp.is_none());
        assert!(run.position_count.is_none());
    }

    #[test]
    fn test_boolean_amounts_count_as_numbers() {
        let run = RunRecord::from_value(&json!({"equity": true, "buying_power": false}));
        assert_eq!(run.equity, Some(Amount::Number(1.0)));
        assert_eq!(run.buying_power, Some(Amount::Number(0.0)));
    }

    #[test]
    fn test_run_record_broker_errors() {
        let run = RunRecord::from_value(&json!({
            "account": {"error": "401 Unauthorized"},
            "positions": [{"error": "401 Unauthorized"}],
            "equity": null
        }));
        assert_eq!(run.account_error.as_deref(), Some("401 Unauthorized"));
        assert!(run.position_count.is_none());
    }

    #[test]
    fn test_non_object_line_yields_empty_record() {
        assert_eq!(RunRecord::from_value(&json!([1, 2, 3])), RunRecord::default());
        assert_eq!(AlertRecord::from_value(&json!("text")), AlertRecord::default());
    }

    #[test]
    fn test_alert_record() {
        let alert = AlertRecord::from_value(&json!({
            "timestamp": "2024-01-02T03:04:05",
            "event": "alert_delivery_error",
            "details": {"webhook_error": "Webhook error 500: boom", "email_error": null}
        }));
        assert!(alert.is_delivery_error());
        assert_eq!(
            alert.details.unwrap()["webhook_error"],
            json!("Webhook error 500: boom")
        );
    }
}
