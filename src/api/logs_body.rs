use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::API_VERSION;

/// Severity a log entry carries (§3.1). Ordering matches the minimum-severity
/// filter semantics of §4.3.2: `debug < info < warning < error < critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    /// Recognise a level token (bracketed or bare), mapping `WARN ->
    /// warning` and `FATAL -> critical` (§4.3.2 step 3). `None` for anything
    /// unrecognised; callers default to `Info` themselves.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "DEBUG" | "TRACE" => Some(Self::Debug),
            "INFO" | "NOTICE" => Some(Self::Info),
            "WARN" | "WARNING" => Some(Self::Warning),
            "ERROR" | "ERR" => Some(Self::Error),
            "FATAL" | "CRITICAL" | "CRIT" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// One parsed log line (§3.1: "Log Entry (ephemeral, not persisted)").
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub pod_name: String,
    pub container_name: String,
}

/// Query parameters accepted by `GET .../servers/{name}/logs` (§4.3.2).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    #[serde(default)]
    pub limit: Option<i64>,

    /// RFC-3339 timestamp; entries before this are never fetched (passed to
    /// the cluster log API as a server-side time filter, §4.3.2 step 2).
    #[serde(default)]
    pub since: Option<String>,

    /// RFC-3339 timestamp; entries after this are dropped client-side — the
    /// cluster log API has no "until" filter of its own.
    #[serde(default)]
    pub until: Option<String>,

    #[serde(default)]
    pub level: Option<LogLevel>,

    #[serde(default)]
    pub pod_name: Option<String>,
}

/// Response shape for `GET .../servers/{name}/logs` (§4.3.2).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogResponse {
    pub logs: Vec<LogEntry>,
    pub count: usize,
    pub has_more: bool,
    pub query_timestamp: DateTime<Utc>,
    pub version: String,
}

impl LogResponse {
    pub fn new(logs: Vec<LogEntry>, has_more: bool) -> Self {
        Self {
            count: logs.len(),
            logs,
            has_more,
            query_timestamp: Utc::now(),
            version: API_VERSION.to_string(),
        }
    }
}

impl IntoResponse for LogResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Critical);
    }

    #[test]
    fn test_log_level_parse_maps_warn_and_fatal() {
        assert_eq!(LogLevel::parse("WARN"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("fatal"), Some(LogLevel::Critical));
    }

    #[test]
    fn test_log_level_parse_unrecognised_is_none() {
        assert_eq!(LogLevel::parse("whatever"), None);
    }

    #[test]
    fn test_log_response_empty_has_zero_count_and_no_more() {
        let response = LogResponse::new(vec![], false);
        assert_eq!(response.count, 0);
        assert!(!response.has_more);
        assert_eq!(response.version, "v1");
    }
}
