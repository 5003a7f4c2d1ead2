use aide::axum::routing::get_with;
use aide::axum::{ApiRouter, IntoApiResponse};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api as KubeApi, ListParams, LogParams};
use kube::ResourceExt;
use tower_http::timeout::TimeoutLayer;

use crate::operator::{MCPService, ResourceManager};
use crate::utils::{server_label_selector, LOG_QUERY_LIMIT_DEFAULT, LOG_QUERY_LIMIT_MAX};
use crate::{Error, Result};

use super::{logs_docs, servers, ApiContext, AuthenticatedUser, LogEntry, LogLevel, LogQuery, LogResponse};

const CONTAINER_NAME: &str = "mcp-server";

fn validate_limit(limit: Option<i64>) -> Result<i64> {
    let limit = limit.unwrap_or(LOG_QUERY_LIMIT_DEFAULT);
    if limit < 1 || limit > LOG_QUERY_LIMIT_MAX {
        return Err(Error::validation(format!(
            "'limit' must be between 1 and {LOG_QUERY_LIMIT_MAX}, got {limit}"
        ))
        .with_name("E_INVALID_LOG_LIMIT")
        .with_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY));
    }
    Ok(limit)
}

fn parse_rfc3339_param(value: Option<&str>, field: &str) -> Result<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|_| {
                Error::validation(format!("'{field}' must be a valid RFC-3339 timestamp"))
                    .with_name("E_INVALID_LOG_QUERY")
                    .with_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY)
            }),
    }
}

/// Find a recognisable level token in a log message, either bracketed
/// (`[ERROR] disk full`) or bare (`WARN: disk almost full`) (§4.3.2 step 3).
fn detect_level(message: &str) -> Option<LogLevel> {
    if let Some(start) = message.find('[') {
        if let Some(len) = message[start..].find(']') {
            let token = &message[start + 1..start + len];
            if let Some(level) = LogLevel::parse(token) {
                return Some(level);
            }
        }
    }
    message.split(|c: char| !c.is_ascii_alphabetic()).find_map(LogLevel::parse)
}

/// Parse one raw line returned by the cluster log API into a structured
/// entry. Every fetch sets [`LogParams::timestamps`], so each line is
/// prefixed by Kubernetes itself with an RFC-3339 timestamp regardless of
/// whatever format (if any) the application logged in — that prefix is the
/// timestamp of record, not a best-effort guess (§4.3.2 step 3).
fn parse_log_line(raw: &str, pod_name: &str, container_name: &str) -> LogEntry {
    let (timestamp, rest) = match raw.split_once(' ') {
        Some((head, tail)) => match DateTime::parse_from_rfc3339(head) {
            Ok(parsed) => (parsed.with_timezone(&Utc), tail),
            Err(_) => (Utc::now(), raw),
        },
        None => (Utc::now(), raw),
    };

    LogEntry {
        timestamp,
        level: detect_level(rest).unwrap_or_default(),
        message: rest.trim().to_string(),
        pod_name: pod_name.to_string(),
        container_name: container_name.to_string(),
    }
}

/// Handler for `GET /v1/workspaces/{id}/servers/{name}/logs` (§4.3.2).
pub async fn list(
    State(ctx): State<ApiContext>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((workspace_id, name)): Path<(String, String)>,
    Query(query): Query<LogQuery>,
) -> impl IntoApiResponse {
    async move {
        let limit = validate_limit(query.limit)?;
        let since = parse_rfc3339_param(query.since.as_deref(), "since")?;
        let until = parse_rfc3339_param(query.until.as_deref(), "until")?;

        let namespace = servers::authorize_workspace(&ctx, &user, &workspace_id).await?;
        let namespace_name = namespace.name_any();

        // Confirm the server exists so a typo'd name yields 404, not an empty log set.
        let _service = MCPService::get_by_name(&ctx.client(), &namespace_name, &name).await?;

        let selector = server_label_selector(&name);
        let pods: KubeApi<Pod> = KubeApi::namespaced(ctx.client(), &namespace_name);
        let pod_list = pods
            .list(&ListParams::default().labels(&selector))
            .await
            .map_err(Error::from)?;

        let tail_lines = limit.saturating_mul(2);
        let mut entries = Vec::new();

        for pod in &pod_list.items {
            let pod_name = pod.name_any();
            if let Some(filter) = &query.pod_name {
                if filter != &pod_name {
                    continue;
                }
            }

            let log_params = LogParams {
                timestamps: true,
                tail_lines: Some(tail_lines),
                since_seconds: since.map(|since| (Utc::now() - since).num_seconds().max(0)),
                ..Default::default()
            };

            let raw = match pods.logs(&pod_name, &log_params).await {
                Ok(raw) => raw,
                Err(error) => {
                    tracing::warn!(pod = %pod_name, %error, "failed to fetch pod logs");
                    continue;
                }
            };

            for line in raw.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                let entry = parse_log_line(line, &pod_name, CONTAINER_NAME);
                if let Some(until) = until {
                    if entry.timestamp > until {
                        continue;
                    }
                }
                if let Some(min_level) = query.level {
                    if entry.level < min_level {
                        continue;
                    }
                }
                entries.push(entry);
            }
        }

        // Newest first; ties broken by pod name (§5: "Log aggregation
        // preserves the newest-first total order ... ties broken by pod name").
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.pod_name.cmp(&b.pod_name)));
        let has_more = entries.len() as i64 > limit;
        entries.truncate(limit as usize);

        Ok::<_, Error>(LogResponse::new(entries, has_more))
    }
    .await
    .into_response()
}

pub fn router(ctx: ApiContext) -> ApiRouter<()> {
    ApiRouter::new()
        .api_route("/", get_with(list, logs_docs::list_docs))
        .layer(TimeoutLayer::new(super::server::LOG_REQUEST_TIMEOUT))
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_level_bracketed_form() {
        assert_eq!(detect_level("[ERROR] disk full"), Some(LogLevel::Error));
    }

    #[test]
    fn test_detect_level_bare_warn_maps_to_warning() {
        assert_eq!(detect_level("WARN: disk almost full"), Some(LogLevel::Warning));
    }

    #[test]
    fn test_detect_level_bare_fatal_maps_to_critical() {
        assert_eq!(detect_level("FATAL: cannot continue"), Some(LogLevel::Critical));
    }

    #[test]
    fn test_detect_level_unrecognised_is_none() {
        assert_eq!(detect_level("just a plain message"), None);
    }

    #[test]
    fn test_parse_log_line_uses_k8s_prefixed_timestamp() {
        let entry = parse_log_line(
            "2024-01-01T12:00:00.000000000Z [INFO] server started",
            "pod-a",
            CONTAINER_NAME,
        );
        assert_eq!(entry.timestamp.to_rfc3339(), "2024-01-01T12:00:00+00:00");
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "[INFO] server started");
        assert_eq!(entry.pod_name, "pod-a");
    }

    #[test]
    fn test_parse_log_line_falls_back_to_now_without_timestamp_prefix() {
        let entry = parse_log_line("not-a-timestamp some text", "pod-a", CONTAINER_NAME);
        assert_eq!(entry.level, LogLevel::Info);
    }

    #[test]
    fn test_validate_limit_rejects_zero() {
        assert!(validate_limit(Some(0)).is_err());
    }

    #[test]
    fn test_validate_limit_rejects_over_max() {
        assert!(validate_limit(Some(1001)).is_err());
    }

    #[test]
    fn test_validate_limit_accepts_max() {
        assert_eq!(validate_limit(Some(1000)).unwrap(), 1000);
    }

    #[test]
    fn test_validate_limit_defaults_to_ten() {
        assert_eq!(validate_limit(None).unwrap(), 10);
    }

    #[test]
    fn test_parse_rfc3339_param_rejects_garbage() {
        assert!(parse_rfc3339_param(Some("not-a-date"), "since").is_err());
    }

    #[test]
    fn test_parse_rfc3339_param_accepts_valid_timestamp() {
        let parsed = parse_rfc3339_param(Some("2024-01-01T00:00:00Z"), "since").unwrap();
        assert!(parsed.is_some());
    }
}
