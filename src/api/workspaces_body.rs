use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use k8s_openapi::api::core::v1::Namespace;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::TenancyIdentity;

use super::API_VERSION;

/// Request body for `POST /v1/workspaces` (§4.3).
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CreateWorkspaceBody {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Response shape for every workspace endpoint (§4.3: "all JSON
/// request/response bodies carry an explicit `version: \"v1\"` field").
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceBody {
    pub workspace_id: String,
    pub workspace_name: String,
    pub name: String,
    pub organization_id: String,
    pub user_id: String,

    #[serde(default)]
    pub description: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub status: String,
    pub version: String,
}

impl WorkspaceBody {
    pub fn from_namespace(namespace: &Namespace, identity: &TenancyIdentity, name: &str) -> Self {
        Self {
            workspace_id: identity.workspace_id.clone(),
            workspace_name: identity.workspace_name.clone(),
            name: name.to_string(),
            organization_id: identity.organization_id.clone(),
            user_id: identity.user_id.clone(),
            description: namespace
                .metadata
                .annotations
                .as_ref()
                .and_then(|annotations| annotations.get("mcp.nimbletools.dev/description"))
                .cloned(),
            created_at: namespace.metadata.creation_timestamp.as_ref().map(|time| time.0),
            status: "created".to_string(),
            version: API_VERSION.to_string(),
        }
    }
}

impl Default for WorkspaceBody {
    fn default() -> Self {
        Self {
            workspace_id: "11111111-1111-1111-1111-111111111111".to_string(),
            workspace_name: "demo-11111111-1111-1111-1111-111111111111".to_string(),
            name: "demo".to_string(),
            organization_id: "22222222-2222-2222-2222-222222222222".to_string(),
            user_id: "33333333-3333-3333-3333-333333333333".to_string(),
            description: None,
            created_at: None,
            status: "created".to_string(),
            version: API_VERSION.to_string(),
        }
    }
}

impl IntoResponse for WorkspaceBody {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkspaceList(pub Vec<WorkspaceBody>);

impl IntoResponse for WorkspaceList {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}
