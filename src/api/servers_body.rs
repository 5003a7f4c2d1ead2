use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::operator::{validate_replicas, MCPService, MCPServiceSpec, MCPServiceStatus};
use crate::Error;

use super::API_VERSION;

/// Response shape for every server endpoint (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerBody {
    pub name: String,
    pub workspace_id: String,

    #[serde(flatten)]
    pub spec: MCPServiceSpec,

    pub status: MCPServiceStatus,
    pub version: String,
}

impl ServerBody {
    pub fn from_service(service: MCPService, workspace_id: &str) -> Self {
        use kube::ResourceExt;
        Self {
            name: service.name_any(),
            workspace_id: workspace_id.to_string(),
            spec: service.spec,
            status: service.status.unwrap_or_default(),
            version: API_VERSION.to_string(),
        }
    }
}

impl Default for ServerBody {
    fn default() -> Self {
        Self {
            name: "echo".to_string(),
            workspace_id: "11111111-1111-1111-1111-111111111111".to_string(),
            spec: MCPServiceSpec::default(),
            status: MCPServiceStatus::default(),
            version: API_VERSION.to_string(),
        }
    }
}

impl IntoResponse for ServerBody {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ServerList(pub Vec<ServerBody>);

impl IntoResponse for ServerList {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}

/// Partial spec accepted by `PATCH /v1/workspaces/{id}/servers/{name}`
/// (§4.3: "Scaling, env updates"). Only the fields a client is expected to
/// revise day-to-day; image/packages/runtime stay under registry control.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatchServerBody {
    #[serde(default)]
    pub replicas: Option<i32>,

    #[serde(default)]
    pub scaling: Option<crate::operator::ScalingSpec>,

    #[serde(default)]
    pub environment: Option<std::collections::BTreeMap<String, String>>,
}

impl PatchServerBody {
    /// Merge this patch onto `spec`, then re-check the §3 replica/scaling
    /// invariants against the merged result (§8: `replicas < 0` → 422) —
    /// a patch that only touches `replicas` must still be checked against
    /// whatever `scaling.minReplicas` the server already has, and vice versa.
    pub fn apply_to(self, mut spec: MCPServiceSpec) -> Result<MCPServiceSpec, Error> {
        if let Some(replicas) = self.replicas {
            spec.replicas = replicas;
        }
        if let Some(scaling) = self.scaling {
            spec.scaling = scaling;
        }
        if let Some(environment) = self.environment {
            spec.environment = environment;
        }
        validate_replicas(spec.replicas, &spec.scaling)?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_server_body_only_touches_supplied_fields() {
        let patch = PatchServerBody {
            replicas: Some(3),
            scaling: None,
            environment: None,
        };
        let spec = MCPServiceSpec {
            replicas: 1,
            ..Default::default()
        };
        let patched = patch.apply_to(spec).unwrap();
        assert_eq!(patched.replicas, 3);
    }

    #[test]
    fn test_patch_server_body_rejects_negative_replicas() {
        let patch = PatchServerBody {
            replicas: Some(-1),
            scaling: None,
            environment: None,
        };
        let spec = MCPServiceSpec {
            replicas: 1,
            ..Default::default()
        };
        let result = patch.apply_to(spec);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code.unwrap().into_status_code(), 422);
    }

    #[test]
    fn test_patch_server_body_rejects_replicas_below_existing_min() {
        let patch = PatchServerBody {
            replicas: Some(1),
            scaling: None,
            environment: None,
        };
        let spec = MCPServiceSpec {
            replicas: 3,
            scaling: crate::operator::ScalingSpec {
                min_replicas: 2,
                max_replicas: 4,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(patch.apply_to(spec).is_err());
    }
}
