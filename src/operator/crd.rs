use axum::http::StatusCode;
use k8s_openapi::api::core::v1::ResourceRequirements;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{MCPServiceStatus, Protocol};
use crate::Error;

/// Container image coordinates for the server's workload. The image field is
/// filled in by the reconciler (§4.1.2), never supplied directly by a client.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    /// Fully-qualified image reference. Computed by the reconciler from
    /// `packages`/`runtime`; empty until the first successful reconcile.
    #[serde(default)]
    pub image: String,

    /// Registry host the image was resolved from, for display purposes only.
    #[serde(default)]
    pub registry: Option<String>,

    /// Port the server process listens on inside the container.
    pub port: u16,
}

/// Stdio-specific launch parameters, only meaningful when `protocol = Stdio`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StdioSpec {
    pub executable: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub working_dir: Option<String>,
}

/// How the server is addressed once running.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    pub protocol: Protocol,

    /// Path probed for readiness/liveness, distinct from `routing.healthPath`
    /// which is the externally exposed health path.
    #[serde(default)]
    pub health_path: Option<String>,

    #[serde(default)]
    pub stdio: Option<StdioSpec>,
}

/// One architecture-specific package entry as carried in `server.json`.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    pub registry_type: String,
    pub identifier: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub sha256: Option<String>,

    #[serde(default)]
    pub runtime_arguments: Vec<String>,

    #[serde(default)]
    pub environment_variables: Vec<EnvironmentVariableDeclaration>,

    /// Free-form transport metadata (e.g. `file_sha256` alternates, asset
    /// size); copied through verbatim, never interpreted.
    #[serde(default)]
    pub transport: Option<serde_json::Value>,
}

/// A declared, named environment variable resolved from literal values or
/// the workspace secret store (§3.1, §4.1 secret-reference rule).
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVariableDeclaration {
    pub name: String,

    #[serde(default)]
    pub is_secret: bool,

    #[serde(default)]
    pub is_required: bool,

    /// Literal default, used only when no matching workspace secret exists
    /// and `is_secret` is false.
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScalingSpec {
    #[serde(default)]
    pub min_replicas: i32,

    #[serde(default = "default_max_replicas")]
    pub max_replicas: i32,

    #[serde(default)]
    pub target_concurrency: Option<u32>,

    #[serde(default = "default_scale_down_delay")]
    pub scale_down_delay: u32,
}

fn default_max_replicas() -> i32 {
    1
}

fn default_scale_down_delay() -> u32 {
    300
}

/// Enforce the §3 replica/scaling invariants ("`maxReplicas ≥ minReplicas ≥
/// 0`; `replicas ≥ scaling.minReplicas`") at every boundary that accepts a
/// replica count or scaling spec from a caller (§8: `replicas < 0` → 422).
/// Pure: no I/O.
pub fn validate_replicas(replicas: i32, scaling: &ScalingSpec) -> Result<(), Error> {
    if scaling.min_replicas < 0 {
        return Err(invalid_replicas(format!(
            "scaling.minReplicas must be >= 0, got {}",
            scaling.min_replicas
        )));
    }
    if scaling.max_replicas < scaling.min_replicas {
        return Err(invalid_replicas(format!(
            "scaling.maxReplicas ({}) must be >= scaling.minReplicas ({})",
            scaling.max_replicas, scaling.min_replicas
        )));
    }
    if replicas < scaling.min_replicas {
        return Err(invalid_replicas(format!(
            "replicas ({replicas}) must be >= scaling.minReplicas ({})",
            scaling.min_replicas
        )));
    }
    Ok(())
}

fn invalid_replicas(message: String) -> Error {
    Error::validation(message)
        .with_name("E_INVALID_REPLICAS")
        .with_status(StatusCode::UNPROCESSABLE_ENTITY)
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutingSpec {
    /// Path segment for this server within the workspace, usually the
    /// server name.
    pub path: String,

    pub port: u16,

    /// Externally exposed health path; ingress rewrites `/.../health` to this.
    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Externally exposed MCP path; ingress rewrites `/.../mcp` to this.
    #[serde(default = "default_mcp_path")]
    pub mcp_path: String,
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_mcp_path() -> String {
    "/mcp".to_string()
}

/// `MCPService` custom resource: the declarative description of one server
/// within a workspace.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "mcp.nimbletools.dev",
    version = "v1",
    kind = "MCPService",
    singular = "mcpservice",
    plural = "mcpservices",
    shortname = "mcpsvc",
    namespaced,
    status = "MCPServiceStatus",
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Ready", "type":"string", "jsonPath":".status.deploymentStatus.ready"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MCPServiceSpec {
    #[serde(default)]
    pub container: ContainerSpec,

    pub deployment: DeploymentSpec,

    /// Ordered list of architecture-specific package descriptors; empty when
    /// the server is a direct OCI image with no bundle to download.
    #[serde(default)]
    pub packages: Vec<PackageDescriptor>,

    /// Runtime base-image tag from the closed set documented in §3.1, or
    /// absent for a direct OCI image.
    #[serde(default)]
    pub runtime: Option<String>,

    #[serde(default = "default_replicas")]
    pub replicas: i32,

    #[serde(default)]
    pub scaling: ScalingSpec,

    #[serde(default)]
    pub resources: ResourceRequirements,

    pub routing: RoutingSpec,

    /// Literal environment variables, merged with `environment_variables`
    /// (§4.2: literals first, alphabetized, then declared entries in order).
    #[serde(default)]
    pub environment: std::collections::BTreeMap<String, String>,

    #[serde(default)]
    pub environment_variables: Vec<EnvironmentVariableDeclaration>,
}

fn default_replicas() -> i32 {
    1
}

impl Default for MCPServiceSpec {
    fn default() -> Self {
        Self {
            container: ContainerSpec::default(),
            deployment: DeploymentSpec::default(),
            packages: Vec::new(),
            runtime: None,
            replicas: default_replicas(),
            scaling: ScalingSpec::default(),
            resources: ResourceRequirements::default(),
            routing: RoutingSpec::default(),
            environment: Default::default(),
            environment_variables: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::CustomResourceExt;

    #[test]
    fn test_mcp_service_crd_shape() {
        let crd = MCPService::crd();
        assert_eq!(crd.spec.names.kind, "MCPService");
        assert_eq!(crd.spec.names.plural, "mcpservices");
        assert_eq!(crd.spec.names.singular, Some("mcpservice".to_string()));
        assert_eq!(crd.spec.group, "mcp.nimbletools.dev");
        assert_eq!(crd.spec.versions[0].name, "v1");
    }

    #[test]
    fn test_mcp_service_spec_defaults() {
        let spec = MCPServiceSpec {
            routing: RoutingSpec {
                path: "echo".to_string(),
                port: 8080,
                ..Default::default()
            },
            deployment: DeploymentSpec {
                protocol: Protocol::Http,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(spec.replicas, 1);
        assert_eq!(spec.scaling.max_replicas, 1);
        assert_eq!(spec.scaling.min_replicas, 0);
        assert!(spec.packages.is_empty());
        assert_eq!(spec.routing.health_path, "/health");
        assert_eq!(spec.routing.mcp_path, "/mcp");
    }

    #[test]
    fn test_validate_replicas_accepts_defaults() {
        assert!(validate_replicas(1, &ScalingSpec::default()).is_ok());
    }

    #[test]
    fn test_validate_replicas_rejects_negative_min_replicas() {
        let scaling = ScalingSpec {
            min_replicas: -1,
            max_replicas: 1,
            ..Default::default()
        };
        assert_eq!(
            validate_replicas(1, &scaling).unwrap_err().code.unwrap().into_status_code(),
            422
        );
    }

    #[test]
    fn test_validate_replicas_rejects_max_below_min() {
        let scaling = ScalingSpec {
            min_replicas: 3,
            max_replicas: 2,
            ..Default::default()
        };
        assert!(validate_replicas(3, &scaling).is_err());
    }

    #[test]
    fn test_validate_replicas_rejects_replicas_below_min() {
        let scaling = ScalingSpec {
            min_replicas: 2,
            max_replicas: 4,
            ..Default::default()
        };
        assert!(validate_replicas(-1, &scaling).is_err());
        assert!(validate_replicas(1, &scaling).is_err());
    }

    #[test]
    fn test_validate_replicas_accepts_scaled_to_zero() {
        let scaling = ScalingSpec {
            min_replicas: 0,
            max_replicas: 1,
            ..Default::default()
        };
        assert!(validate_replicas(0, &scaling).is_ok());
    }

    #[test]
    fn test_mcp_service_json_roundtrip() {
        let json = r#"
        {
            "apiVersion": "mcp.nimbletools.dev/v1",
            "kind": "MCPService",
            "metadata": { "name": "echo", "namespace": "ws-demo" },
            "spec": {
                "deployment": { "protocol": "Http" },
                "routing": { "path": "echo", "port": 8080 },
                "packages": [
                    { "registryType": "oci", "identifier": "org/echo", "version": "1.2.3" }
                ]
            }
        }
        "#;
        let service: MCPService = serde_json::from_str(json).unwrap();
        assert_eq!(service.spec.routing.path, "echo");
        assert_eq!(service.spec.packages.len(), 1);
        assert_eq!(service.spec.packages[0].identifier, "org/echo");
    }
}
