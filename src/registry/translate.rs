use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::operator::{
    validate_replicas, ContainerSpec, DeploymentSpec, EnvironmentVariableDeclaration, MCPServiceSpec,
    PackageDescriptor, Protocol, RoutingSpec, ScalingSpec, StdioSpec,
};
use crate::utils::{service_labels, TenancyIdentity};
use crate::{Error, Result};

use super::select_package_for_arch;

/// Namespace this platform reads operational overrides from inside a
/// `server.json`'s `_meta` map (§4.3.1 step 5: "unknown `_meta` namespaces
/// are ignored"). Everything else in `_meta` is copied through untouched
/// but never interpreted.
pub const META_NAMESPACE: &str = "dev.nimbletools";

/// A `server.json` document, per the MCP registry schema (§3.1, glossary).
/// Only the fields this platform understands are modeled; anything else
/// round-trips through `_meta` without being parsed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerJson {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub packages: Vec<PackageDescriptor>,

    #[serde(rename = "_meta", default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

/// Operational overrides this platform reads from `_meta["dev.nimbletools"]`.
/// `server.json` itself only describes packaging; routing, scaling, and
/// resource shape are platform concerns layered on top.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NimbletoolsMeta {
    #[serde(default)]
    pub runtime: Option<String>,

    #[serde(default)]
    pub protocol: Option<Protocol>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub health_path: Option<String>,

    #[serde(default)]
    pub stdio: Option<StdioSpec>,

    #[serde(default)]
    pub replicas: Option<i32>,

    #[serde(default)]
    pub scaling: Option<ScalingSpec>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

const DEFAULT_PORT: u16 = 8080;

/// Translate a `server.json` document into an `MCPService` spec (§4.3.1,
/// §4.4). Pure: no I/O, no cluster access. Returns the server name, the
/// desired spec (image left blank; the reconciler resolves it, §4.1 step 2),
/// and the tenancy labels to apply.
pub fn translate(
    server_json: &ServerJson,
    identity: &TenancyIdentity,
    cluster_arch: &str,
) -> Result<(String, MCPServiceSpec, BTreeMap<String, String>)> {
    if server_json.name.trim().is_empty() {
        return Err(invalid_definition("server.json 'name' must not be empty"));
    }
    if server_json.packages.is_empty() {
        return Err(invalid_definition(
            "server.json must declare at least one package",
        ));
    }

    let meta = parse_meta(server_json)?;

    let package = select_package_for_arch(&server_json.packages, cluster_arch).ok_or_else(|| {
        Error::validation(format!(
            "no package matches cluster architecture '{cluster_arch}'"
        ))
        .with_name("E_ARCHITECTURE_MISMATCH")
        .with_status(StatusCode::UNPROCESSABLE_ENTITY)
    })?;

    if package.registry_type == "mcpb" {
        validate_mcpb_url(&package.identifier, cluster_arch)?;
    }

    let protocol = meta.protocol.unwrap_or(Protocol::Http);
    let port = meta.port.unwrap_or(DEFAULT_PORT);

    let spec = MCPServiceSpec {
        container: ContainerSpec {
            image: String::new(),
            registry: None,
            port,
        },
        deployment: DeploymentSpec {
            protocol,
            health_path: meta.health_path.clone(),
            stdio: meta.stdio.clone(),
        },
        packages: server_json.packages.clone(),
        runtime: meta.runtime.clone(),
        replicas: meta.replicas.unwrap_or(1),
        scaling: meta.scaling.clone().unwrap_or_default(),
        resources: Default::default(),
        routing: RoutingSpec {
            path: server_json.name.clone(),
            port,
            ..Default::default()
        },
        environment: meta.environment.clone(),
        environment_variables: package.environment_variables.clone(),
    };

    // §3 invariants: `maxReplicas ≥ minReplicas ≥ 0`; `replicas ≥ scaling.minReplicas`.
    validate_replicas(spec.replicas, &spec.scaling)?;

    let labels = service_labels(identity, &server_json.name);
    Ok((server_json.name.clone(), spec, labels))
}

fn parse_meta(server_json: &ServerJson) -> Result<NimbletoolsMeta> {
    match server_json.meta.get(META_NAMESPACE) {
        Some(value) => serde_json::from_value(value.clone()).map_err(|error| {
            Error::from(error)
                .with_name("E_INVALID_SERVER_DEFINITION")
                .with_status(StatusCode::UNPROCESSABLE_ENTITY)
        }),
        None => Ok(NimbletoolsMeta::default()),
    }
}

fn invalid_definition(message: impl Into<String>) -> Error {
    Error::validation(message.into())
        .with_name("E_INVALID_SERVER_DEFINITION")
        .with_status(StatusCode::UNPROCESSABLE_ENTITY)
}

/// §4.3.1 step 4: the identifier must be a `.mcpb` URL carrying a
/// `linux-{arch}` marker, for the cluster's own architecture.
fn validate_mcpb_url(identifier: &str, cluster_arch: &str) -> Result<()> {
    if !identifier.ends_with(".mcpb") {
        return Err(Error::validation(format!(
            "mcpb package identifier '{identifier}' does not end in '.mcpb'"
        ))
        .with_name("E_INVALID_MCPB_URL")
        .with_status(StatusCode::UNPROCESSABLE_ENTITY));
    }
    if !identifier.contains(&format!("linux-{cluster_arch}")) {
        return Err(Error::validation(format!(
            "mcpb package identifier '{identifier}' carries no architecture marker for '{cluster_arch}'"
        ))
        .with_name("E_INVALID_MCPB_URL")
        .with_status(StatusCode::UNPROCESSABLE_ENTITY));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> TenancyIdentity {
        TenancyIdentity {
            workspace_id: "11111111-1111-1111-1111-111111111111".to_string(),
            workspace_name: "demo-1111".to_string(),
            user_id: "22222222-2222-2222-2222-222222222222".to_string(),
            organization_id: "33333333-3333-3333-3333-333333333333".to_string(),
        }
    }

    fn package(registry_type: &str, identifier: &str) -> PackageDescriptor {
        PackageDescriptor {
            registry_type: registry_type.to_string(),
            identifier: identifier.to_string(),
            version: Some("1.0.0".to_string()),
            sha256: None,
            runtime_arguments: Vec::new(),
            environment_variables: Vec::new(),
            transport: None,
        }
    }

    fn server_json(packages: Vec<PackageDescriptor>) -> ServerJson {
        ServerJson {
            name: "echo".to_string(),
            description: None,
            packages,
            meta: BTreeMap::new(),
        }
    }

    #[test]
    fn test_translate_oci_server_succeeds() {
        let doc = server_json(vec![package("oci", "org/echo")]);
        let (name, spec, labels) = translate(&doc, &identity(), "amd64").unwrap();
        assert_eq!(name, "echo");
        assert_eq!(spec.routing.path, "echo");
        assert_eq!(labels.get("mcp.nimbletools.dev/server").unwrap(), "echo");
    }

    #[test]
    fn test_translate_rejects_empty_name() {
        let mut doc = server_json(vec![package("oci", "org/echo")]);
        doc.name = "  ".to_string();
        assert!(translate(&doc, &identity(), "amd64").is_err());
    }

    #[test]
    fn test_translate_rejects_no_packages() {
        let doc = server_json(vec![]);
        assert!(translate(&doc, &identity(), "amd64").is_err());
    }

    #[test]
    fn test_translate_architecture_mismatch() {
        let doc = server_json(vec![package(
            "mcpb",
            "https://example.com/tool-linux-amd64.mcpb",
        )]);
        let result = translate(&doc, &identity(), "arm64");
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().code.unwrap().into_status_code(),
            422
        );
    }

    #[test]
    fn test_translate_invalid_mcpb_url_missing_extension() {
        let doc = server_json(vec![package(
            "mcpb",
            "https://example.com/tool-linux-amd64.zip",
        )]);
        let result = translate(&doc, &identity(), "amd64");
        assert!(result.is_err());
    }

    #[test]
    fn test_translate_mcpb_server_injects_runtime_from_meta() {
        let mut doc = server_json(vec![package(
            "mcpb",
            "https://example.com/tool-linux-amd64.mcpb",
        )]);
        let mut meta = BTreeMap::new();
        meta.insert(
            META_NAMESPACE.to_string(),
            serde_json::json!({ "runtime": "python:3.14" }),
        );
        doc.meta = meta;
        let (_, spec, _) = translate(&doc, &identity(), "amd64").unwrap();
        assert_eq!(spec.runtime, Some("python:3.14".to_string()));
    }

    #[test]
    fn test_translate_rejects_negative_replicas() {
        let mut doc = server_json(vec![package("oci", "org/echo")]);
        let mut meta = BTreeMap::new();
        meta.insert(
            META_NAMESPACE.to_string(),
            serde_json::json!({ "replicas": -1 }),
        );
        doc.meta = meta;
        let result = translate(&doc, &identity(), "amd64");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code.unwrap().into_status_code(), 422);
    }

    #[test]
    fn test_translate_rejects_max_replicas_below_min() {
        let mut doc = server_json(vec![package("oci", "org/echo")]);
        let mut meta = BTreeMap::new();
        meta.insert(
            META_NAMESPACE.to_string(),
            serde_json::json!({ "scaling": { "minReplicas": 3, "maxReplicas": 1 } }),
        );
        doc.meta = meta;
        assert!(translate(&doc, &identity(), "amd64").is_err());
    }

    #[test]
    fn test_translate_unknown_meta_namespace_is_ignored() {
        let mut doc = server_json(vec![package("oci", "org/echo")]);
        let mut meta = BTreeMap::new();
        meta.insert(
            "some.other.vendor".to_string(),
            serde_json::json!({ "whatever": true }),
        );
        doc.meta = meta;
        assert!(translate(&doc, &identity(), "amd64").is_ok());
    }
}
