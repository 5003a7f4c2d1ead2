use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::ObjectMeta;

use crate::operator::MCPService;
use crate::Error;

use super::workload::child_name;

/// Build a `ConfigMap` carrying non-secret literal environment values, when
/// the service declares any (§4.2: "ConfigMap (if env needed)"). Returns
/// `None` when there is nothing to externalize.
pub fn build_configmap(service: &MCPService) -> Result<Option<ConfigMap>, Error> {
    if service.spec.environment.is_empty() {
        return Ok(None);
    }

    let labels = service
        .child_labels()
        .ok_or_else(|| Error::validation("MCPService is missing required tenancy labels"))?;

    Ok(Some(ConfigMap {
        metadata: ObjectMeta {
            name: Some(format!("{}-config", child_name(service))),
            namespace: service.metadata.namespace.clone(),
            labels: Some(labels),
            ..Default::default()
        },
        data: Some(service.spec.environment.clone().into_iter().collect()),
        ..Default::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{DeploymentSpec, MCPServiceSpec, Protocol, RoutingSpec};
    use kube::api::ObjectMeta as Meta;
    use std::collections::BTreeMap;

    fn identity_labels() -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert("mcp.nimbletools.dev/workspace_id".to_string(), "wsid".to_string());
        labels.insert("mcp.nimbletools.dev/workspace_name".to_string(), "demo".to_string());
        labels.insert("mcp.nimbletools.dev/user_id".to_string(), "uid".to_string());
        labels.insert("mcp.nimbletools.dev/organization_id".to_string(), "oid".to_string());
        labels
    }

    fn base_service() -> MCPService {
        MCPService {
            metadata: Meta {
                name: Some("echo".to_string()),
                namespace: Some("ws-demo".to_string()),
                labels: Some(identity_labels()),
                ..Default::default()
            },
            spec: MCPServiceSpec {
                deployment: DeploymentSpec {
                    protocol: Protocol::Http,
                    ..Default::default()
                },
                routing: RoutingSpec {
                    path: "echo".to_string(),
                    port: 8080,
                    ..Default::default()
                },
                ..Default::default()
            },
            status: None,
        }
    }

    #[test]
    fn test_build_configmap_none_when_no_env() {
        assert!(build_configmap(&base_service()).unwrap().is_none());
    }

    #[test]
    fn test_build_configmap_present_when_env_declared() {
        let mut service = base_service();
        service.spec.environment.insert("LOG_LEVEL".to_string(), "info".to_string());
        let configmap = build_configmap(&service).unwrap().unwrap();
        assert_eq!(configmap.data.unwrap().get("LOG_LEVEL").unwrap(), "info");
    }
}
