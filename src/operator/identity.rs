use kube::ResourceExt;

use crate::utils::{read_tenancy_identity, service_labels, TenancyIdentity};

use super::MCPService;

impl MCPService {
    /// Server name within its workspace, per §3.1 ("server_name").
    pub fn server_name(&self) -> String {
        self.name_any()
    }

    /// Extract the tenancy identity from this object's own labels (§3.2).
    /// Returns `None` when any required label is missing — callers must
    /// treat that as invalid, never synthesize a default identity.
    pub fn tenancy_identity(&self) -> Option<TenancyIdentity> {
        read_tenancy_identity(self.meta().labels.as_ref()?)
    }

    /// Labels every owned child resource must carry, derived from this
    /// object's own tenancy identity.
    pub fn child_labels(&self) -> Option<std::collections::BTreeMap<String, String>> {
        Some(service_labels(&self.tenancy_identity()?, &self.server_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{DeploymentSpec, MCPServiceSpec, Protocol, RoutingSpec};
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;

    fn labeled_service() -> MCPService {
        let mut labels = BTreeMap::new();
        labels.insert("mcp.nimbletools.dev/workspace_id".to_string(), "wsid".to_string());
        labels.insert("mcp.nimbletools.dev/workspace_name".to_string(), "demo".to_string());
        labels.insert("mcp.nimbletools.dev/user_id".to_string(), "uid".to_string());
        labels.insert("mcp.nimbletools.dev/organization_id".to_string(), "oid".to_string());

        MCPService {
            metadata: ObjectMeta {
                name: Some("echo".to_string()),
                namespace: Some("ws-demo".to_string()),
                labels: Some(labels),
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
    fn test_tenancy_identity_present() {
        let service = labeled_service();
        let identity = service.tenancy_identity().unwrap();
        assert_eq!(identity.workspace_id, "wsid");
    }

    #[test]
    fn test_tenancy_identity_missing_labels_is_none() {
        let mut service = labeled_service();
        service.metadata.labels = None;
        assert!(service.tenancy_identity().is_none());
    }

    #[test]
    fn test_child_labels_include_server_name() {
        let service = labeled_service();
        let labels = service.child_labels().unwrap();
        assert_eq!(labels.get("mcp.nimbletools.dev/server").unwrap(), "echo");
    }
}
