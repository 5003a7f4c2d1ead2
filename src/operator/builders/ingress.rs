use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule, IngressServiceBackend,
    IngressSpec, ServiceBackendPort,
};
use kube::api::ObjectMeta;

use crate::operator::MCPService;
use crate::Error;

use super::{workload::child_name, BuilderContext};

const REWRITE_ANNOTATION: &str = "nginx.ingress.kubernetes.io/rewrite-target";
const LABEL_INGRESS_TYPE: &str = "mcp.nimbletools.dev/ingress-type";

/// Build the two ingress rules for an `MCPService` (§4.2): one routing
/// `/{workspace_id}/{server}/mcp` to the MCP path, one routing
/// `/{workspace_id}/{server}/health` to the health path. Each rule is its
/// own `Ingress` object so each can carry its own rewrite-target annotation.
pub fn build_ingresses(service: &MCPService, ctx: &BuilderContext) -> Result<Vec<Ingress>, Error> {
    let identity = service
        .tenancy_identity()
        .ok_or_else(|| Error::validation("MCPService is missing required tenancy labels"))?;
    let labels = service
        .child_labels()
        .ok_or_else(|| Error::validation("MCPService is missing required tenancy labels"))?;

    let base = format!("/{}/{}", identity.workspace_id, service.server_name());

    let mcp = build_rule(
        service,
        ctx,
        &labels,
        "mcp",
        &format!("{base}/mcp"),
        &service.spec.routing.mcp_path,
    );
    let health = build_rule(
        service,
        ctx,
        &labels,
        "health",
        &format!("{base}/health"),
        &service.spec.routing.health_path,
    );

    Ok(vec![mcp, health])
}

fn build_rule(
    service: &MCPService,
    ctx: &BuilderContext,
    labels: &std::collections::BTreeMap<String, String>,
    ingress_type: &str,
    path: &str,
    rewrite_target: &str,
) -> Ingress {
    let mut labels = labels.clone();
    labels.insert(LABEL_INGRESS_TYPE.to_string(), ingress_type.to_string());

    let mut annotations = std::collections::BTreeMap::new();
    annotations.insert(REWRITE_ANNOTATION.to_string(), rewrite_target.to_string());

    Ingress {
        metadata: ObjectMeta {
            name: Some(format!("{}-{ingress_type}", child_name(service))),
            namespace: service.metadata.namespace.clone(),
            labels: Some(labels),
            annotations: Some(annotations),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            rules: Some(vec![IngressRule {
                host: Some(format!("{}.{}", service.server_name(), ctx.platform_domain)),
                http: Some(HTTPIngressRuleValue {
                    paths: vec![HTTPIngressPath {
                        path: Some(path.to_string()),
                        path_type: "Prefix".to_string(),
                        backend: IngressBackend {
                            service: Some(IngressServiceBackend {
                                name: child_name(service),
                                port: Some(ServiceBackendPort {
                                    number: Some(i32::from(service.spec.routing.port)),
                                    ..Default::default()
                                }),
                            }),
                            ..Default::default()
                        },
                    }],
                }),
            }]),
            ..Default::default()
        }),
        status: None,
    }
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

    fn service() -> MCPService {
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

    fn ctx() -> BuilderContext {
        BuilderContext {
            platform_domain: "apps.example.com".to_string(),
            cluster_arch: "amd64".to_string(),
        }
    }

    #[test]
    fn test_build_ingresses_returns_two_rules() {
        let ingresses = build_ingresses(&service(), &ctx()).unwrap();
        assert_eq!(ingresses.len(), 2);
    }

    #[test]
    fn test_build_ingresses_paths_include_workspace_and_server() {
        let ingresses = build_ingresses(&service(), &ctx()).unwrap();
        let mcp_path = ingresses[0].spec.as_ref().unwrap().rules.as_ref().unwrap()[0]
            .http
            .as_ref()
            .unwrap()
            .paths[0]
            .path
            .clone()
            .unwrap();
        assert_eq!(mcp_path, "/wsid/echo/mcp");
    }

    #[test]
    fn test_build_ingresses_rewrite_targets_differ() {
        let ingresses = build_ingresses(&service(), &ctx()).unwrap();
        let mcp_rewrite = ingresses[0].metadata.annotations.as_ref().unwrap().get(REWRITE_ANNOTATION).unwrap();
        let health_rewrite = ingresses[1].metadata.annotations.as_ref().unwrap().get(REWRITE_ANNOTATION).unwrap();
        assert_eq!(mcp_rewrite, "/mcp");
        assert_eq!(health_rewrite, "/health");
        assert_ne!(mcp_rewrite, health_rewrite);
    }
}
