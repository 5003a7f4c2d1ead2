use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use kube::api::ObjectMeta;

use crate::operator::MCPService;
use crate::Error;

use super::workload::child_name;

/// Build the desired `Service` fronting an `MCPService`'s Deployment (§4.2).
pub fn build_service(service: &MCPService) -> Result<Service, Error> {
    let labels = service
        .child_labels()
        .ok_or_else(|| Error::validation("MCPService is missing required tenancy labels"))?;

    let mut selector = BTreeMap::new();
    selector.insert("app".to_string(), service.server_name());

    Ok(Service {
        metadata: ObjectMeta {
            name: Some(child_name(service)),
            namespace: service.metadata.namespace.clone(),
            labels: Some(labels),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            selector: Some(selector),
            ports: Some(vec![ServicePort {
                name: Some("http".to_string()),
                port: i32::from(service.spec.routing.port),
                target_port: Some(k8s_openapi::apimachinery::pkg::util::intstr::IntOrString::Int(
                    i32::from(service.spec.container.port.max(service.spec.routing.port)),
                )),
                protocol: Some("TCP".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status: None,
    })
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

    #[test]
    fn test_build_service_selector_matches_app_label() {
        let built = build_service(&service()).unwrap();
        let selector = built.spec.unwrap().selector.unwrap();
        assert_eq!(selector.get("app").unwrap(), "echo");
    }

    #[test]
    fn test_build_service_port_matches_routing_port() {
        let built = build_service(&service()).unwrap();
        let port = &built.spec.unwrap().ports.unwrap()[0];
        assert_eq!(port.port, 8080);
    }
}
