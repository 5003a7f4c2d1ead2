use std::collections::{BTreeMap, HashSet};

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec as K8sDeploymentSpec};
use k8s_openapi::api::core::v1::{
    self, Capabilities, Container, ContainerPort, EnvVar, EnvVarSource, PodSpec, PodTemplateSpec,
    SecretKeySelector, SecurityContext,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::ObjectMeta;

use crate::operator::ResolvedImage;
use crate::operator::MCPService;
use crate::Error;

use super::BuilderContext;

pub const WORKSPACE_SECRET_NAME: &str = "workspace-secrets";
const CONTAINER_NAME: &str = "mcp-server";

/// Name shared by the Deployment, its Service, and (together with the
/// routing path) its Ingress rules.
pub fn child_name(service: &MCPService) -> String {
    format!("mcp-{}", service.server_name())
}

/// Build the desired `Deployment` for an `MCPService` (§4.2). Pure: takes
/// the already-resolved image/pull-policy (§4.1 step 2-3) and the set of
/// keys present in the workspace secret, so no cluster access happens here.
pub fn build_deployment(
    service: &MCPService,
    resolved: &ResolvedImage,
    secret_keys: &HashSet<String>,
    ctx: &BuilderContext,
) -> Result<Deployment, Error> {
    let labels = service
        .child_labels()
        .ok_or_else(|| Error::validation("MCPService is missing required tenancy labels"))?;

    let mut selector_labels = BTreeMap::new();
    selector_labels.insert("app".to_string(), service.server_name());

    let mut pod_labels = labels.clone();
    pod_labels.extend(selector_labels.clone());

    let env = build_env(service, resolved, secret_keys)?;

    let mut ports = Vec::new();
    if service.spec.deployment.protocol == crate::operator::Protocol::Http {
        ports.push(ContainerPort {
            container_port: i32::from(service.spec.container.port.max(service.spec.routing.port)),
            name: Some("http".to_string()),
            protocol: Some("TCP".to_string()),
            ..Default::default()
        });
    }

    let container = Container {
        name: CONTAINER_NAME.to_string(),
        image: Some(resolved.image.clone()),
        image_pull_policy: Some(resolved.pull_policy.to_string()),
        env: Some(env),
        ports: if ports.is_empty() { None } else { Some(ports) },
        resources: Some(service.spec.resources.clone()),
        security_context: Some(hardened_security_context()),
        readiness_probe: service.spec.deployment.health_path.as_ref().map(|path| {
            http_probe(path, service.spec.container.port.max(service.spec.routing.port))
        }),
        liveness_probe: Some(http_probe(
            &service.spec.routing.health_path,
            service.spec.container.port.max(service.spec.routing.port),
        )),
        ..Default::default()
    };

    let ctx_arch = ctx.cluster_arch.clone();
    tracing::debug!(server = %service.server_name(), arch = %ctx_arch, "built deployment container spec");

    Ok(Deployment {
        metadata: ObjectMeta {
            name: Some(child_name(service)),
            namespace: service.metadata.namespace.clone(),
            labels: Some(labels),
            ..Default::default()
        },
        spec: Some(K8sDeploymentSpec {
            replicas: Some(service.spec.replicas),
            selector: LabelSelector {
                match_labels: Some(selector_labels),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(pod_labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    security_context: Some(v1::PodSecurityContext {
                        run_as_non_root: Some(true),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    })
}

fn hardened_security_context() -> SecurityContext {
    SecurityContext {
        run_as_non_root: Some(true),
        read_only_root_filesystem: Some(true),
        allow_privilege_escalation: Some(false),
        capabilities: Some(Capabilities {
            drop: Some(vec!["ALL".to_string()]),
            add: None,
        }),
        ..Default::default()
    }
}

fn http_probe(path: &str, port: u16) -> v1::Probe {
    v1::Probe {
        http_get: Some(v1::HTTPGetAction {
            path: Some(path.to_string()),
            port: k8s_openapi::apimachinery::pkg::util::intstr::IntOrString::Int(i32::from(port)),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Stable env-var ordering (§4.2): literal `environment` entries first
/// (alphabetized, which `BTreeMap` iteration already guarantees), then
/// declared `environmentVariables` in input order, then synthetic bundle
/// download vars from the resolved image.
fn build_env(
    service: &MCPService,
    resolved: &ResolvedImage,
    secret_keys: &HashSet<String>,
) -> Result<Vec<EnvVar>, Error> {
    let mut env = Vec::new();

    for (name, value) in &service.spec.environment {
        if secret_keys.contains(name) {
            env.push(secret_env_var(name));
        } else {
            env.push(EnvVar {
                name: name.clone(),
                value: Some(value.clone()),
                ..Default::default()
            });
        }
    }

    for declared in &service.spec.environment_variables {
        if declared.is_secret || secret_keys.contains(&declared.name) {
            env.push(secret_env_var(&declared.name));
        } else if let Some(default) = &declared.default {
            env.push(EnvVar {
                name: declared.name.clone(),
                value: Some(default.clone()),
                ..Default::default()
            });
        } else if declared.is_required {
            return Err(Error::validation(format!(
                "required environment variable '{}' has no literal default and no matching workspace secret",
                declared.name
            )));
        }
    }

    for (name, value) in &resolved.env {
        env.push(EnvVar {
            name: name.clone(),
            value: Some(value.clone()),
            ..Default::default()
        });
    }

    Ok(env)
}

fn secret_env_var(name: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: WORKSPACE_SECRET_NAME.to_string(),
                key: name.to_string(),
                optional: Some(false),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{DeploymentSpec, EnvironmentVariableDeclaration, MCPServiceSpec, Protocol, RoutingSpec};
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

    fn service(spec: MCPServiceSpec) -> MCPService {
        MCPService {
            metadata: Meta {
                name: Some("echo".to_string()),
                namespace: Some("ws-demo".to_string()),
                labels: Some(identity_labels()),
                ..Default::default()
            },
            spec,
            status: None,
        }
    }

    fn base_spec() -> MCPServiceSpec {
        MCPServiceSpec {
            deployment: DeploymentSpec {
                protocol: Protocol::Http,
                health_path: Some("/ready".to_string()),
                ..Default::default()
            },
            routing: RoutingSpec {
                path: "echo".to_string(),
                port: 8080,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn ctx() -> BuilderContext {
        BuilderContext {
            platform_domain: "apps.example.com".to_string(),
            cluster_arch: "amd64".to_string(),
        }
    }

    fn resolved() -> ResolvedImage {
        ResolvedImage {
            image: "org/echo:1.0.0".to_string(),
            pull_policy: "IfNotPresent",
            env: Vec::new(),
        }
    }

    #[test]
    fn test_build_deployment_selector_matches_app_label() {
        let service = service(base_spec());
        let deployment = build_deployment(&service, &resolved(), &HashSet::new(), &ctx()).unwrap();
        let selector = deployment.spec.unwrap().selector.match_labels.unwrap();
        assert_eq!(selector.get("app").unwrap(), "echo");
    }

    #[test]
    fn test_build_deployment_hardens_security_context() {
        let service = service(base_spec());
        let deployment = build_deployment(&service, &resolved(), &HashSet::new(), &ctx()).unwrap();
        let pod_spec = deployment.spec.unwrap().template.spec.unwrap();
        let container = &pod_spec.containers[0];
        let security = container.security_context.as_ref().unwrap();
        assert_eq!(security.run_as_non_root, Some(true));
        assert_eq!(security.read_only_root_filesystem, Some(true));
        assert_eq!(security.allow_privilege_escalation, Some(false));
        assert_eq!(security.capabilities.as_ref().unwrap().drop, Some(vec!["ALL".to_string()]));
    }

    #[test]
    fn test_build_deployment_env_ordering_literals_then_declared() {
        let mut spec = base_spec();
        spec.environment.insert("ZETA".to_string(), "z".to_string());
        spec.environment.insert("ALPHA".to_string(), "a".to_string());
        spec.environment_variables.push(EnvironmentVariableDeclaration {
            name: "API_KEY".to_string(),
            is_secret: true,
            is_required: true,
            default: None,
        });
        let service = service(spec);
        let deployment = build_deployment(&service, &resolved(), &HashSet::new(), &ctx()).unwrap();
        let env = deployment.spec.unwrap().template.spec.unwrap().containers[0]
            .env
            .clone()
            .unwrap();
        let names: Vec<_> = env.iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["ALPHA", "ZETA", "API_KEY"]);
        assert!(env[2].value_from.is_some());
    }

    #[test]
    fn test_build_deployment_promotes_plain_key_to_secret_when_present() {
        let mut spec = base_spec();
        spec.environment.insert("DB_HOST".to_string(), "localhost".to_string());
        let mut secret_keys = HashSet::new();
        secret_keys.insert("DB_HOST".to_string());
        let service = service(spec);
        let deployment = build_deployment(&service, &resolved(), &secret_keys, &ctx()).unwrap();
        let env = deployment.spec.unwrap().template.spec.unwrap().containers[0]
            .env
            .clone()
            .unwrap();
        assert_eq!(env.len(), 1);
        assert!(env[0].value_from.is_some());
        assert!(env[0].value.is_none());
    }

    #[test]
    fn test_build_deployment_missing_required_declared_var_is_error() {
        let mut spec = base_spec();
        spec.environment_variables.push(EnvironmentVariableDeclaration {
            name: "MUST_HAVE".to_string(),
            is_secret: false,
            is_required: true,
            default: None,
        });
        let service = service(spec);
        let result = build_deployment(&service, &resolved(), &HashSet::new(), &ctx());
        assert!(result.is_err());
    }

    #[test]
    fn test_build_deployment_rejects_missing_tenancy_labels() {
        let mut service = service(base_spec());
        service.metadata.labels = None;
        let result = build_deployment(&service, &resolved(), &HashSet::new(), &ctx());
        assert!(result.is_err());
    }
}
