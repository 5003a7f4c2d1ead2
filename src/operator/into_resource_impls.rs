use k8s_openapi::api::core::v1::{ConfigMap, Service};
use kube::ResourceExt;

use super::builders::{build_configmap, build_service};
use super::{IntoResource, MCPService};
use crate::Error;

/// The two child kinds whose desired state depends on nothing but the
/// `MCPService` itself implement [`IntoResource`] directly. `Deployment`
/// (needs the resolved image and workspace secret keys) and `Ingress`
/// (needs the platform domain, and produces two objects per service) don't
/// fit the single-object, context-free shape of this trait — reconcile.rs
/// builds and applies those directly via the same `Patch::Apply` idiom.
impl IntoResource<Service> for MCPService {
    fn resource(&self) -> Result<Service, Error> {
        build_service(self)
    }

    fn resource_name(&self) -> String {
        super::builders::child_name(self)
    }
}

impl IntoResource<ConfigMap> for MCPService {
    fn resource(&self) -> Result<ConfigMap, Error> {
        build_configmap(self)?.ok_or_else(|| {
            Error::not_found(format!(
                "MCPService '{}' declares no environment to externalize",
                self.name_any()
            ))
        })
    }

    fn resource_name(&self) -> String {
        format!("{}-config", super::builders::child_name(self))
    }
}
