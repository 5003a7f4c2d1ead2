use std::fmt::Debug;
use std::future::Future;

use k8s_openapi::NamespaceResourceScope;
use kube::api::{Patch, PatchParams};
use kube::core::object::{HasSpec, HasStatus};
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::utils::FIELD_MANAGER;
use crate::{Error, Result};

/// CRUD for one child Kubernetes kind `U` owned by `Self` (§3.3, §4.1 step
/// 5). Unlike a single-namespace operator, every call is scoped to `self`'s
/// own namespace (the owning `MCPService`'s workspace), never a client-wide
/// default namespace.
pub trait IntoResource<U>
where
    U: Resource<Scope = NamespaceResourceScope>
        + Debug
        + Clone
        + Send
        + Sync
        + Serialize
        + DeserializeOwned,
    <U as Resource>::DynamicType: Default,
    Self: Send + Sync + Resource + Sized + HasSpec + HasStatus,
{
    /// Build the desired state of the child resource.
    fn resource(&self) -> Result<U>;

    /// Name of the child resource in the Kubernetes cluster.
    fn resource_name(&self) -> String;

    fn patch_resource(&self, client: &Client) -> impl Future<Output = Result<U>> + Send {
        async {
            let namespace = self.namespace().unwrap_or_default();
            let desired = self.resource()?;
            Api::<U>::namespaced(client.clone(), &namespace)
                .patch(
                    &self.resource_name(),
                    &PatchParams::apply(FIELD_MANAGER),
                    &Patch::Apply(desired),
                )
                .await
                .map_err(Error::from)
        }
    }

    fn delete_resource(&self, client: &Client) -> impl Future<Output = Result<()>> + Send {
        async {
            let namespace = self.namespace().unwrap_or_default();
            match Api::<U>::namespaced(client.clone(), &namespace)
                .delete(&self.resource_name(), &Default::default())
                .await
            {
                Ok(..) => Ok(()),
                Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
                Err(error) => Err(Error::from(error)),
            }
        }
    }

    fn get_resource(&self, client: &Client) -> impl Future<Output = Result<U>> + Send {
        async {
            let namespace = self.namespace().unwrap_or_default();
            Api::<U>::namespaced(client.clone(), &namespace)
                .get(&self.resource_name())
                .await
                .map_err(Error::from)
        }
    }

    fn resource_exists(&self, client: &Client) -> impl Future<Output = Result<bool>> + Send {
        async {
            let namespace = self.namespace().unwrap_or_default();
            match Api::<U>::namespaced(client.clone(), &namespace)
                .get(&self.resource_name())
                .await
            {
                Ok(_) => Ok(true),
                Err(kube::Error::Api(e)) if e.code == 404 => Ok(false),
                Err(e) => Err(Error::from(e)),
            }
        }
    }
}
