use std::fmt::Debug;
use std::future::Future;

use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams, ObjectMeta, Patch, PatchParams, PostParams};
use kube::core::object::{HasSpec, HasStatus};
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::utils::FIELD_MANAGER;
use crate::{Error, Result};

/// Generic CRUD over a namespaced Kubernetes resource with a status
/// subresource. Every method takes the namespace explicitly — this runtime
/// has no single "default namespace"; each `MCPService` lives in its own
/// workspace namespace.
pub trait ResourceManager
where
    Self: Resource<Scope = NamespaceResourceScope>
        + Send
        + Sync
        + Serialize
        + Clone
        + Debug
        + DeserializeOwned
        + HasSpec
        + HasStatus,
    <Self as Resource>::DynamicType: Default,
    <Self as HasSpec>::Spec: Send + Sync + Serialize + Debug,
    <Self as HasStatus>::Status: Send + Sync + Serialize + Default + Clone,
{
    fn new(namespace: &str, name: &str, spec: Self::Spec) -> Self;

    fn apply(&self, client: &Client) -> impl Future<Output = Result<Self>> + Send {
        async {
            let namespace = self.namespace().unwrap_or_default();
            let post_params = PostParams {
                field_manager: Some(FIELD_MANAGER.to_string()),
                ..Default::default()
            };
            Api::<Self>::namespaced(client.clone(), &namespace)
                .create(&post_params, self)
                .await
                .map_err(Error::from)
        }
    }

    #[tracing::instrument(name = "GetResource", skip(client))]
    fn get_by_name(
        client: &Client,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Self>> + Send {
        async move {
            Api::<Self>::namespaced(client.clone(), namespace)
                .get(name)
                .await
                .map_err(Error::from)
        }
    }

    fn get_status(&self, client: &Client) -> impl Future<Output = Result<Self::Status>> + Send {
        async {
            let namespace = self.namespace().unwrap_or_default();
            let status = Api::<Self>::namespaced(client.clone(), &namespace)
                .get_status(&self.name_any())
                .await
                .map_err(Error::from)?
                .status()
                .cloned()
                .unwrap_or_default();
            Ok(status)
        }
    }

    fn exists(
        client: &Client,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<bool>> + Send {
        async move {
            match Api::<Self>::namespaced(client.clone(), namespace)
                .get_metadata(name)
                .await
            {
                Ok(_) => Ok(true),
                Err(kube::Error::Api(e)) if e.code == 404 => Ok(false),
                Err(e) => Err(Error::from(e)),
            }
        }
    }

    fn search(
        client: &Client,
        namespace: &str,
        list_params: Option<ListParams>,
    ) -> impl Future<Output = Result<Vec<Self>>> + Send {
        async move {
            let params = list_params.unwrap_or_default();
            Api::<Self>::namespaced(client.clone(), namespace)
                .list(&params)
                .await
                .map_err(Error::from)
                .map(|list| list.items)
        }
    }

    fn patch(
        &self,
        client: &Client,
        spec: Self::Spec,
    ) -> impl Future<Output = Result<Self>> + Send {
        async move {
            let namespace = self.namespace().unwrap_or_default();
            let patch = serde_json::json!({
                "apiVersion": format!("{}/{}", Self::group(&Default::default()), Self::version(&Default::default())),
                "kind": Self::kind(&Default::default()).to_string(),
                "spec": spec
            });
            Api::<Self>::namespaced(client.clone(), &namespace)
                .patch(
                    &self.name_any(),
                    &PatchParams::apply(FIELD_MANAGER),
                    &Patch::Apply(patch),
                )
                .await
                .map_err(Error::from)
        }
    }

    fn patch_status(
        &self,
        client: &Client,
        status: Self::Status,
    ) -> impl Future<Output = Result<Self>> + Send {
        async move {
            let namespace = self.namespace().unwrap_or_default();
            Api::<Self>::namespaced(client.clone(), &namespace)
                .patch_status(
                    &self.name_any(),
                    &PatchParams::apply(FIELD_MANAGER),
                    &Patch::Merge(&serde_json::json!({ "status": status })),
                )
                .await
                .map_err(Error::from)
        }
    }

    fn refresh(&self, client: &Client) -> impl Future<Output = Result<Self>> + Send {
        async {
            let namespace = self.namespace().unwrap_or_default();
            Api::<Self>::namespaced(client.clone(), &namespace)
                .get(&self.name_any())
                .await
                .map_err(Error::from)
        }
    }

    fn delete(&self, client: &Client) -> impl Future<Output = Result<()>> + Send {
        async {
            let namespace = self.namespace().unwrap_or_default();
            match Api::<Self>::namespaced(client.clone(), &namespace)
                .delete(&self.name_any(), &Default::default())
                .await
            {
                Ok(..) => Ok(()),
                Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
                Err(error) => Err(Error::from(error)),
            }
        }
    }
}

impl ResourceManager for super::MCPService {
    fn new(namespace: &str, name: &str, spec: Self::Spec) -> Self {
        Self {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            spec,
            status: Default::default(),
        }
    }
}
