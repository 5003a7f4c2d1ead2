use clap::Parser;
use k8s_openapi::api::core::v1::Node;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, ListParams};
use kube::{Client, CustomResourceExt};

use crate::utils::{get_kube_client, Kubeconfig};
use crate::{Error, Result};

use super::{BuilderContext, MCPService};

/// Configuration for the Kubernetes operator (§5, §6).
#[derive(Debug, Clone, Parser)]
pub struct ControllerOptions {
    /// Namespace the leader-election lease lives in. The reconciler itself
    /// watches `MCPService` cluster-wide, across workspace namespaces.
    #[arg(long, env = "NIMBLETOOLS_LEASE_NAMESPACE", default_value = "nimbletools-system")]
    pub lease_namespace: String,

    /// Path to a kubeconfig file; empty (the default) uses in-cluster config.
    #[arg(short, long, env = "KUBECONFIG", default_value = "")]
    pub kubeconfig: Kubeconfig,

    /// Base domain used to build per-workspace ingress hostnames (§4.2).
    #[arg(long, env = "NIMBLETOOLS_PLATFORM_DOMAIN")]
    pub platform_domain: String,

    /// Target cluster architecture for package selection (§4.1 step 2,
    /// §4.4). Auto-detected from node info when not supplied.
    #[arg(long, env = "NIMBLETOOLS_CLUSTER_ARCH")]
    pub cluster_arch: Option<String>,
}

#[derive(Clone)]
pub struct Controller {
    client: Client,
    lease_namespace: String,
    platform_domain: String,
    cluster_arch: String,
}

impl Controller {
    pub async fn new(options: &ControllerOptions) -> Result<Self> {
        let client = get_kube_client(options.kubeconfig.clone()).await?;
        let cluster_arch = match &options.cluster_arch {
            Some(arch) => arch.clone(),
            None => detect_cluster_arch(&client).await?,
        };
        tracing::info!(
            lease_namespace = %options.lease_namespace,
            platform_domain = %options.platform_domain,
            cluster_arch = %cluster_arch,
            "operator controller configured",
        );
        Ok(Self {
            client,
            lease_namespace: options.lease_namespace.clone(),
            platform_domain: options.platform_domain.clone(),
            cluster_arch,
        })
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn lease_namespace(&self) -> &str {
        &self.lease_namespace
    }

    pub fn builder_context(&self) -> BuilderContext {
        BuilderContext {
            platform_domain: self.platform_domain.clone(),
            cluster_arch: self.cluster_arch.clone(),
        }
    }

    pub fn cluster_arch(&self) -> &str {
        &self.cluster_arch
    }

    pub fn platform_domain(&self) -> &str {
        &self.platform_domain
    }

    /// Refuses to start watching until the `MCPService` CRD is registered
    /// (§10 supplemented startup readiness gate).
    pub async fn assert_crd_exists(&self) -> Result<()> {
        let crds: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let name = MCPService::crd_name();
        match crds.get(name).await {
            Ok(_) => {
                tracing::info!(crd = %name, "MCPService CRD is registered");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(crd = %name, error = %error, "MCPService CRD not found in cluster");
                Err(Error::from(error).with_name("E_CRD_NOT_REGISTERED"))
            }
        }
    }
}

/// Read the architecture of the first listed node as a stand-in for the
/// cluster's package architecture (§4.1 tie-break: "injected at startup
/// from node info"). Kubernetes node labels carry
/// `kubernetes.io/arch=amd64|arm64`.
async fn detect_cluster_arch(client: &Client) -> Result<String> {
    let nodes: Api<Node> = Api::all(client.clone());
    let list = nodes
        .list(&ListParams::default().limit(1))
        .await
        .map_err(Error::from)?;
    let arch = list
        .items
        .first()
        .and_then(|node| node.metadata.labels.as_ref())
        .and_then(|labels| labels.get("kubernetes.io/arch"))
        .cloned()
        .ok_or_else(|| {
            Error::generic("could not detect cluster architecture from node labels")
                .with_name("E_ARCH_DETECTION_FAILED")
        })?;
    Ok(arch)
}
