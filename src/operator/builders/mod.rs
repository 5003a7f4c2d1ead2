mod configmap;
mod ingress;
mod service;
mod workload;

pub use configmap::*;
pub use ingress::*;
pub use service::*;
pub use workload::*;

/// Configuration resolved outside the `MCPService` spec that builders need
/// to produce a complete child object (§4.2): the platform domain for
/// ingress hosts and the cluster architecture for package selection.
#[derive(Debug, Clone)]
pub struct BuilderContext {
    pub platform_domain: String,
    pub cluster_arch: String,
}
