use crate::registry::select_package_for_arch;
use crate::{Error, MCPServiceSpec};

/// Kubernetes-style pull policy string, matching `v1::Container::image_pull_policy`.
pub const PULL_POLICY_ALWAYS: &str = "Always";
pub const PULL_POLICY_IF_NOT_PRESENT: &str = "IfNotPresent";

/// Result of §4.1 steps 2-3: the resolved image reference, its pull policy,
/// and any bundle-download env vars to inject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub image: String,
    pub pull_policy: &'static str,
    pub env: Vec<(String, String)>,
}

/// Compute the container image reference, pull policy, and bundle env vars
/// for a service spec (§4.1 steps 2-3). Pure: no I/O, no cluster access.
pub fn resolve_image(spec: &MCPServiceSpec, cluster_arch: &str) -> Result<ResolvedImage, Error> {
    if !spec.packages.is_empty() {
        if let Some(runtime) = &spec.runtime {
            return Ok(resolve_runtime_image(spec, runtime, cluster_arch));
        }
    }

    let package = select_package_for_arch(&spec.packages, cluster_arch)
        .ok_or_else(|| Error::not_found("no package matches the cluster architecture"))?;

    let image = match &package.version {
        Some(version) => format!("{}:{version}", package.identifier),
        None => format!("{}:latest", package.identifier),
    };
    let pull_policy = compute_pull_policy(&image);
    Ok(ResolvedImage {
        image,
        pull_policy,
        env: Vec::new(),
    })
}

fn resolve_runtime_image(spec: &MCPServiceSpec, runtime: &str, cluster_arch: &str) -> ResolvedImage {
    let (name, version) = match runtime.split_once(':') {
        Some((name, version)) => (name, version.to_string()),
        None => (runtime, "latest".to_string()),
    };
    let image = format!("mcpb-{name}:{version}");
    let pull_policy = compute_pull_policy(&image);

    let mut env = Vec::new();
    if let Some(package) = select_package_for_arch(&spec.packages, cluster_arch) {
        env.push(("BUNDLE_URL".to_string(), package.identifier.clone()));
        match &package.sha256 {
            Some(sha256) => env.push(("BUNDLE_SHA256".to_string(), sha256.clone())),
            None => tracing::warn!(
                server = %spec.routing.path,
                "mcpb package has no sha256, BUNDLE_SHA256 omitted; bundle verification will be skipped downstream"
            ),
        }
    }

    ResolvedImage {
        image,
        pull_policy,
        env,
    }
}

/// Classify an image reference's tag as mutable (§4.1 step 3 / §8 item 3).
pub fn compute_pull_policy(image_ref: &str) -> &'static str {
    let tag = match image_ref.rsplit_once(':') {
        Some((_, tag)) => tag,
        None => "",
    };
    if tag.is_empty() || matches!(tag, "latest" | "edge" | "dev") || is_mutable_tag_pattern(tag) {
        PULL_POLICY_ALWAYS
    } else {
        PULL_POLICY_IF_NOT_PRESENT
    }
}

/// `^[a-z]+(-dev)?$`: lowercase-letters only, with an optional `-dev` suffix.
fn is_mutable_tag_pattern(tag: &str) -> bool {
    let body = tag.strip_suffix("-dev").unwrap_or(tag);
    !body.is_empty() && body.chars().all(|c| c.is_ascii_lowercase())
}
