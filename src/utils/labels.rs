use std::collections::BTreeMap;

/// Label namespace applied to every resource this project owns (§3.2).
pub const LABEL_PREFIX: &str = "mcp.nimbletools.dev";

pub const LABEL_WORKSPACE_ID: &str = "mcp.nimbletools.dev/workspace_id";
pub const LABEL_WORKSPACE_NAME: &str = "mcp.nimbletools.dev/workspace_name";
pub const LABEL_USER_ID: &str = "mcp.nimbletools.dev/user_id";
pub const LABEL_ORGANIZATION_ID: &str = "mcp.nimbletools.dev/organization_id";
pub const LABEL_WORKSPACE_MARKER: &str = "mcp.nimbletools.dev/workspace";
pub const LABEL_SERVICE_MARKER: &str = "mcp.nimbletools.dev/service";
pub const LABEL_SERVER: &str = "mcp.nimbletools.dev/server";

/// Identifiers every tenancy-scoped resource must carry (§3.2). A resource
/// missing any of these is invalid: listing must skip it with a warning,
/// detail lookups must fail with an internal error. No fallback parsing of
/// the namespace name or zero-UUID sentinels is permitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenancyIdentity {
    pub workspace_id: String,
    pub workspace_name: String,
    pub user_id: String,
    pub organization_id: String,
}

/// Labels applied to the workspace `Namespace` itself.
pub fn workspace_labels(identity: &TenancyIdentity) -> BTreeMap<String, String> {
    let mut labels = identity_labels(identity);
    labels.insert(LABEL_WORKSPACE_MARKER.to_string(), "true".to_string());
    labels
}

/// Labels applied to an `MCPService` and every resource it owns.
pub fn service_labels(identity: &TenancyIdentity, server_name: &str) -> BTreeMap<String, String> {
    let mut labels = identity_labels(identity);
    labels.insert(LABEL_SERVICE_MARKER.to_string(), "true".to_string());
    labels.insert(LABEL_SERVER.to_string(), server_name.to_string());
    labels
}

fn identity_labels(identity: &TenancyIdentity) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(LABEL_WORKSPACE_ID.to_string(), identity.workspace_id.clone());
    labels.insert(LABEL_WORKSPACE_NAME.to_string(), identity.workspace_name.clone());
    labels.insert(LABEL_USER_ID.to_string(), identity.user_id.clone());
    labels.insert(LABEL_ORGANIZATION_ID.to_string(), identity.organization_id.clone());
    labels
}

/// Extract the four required tenancy identifiers from a label map (§3.2).
/// Returns `None` if any are missing — callers must treat that as invalid,
/// never substitute a default.
pub fn read_tenancy_identity(labels: &BTreeMap<String, String>) -> Option<TenancyIdentity> {
    Some(TenancyIdentity {
        workspace_id: labels.get(LABEL_WORKSPACE_ID)?.clone(),
        workspace_name: labels.get(LABEL_WORKSPACE_NAME)?.clone(),
        user_id: labels.get(LABEL_USER_ID)?.clone(),
        organization_id: labels.get(LABEL_ORGANIZATION_ID)?.clone(),
    })
}

/// Label selector scoped to one organization, used when listing workspaces.
pub fn organization_label_selector(organization_id: &str) -> String {
    format!("{LABEL_ORGANIZATION_ID}={organization_id}")
}

/// Label selector scoped to one server within a workspace.
pub fn server_label_selector(server_name: &str) -> String {
    format!("{LABEL_SERVICE_MARKER}=true,{LABEL_SERVER}={server_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> TenancyIdentity {
        TenancyIdentity {
            workspace_id: "11111111-1111-1111-1111-111111111111".to_string(),
            workspace_name: "demo-1111".to_string(),
            user_id: "22222222-2222-2222-2222-222222222222".to_string(),
            organization_id: "33333333-3333-3333-3333-333333333333".to_string(),
        }
    }

    #[test]
    fn test_workspace_labels_include_marker() {
        let labels = workspace_labels(&identity());
        assert_eq!(labels.get(LABEL_WORKSPACE_MARKER).unwrap(), "true");
        assert_eq!(labels.get(LABEL_WORKSPACE_ID).unwrap(), &identity().workspace_id);
    }

    #[test]
    fn test_service_labels_include_server_name() {
        let labels = service_labels(&identity(), "echo");
        assert_eq!(labels.get(LABEL_SERVER).unwrap(), "echo");
        assert_eq!(labels.get(LABEL_SERVICE_MARKER).unwrap(), "true");
    }

    #[test]
    fn test_read_tenancy_identity_roundtrip() {
        let labels = workspace_labels(&identity());
        let parsed = read_tenancy_identity(&labels).unwrap();
        assert_eq!(parsed, identity());
    }

    #[test]
    fn test_read_tenancy_identity_missing_label_is_none() {
        let mut labels = workspace_labels(&identity());
        labels.remove(LABEL_ORGANIZATION_ID);
        assert!(read_tenancy_identity(&labels).is_none());
    }
}
