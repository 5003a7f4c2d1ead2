use std::collections::BTreeMap;

use aide::axum::routing::{get_with, post_with};
use aide::axum::{ApiRouter, IntoApiResponse};
use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json as ResponseJson;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::{Api as KubeApi, ListParams, ObjectMeta, PostParams};
use kube::{Client, ResourceExt};
use uuid::Uuid;

use crate::utils::{
    read_tenancy_identity, workspace_labels, LABEL_ORGANIZATION_ID, LABEL_WORKSPACE_ID,
};
use crate::{Error, ErrorKind, Result};

use super::{servers, workspaces_docs, ApiContext, AuthenticatedUser, CreateWorkspaceBody, WorkspaceBody, WorkspaceList};

const DESCRIPTION_ANNOTATION: &str = "mcp.nimbletools.dev/description";

/// Build the workspace's tenant namespace, not yet created (§3.1). Pure: no I/O.
fn build_namespace(identity: &crate::utils::TenancyIdentity, description: Option<&str>) -> Namespace {
    let mut annotations = BTreeMap::new();
    if let Some(description) = description {
        annotations.insert(DESCRIPTION_ANNOTATION.to_string(), description.to_string());
    }
    Namespace {
        metadata: ObjectMeta {
            name: Some(namespace_name(&identity.workspace_name)),
            labels: Some(workspace_labels(identity)),
            annotations: if annotations.is_empty() { None } else { Some(annotations) },
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn namespace_name(workspace_name: &str) -> String {
    format!("ws-{workspace_name}")
}

/// DNS-label-safe prefix derived from the requested workspace name.
fn sanitize_label(name: &str) -> String {
    let sanitized: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let trimmed = sanitized.trim_matches('-');
    let truncated: String = trimmed.chars().take(20).collect();
    if truncated.is_empty() {
        "ws".to_string()
    } else {
        truncated
    }
}

/// Look up the tenant namespace for `workspace_id`, scoped to `organization_id`
/// (§3.2): listing and detail lookups never trust a caller-supplied
/// organization, only the label actually present on the object.
pub async fn resolve(client: &Client, organization_id: &str, workspace_id: &str) -> Result<Namespace> {
    let selector = format!("{LABEL_WORKSPACE_ID}={workspace_id},{LABEL_ORGANIZATION_ID}={organization_id}");
    let namespaces: KubeApi<Namespace> = KubeApi::all(client.clone());
    let list = namespaces
        .list(&ListParams::default().labels(&selector))
        .await
        .map_err(Error::from)?;
    let namespace = list.items.into_iter().next().ok_or_else(|| {
        Error::not_found(format!("workspace '{workspace_id}' was not found"))
    })?;
    if read_tenancy_identity(namespace.labels()).is_none() {
        return Err(Error::generic(format!(
            "workspace namespace '{}' is missing required tenancy labels",
            namespace.name_any()
        ))
        .with_name("E_INVALID_WORKSPACE_LABELS")
        .with_kind(ErrorKind::Permanent)
        .with_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR));
    }
    Ok(namespace)
}

pub async fn create(
    State(ctx): State<ApiContext>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<CreateWorkspaceBody>,
) -> impl IntoApiResponse {
    async {
        let workspace_id = Uuid::new_v4().to_string();
        let identity = crate::utils::TenancyIdentity {
            workspace_name: format!("{}-{workspace_id}", sanitize_label(&body.name)),
            workspace_id,
            user_id: user.user_id.to_string(),
            organization_id: user.organization_id.to_string(),
        };
        let namespace = build_namespace(&identity, body.description.as_deref());
        let namespaces: KubeApi<Namespace> = KubeApi::all(ctx.client());
        let post_params = PostParams {
            field_manager: Some(crate::utils::FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        let created = namespaces.create(&post_params, &namespace).await.map_err(Error::from)?;
        Ok::<_, Error>(WorkspaceBody::from_namespace(&created, &identity, &body.name))
    }
    .await
    .into_response()
}

pub async fn search(State(ctx): State<ApiContext>, AuthenticatedUser(user): AuthenticatedUser) -> impl IntoApiResponse {
    let selector = crate::utils::organization_label_selector(&user.organization_id.to_string());
    let namespaces: KubeApi<Namespace> = KubeApi::all(ctx.client());
    let list = match namespaces.list(&ListParams::default().labels(&selector)).await {
        Ok(list) => list,
        Err(error) => return Error::from(error).into_response(),
    };

    let bodies = list
        .items
        .into_iter()
        .filter_map(|namespace| {
            let Some(identity) = read_tenancy_identity(namespace.labels()) else {
                tracing::warn!(namespace = %namespace.name_any(), "workspace namespace missing required tenancy labels; skipping");
                return None;
            };
            let name = identity.workspace_name.rsplit_once(&format!("-{}", identity.workspace_id))
                .map(|(base, _)| base.to_string())
                .unwrap_or_else(|| identity.workspace_name.clone());
            Some(WorkspaceBody::from_namespace(&namespace, &identity, &name))
        })
        .collect();
    ResponseJson(WorkspaceList(bodies)).into_response()
}

pub async fn get(State(ctx): State<ApiContext>, AuthenticatedUser(user): AuthenticatedUser, Path(id): Path<String>) -> impl IntoApiResponse {
    async {
        let namespace = resolve(&ctx.client(), &user.organization_id.to_string(), &id).await?;
        let identity = read_tenancy_identity(namespace.labels()).expect("validated by resolve");
        let name = identity
            .workspace_name
            .rsplit_once(&format!("-{}", identity.workspace_id))
            .map(|(base, _)| base.to_string())
            .unwrap_or_else(|| identity.workspace_name.clone());
        Ok::<_, Error>(WorkspaceBody::from_namespace(&namespace, &identity, &name))
    }
    .await
    .into_response()
}

pub async fn delete(State(ctx): State<ApiContext>, AuthenticatedUser(user): AuthenticatedUser, Path(id): Path<String>) -> impl IntoApiResponse {
    async {
        let namespace = resolve(&ctx.client(), &user.organization_id.to_string(), &id).await?;
        let namespaces: KubeApi<Namespace> = KubeApi::all(ctx.client());
        namespaces
            .delete(&namespace.name_any(), &Default::default())
            .await
            .map_err(Error::from)?;
        Ok::<_, Error>(axum::http::StatusCode::NO_CONTENT)
    }
    .await
    .into_response()
}

pub fn router(ctx: ApiContext) -> ApiRouter<()> {
    ApiRouter::new()
        .api_route("/", post_with(create, workspaces_docs::create_docs).get_with(search, workspaces_docs::search_docs))
        .api_route(
            "/{id}",
            get_with(get, workspaces_docs::get_docs).delete_with(delete, workspaces_docs::delete_docs),
        )
        .nest_api_service("/{id}/servers", servers::router(ctx.clone()))
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_name_prefixes_ws() {
        assert_eq!(namespace_name("demo-1111"), "ws-demo-1111");
    }

    #[test]
    fn test_sanitize_label_lowercases_and_truncates() {
        assert_eq!(sanitize_label("My Workspace!!"), "my-workspace");
    }

    #[test]
    fn test_sanitize_label_empty_falls_back() {
        assert_eq!(sanitize_label("***"), "ws");
    }
}
