use aide::axum::routing::{get_with, post_with};
use aide::axum::{ApiRouter, IntoApiResponse};
use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use k8s_openapi::api::apps::v1::Deployment;
use kube::api::{Patch, PatchParams};
use kube::Api as KubeApi;

use crate::operator::{builders, MCPService, ResourceManager};
use crate::registry::{translate, ServerJson};
use crate::{Error, Result};

use super::{servers_docs, workspaces, ApiContext, AuthenticatedUser, PatchServerBody, ServerBody, ServerList};

pub(super) async fn authorize_workspace(ctx: &ApiContext, user: &crate::auth::UserContext, workspace_id: &str) -> Result<k8s_openapi::api::core::v1::Namespace> {
    if !ctx.auth_provider().check_workspace_access(user, workspace_id).await? {
        return Err(Error::generic(format!("caller has no access to workspace '{workspace_id}'"))
            .with_name("E_FORBIDDEN")
            .with_kind(crate::ErrorKind::Auth)
            .with_status(axum::http::StatusCode::FORBIDDEN));
    }
    workspaces::resolve(&ctx.client(), &user.organization_id.to_string(), workspace_id).await
}

pub async fn create(
    State(ctx): State<ApiContext>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(workspace_id): Path<String>,
    Json(server_json): Json<ServerJson>,
) -> impl IntoApiResponse {
    async {
        let namespace = authorize_workspace(&ctx, &user, &workspace_id).await?;
        let namespace_name = kube::ResourceExt::name_any(&namespace);
        let identity = crate::utils::read_tenancy_identity(kube::ResourceExt::labels(&namespace))
            .expect("validated by authorize_workspace");

        let (name, spec, labels) = translate(&server_json, &identity, ctx.cluster_arch())?;
        let mut service = MCPService::new(&namespace_name, &name, spec);
        service.meta_mut().labels = Some(labels);
        let created = service.apply(&ctx.client()).await?;
        Ok::<_, Error>(ServerBody::from_service(created, &identity.workspace_id))
    }
    .await
    .into_response()
}

pub async fn search(
    State(ctx): State<ApiContext>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(workspace_id): Path<String>,
) -> impl IntoApiResponse {
    async {
        let namespace = authorize_workspace(&ctx, &user, &workspace_id).await?;
        let namespace_name = kube::ResourceExt::name_any(&namespace);
        let services = MCPService::search(&ctx.client(), &namespace_name, None).await?;
        let bodies = services
            .into_iter()
            .map(|service| ServerBody::from_service(service, &workspace_id))
            .collect();
        Ok::<_, Error>(ServerList(bodies))
    }
    .await
    .into_response()
}

pub async fn get(
    State(ctx): State<ApiContext>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((workspace_id, name)): Path<(String, String)>,
) -> impl IntoApiResponse {
    async {
        let namespace = authorize_workspace(&ctx, &user, &workspace_id).await?;
        let namespace_name = kube::ResourceExt::name_any(&namespace);
        let service = MCPService::get_by_name(&ctx.client(), &namespace_name, &name).await?;
        Ok::<_, Error>(ServerBody::from_service(service, &workspace_id))
    }
    .await
    .into_response()
}

pub async fn patch(
    State(ctx): State<ApiContext>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((workspace_id, name)): Path<(String, String)>,
    Json(patch): Json<PatchServerBody>,
) -> impl IntoApiResponse {
    async {
        let namespace = authorize_workspace(&ctx, &user, &workspace_id).await?;
        let namespace_name = kube::ResourceExt::name_any(&namespace);
        let service = MCPService::get_by_name(&ctx.client(), &namespace_name, &name).await?;
        let spec = patch.apply_to(service.spec.clone())?;
        let patched = service.patch(&ctx.client(), spec).await?;
        Ok::<_, Error>(ServerBody::from_service(patched, &workspace_id))
    }
    .await
    .into_response()
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((workspace_id, name)): Path<(String, String)>,
) -> impl IntoApiResponse {
    async {
        let namespace = authorize_workspace(&ctx, &user, &workspace_id).await?;
        let namespace_name = kube::ResourceExt::name_any(&namespace);
        let service = MCPService::get_by_name(&ctx.client(), &namespace_name, &name).await?;
        service.delete(&ctx.client()).await?;
        Ok::<_, Error>(axum::http::StatusCode::NO_CONTENT)
    }
    .await
    .into_response()
}

/// Handler for `POST /v1/workspaces/{id}/servers/{name}/restart` (§4.3):
/// triggers a rolling restart by touching the workload's pod template, the
/// same mechanism `kubectl rollout restart` uses.
pub async fn restart(
    State(ctx): State<ApiContext>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((workspace_id, name)): Path<(String, String)>,
) -> impl IntoApiResponse {
    async {
        let namespace = authorize_workspace(&ctx, &user, &workspace_id).await?;
        let namespace_name = kube::ResourceExt::name_any(&namespace);
        let service = MCPService::get_by_name(&ctx.client(), &namespace_name, &name).await?;
        let deployment_name = builders::child_name(&service);
        let patch = serde_json::json!({
            "spec": {
                "template": {
                    "metadata": {
                        "annotations": {
                            "mcp.nimbletools.dev/restartedAt": chrono::Utc::now().to_rfc3339(),
                        }
                    }
                }
            }
        });
        KubeApi::<Deployment>::namespaced(ctx.client(), &namespace_name)
            .patch(&deployment_name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(Error::from)?;
        Ok::<_, Error>(axum::http::StatusCode::ACCEPTED)
    }
    .await
    .into_response()
}

pub fn router(ctx: ApiContext) -> ApiRouter<()> {
    ApiRouter::new()
        .api_route("/", post_with(create, servers_docs::create_docs).get_with(search, servers_docs::search_docs))
        .api_route(
            "/{name}",
            get_with(get, servers_docs::get_docs)
                .patch_with(patch, servers_docs::patch_docs)
                .delete_with(delete, servers_docs::delete_docs),
        )
        .api_route("/{name}/restart", post_with(restart, servers_docs::restart_docs))
        .nest_api_service("/{name}/logs", super::logs::router(ctx.clone()))
        .with_state(ctx)
}
