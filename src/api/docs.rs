use aide::axum::IntoApiResponse;
use aide::openapi::{OpenApi, Tag};
use aide::transform::TransformOpenApi;
use axum::{Extension, Json};

pub async fn serve(Extension(api): Extension<OpenApi>) -> impl IntoApiResponse {
    Json(api)
}

pub fn openapi(api: TransformOpenApi<'_>) -> TransformOpenApi<'_> {
    api.title("NimbleTools Core")
        .summary("Control-plane API for running multi-tenant Model Context Protocol servers")
        .tag(Tag {
            name: "Workspace".to_string(),
            description: Some("Tenant-scoped containers for servers.".to_string()),
            ..Default::default()
        })
        .tag(Tag {
            name: "Server".to_string(),
            description: Some("Lifecycle operations on `MCPService` resources.".to_string()),
            ..Default::default()
        })
        .tag(Tag {
            name: "Auth".to_string(),
            description: Some("Token validation against the configured auth provider.".to_string()),
            ..Default::default()
        })
        .tag(Tag {
            name: "Health".to_string(),
            description: Some("Process liveness.".to_string()),
            ..Default::default()
        })
}
