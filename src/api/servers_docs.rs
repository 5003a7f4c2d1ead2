use super::ServerBody;
use aide::transform::TransformOperation;
use axum::Json;

pub fn search_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("searchServers")
        .tag("Server")
        .summary("Search Servers")
        .description("Lists every `MCPService` in the workspace, with its current configuration and status.")
        .response_with::<200, Json<Vec<ServerBody>>, _>(|response| {
            response.description("The servers were found.").example(vec![ServerBody::default()])
        })
}

pub fn get_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("getServer")
        .tag("Server")
        .summary("Get Server")
        .description("Retrieves a server's configuration and current status.")
        .response_with::<200, Json<ServerBody>, _>(|response| {
            response.description("The server was found.").example(ServerBody::default())
        })
}

pub fn create_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("createServer")
        .tag("Server")
        .summary("Create Server")
        .description("Translates a `server.json` document into an `MCPService` and submits it to the cluster. 422 on a malformed or architecture-incompatible definition; 409 if a server by that name already exists.")
        .response_with::<200, Json<ServerBody>, _>(|response| {
            response.description("The server was created.").example(ServerBody::default())
        })
}

pub fn patch_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("patchServer")
        .tag("Server")
        .summary("Update Server")
        .description("Applies a partial update to a server's scaling and environment configuration.")
        .response_with::<200, Json<ServerBody>, _>(|response| {
            response.description("The server was updated.").example(ServerBody::default())
        })
}

pub fn delete_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("deleteServer")
        .tag("Server")
        .summary("Delete Server")
        .description("Removes the `MCPService`; the operator's finalizer tears down its owned Workload, Service, Ingress, and ConfigMap before the object is removed.")
        .response_with::<204, (), _>(|response| response.description("The server was deleted."))
}

pub fn restart_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("restartServer")
        .tag("Server")
        .summary("Restart Server")
        .description("Triggers a rolling restart of the server's workload by annotating its pod template.")
        .response_with::<202, (), _>(|response| response.description("The restart was accepted."))
}
