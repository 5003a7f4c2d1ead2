use super::WorkspaceBody;
use aide::transform::TransformOperation;
use axum::Json;

pub fn search_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("searchWorkspaces")
        .tag("Workspace")
        .summary("Search Workspaces")
        .description("Lists every workspace owned by the caller's organization.")
        .response_with::<200, Json<Vec<WorkspaceBody>>, _>(|response| {
            response.description("The workspaces were found.").example(vec![WorkspaceBody::default()])
        })
}

pub fn get_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("getWorkspace")
        .tag("Workspace")
        .summary("Get Workspace")
        .description("Retrieves a single workspace by id, scoped to the caller's organization.")
        .response_with::<200, Json<WorkspaceBody>, _>(|response| {
            response.description("The workspace was found.").example(WorkspaceBody::default())
        })
}

pub fn create_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("createWorkspace")
        .tag("Workspace")
        .summary("Create Workspace")
        .description("Provisions a tenant namespace for a new workspace, labelled with the caller's organization and user identity.")
        .response_with::<200, Json<WorkspaceBody>, _>(|response| {
            response.description("The workspace was created.").example(WorkspaceBody::default())
        })
}

pub fn delete_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("deleteWorkspace")
        .tag("Workspace")
        .summary("Delete Workspace")
        .description("Deletes the workspace's tenant namespace and every server it contains.")
        .response_with::<204, (), _>(|response| response.description("The workspace was deleted."))
}
