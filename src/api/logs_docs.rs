use super::LogResponse;
use aide::transform::TransformOperation;
use axum::Json;

pub fn list_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("listServerLogs")
        .tag("Server")
        .summary("List Server Logs")
        .description(
            "Aggregates logs across every pod backing a server, newest first. \
             `limit` bounds the returned entry count (default 10, max 1000); \
             `since`/`until` and `level` filter the window and minimum severity; \
             `podName` restricts to a single pod. 422 on an out-of-range `limit` \
             or a malformed timestamp; 404 if the server does not exist.",
        )
        .response_with::<200, Json<LogResponse>, _>(|response| {
            response.description("Logs were aggregated.").example(LogResponse::new(vec![], false))
        })
}
