use super::health::HealthBody;
use aide::transform::TransformOperation;
use axum::Json;

/// Documentation for the GET /health endpoint.
pub fn health_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("getHealth")
        .tag("Health")
        .summary("Liveness")
        .description("Reports that the control-plane process is up, along with host metrics. Never fails unless the process itself is down; metrics are informational and never gate the response.")
        .response_with::<200, Json<HealthBody>, _>(|response| {
            response.description("The process is alive.")
        })
}
