use aide::transform::TransformOperation;
use axum::Json;

use crate::auth::UserContext;

/// Documentation for the GET /auth endpoint.
pub fn get_docs(op: TransformOperation<'_>) -> TransformOperation<'_> {
    op.id("getAuthContext")
        .tag("Auth")
        .summary("Validate Token")
        .description("Validates the bearer token against the configured auth provider and returns the resolved user context. 401 when the provider rejects the token.")
        .response_with::<200, Json<UserContext>, _>(|response| {
            response.description("The token is valid; the caller's identity is returned.")
        })
}
