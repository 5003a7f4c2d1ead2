use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::axum::IntoApiResponse;
use axum::Json;

use super::{auth_docs, AuthenticatedUser};
use crate::auth::UserContext;

/// Handler for GET /auth (§4.3): delegates token validation to the loaded
/// provider and echoes back the resolved user context.
pub async fn get(AuthenticatedUser(user): AuthenticatedUser) -> impl IntoApiResponse {
    Json(user)
}

pub fn router(ctx: super::ApiContext) -> ApiRouter<()> {
    ApiRouter::new()
        .api_route("/", get_with(get, auth_docs::get_docs))
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_context_serializes_with_roles() {
        let user = UserContext {
            user_id: uuid::Uuid::nil(),
            organization_id: uuid::Uuid::nil(),
            roles: vec!["admin".to_string()],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["roles"][0], "admin");
    }
}
