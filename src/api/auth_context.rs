use std::future::Future;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

use crate::auth::UserContext;
use crate::Error;

use super::ApiContext;

/// Extracts the authenticated caller from the `Authorization: Bearer <token>`
/// header by delegating to the loaded [`crate::auth::AuthProvider`] (§4.5).
/// Every organization-scoped handler authorizes against this, never against a
/// workspace name or other derived value.
pub struct AuthenticatedUser(pub UserContext);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    ApiContext: axum::extract::FromRef<S>,
{
    type Rejection = Error;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let ctx = ApiContext::from_ref(state);
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        async move {
            let token = token.ok_or_else(|| {
                Error::generic("missing bearer token")
                    .with_name("E_UNAUTHENTICATED")
                    .with_status(StatusCode::UNAUTHORIZED)
                    .with_kind(crate::ErrorKind::Auth)
            })?;
            let user = ctx.auth_provider().validate_token(&token).await?;
            user.map(AuthenticatedUser).ok_or_else(|| {
                Error::generic("token rejected by auth provider")
                    .with_name("E_UNAUTHENTICATED")
                    .with_status(StatusCode::UNAUTHORIZED)
                    .with_kind(crate::ErrorKind::Auth)
            })
        }
    }
}
