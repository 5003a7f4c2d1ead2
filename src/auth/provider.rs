use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// Authenticated caller identity, returned by [`AuthProvider::validate_token`]
/// (§4.5). Every organization-scoped API operation is authorized against
/// this, never against a namespace name or other derived value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserContext {
    pub user_id: Uuid,
    pub organization_id: Uuid,

    #[serde(default)]
    pub roles: Vec<String>,
}

/// The five-operation contract every provider implements (§4.5). The
/// reference loads this as a dynamically imported module; this is the
/// static re-architecture of §9 ("Dynamic provider loading → explicit
/// plug-in seam"): any type implementing this trait is a valid provider,
/// registered into a [`super::ProviderRegistry`] lookup table rather than
/// imported by name at runtime.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Establish resources; fails at startup if required config is missing.
    async fn initialize(&self) -> Result<()>;

    /// Release resources; always best-effort.
    async fn shutdown(&self);

    /// `None` when the token is invalid, expired, or unrecognized — never
    /// an error; an unauthenticated caller is an ordinary outcome.
    async fn validate_token(&self, token: &str) -> Result<Option<UserContext>>;

    async fn check_workspace_access(&self, user: &UserContext, workspace_id: &str)
        -> Result<bool>;

    async fn check_permission(&self, user: &UserContext, resource: &str, action: &str)
        -> Result<bool>;
}
