use async_trait::async_trait;
use uuid::Uuid;

use super::{AuthProvider, UserContext};
use crate::Result;

/// Bundled default provider: accepts any non-empty bearer token and grants
/// full access. Constructed only when a configuration document explicitly
/// names the `permissive` class (§4.5, §9) — an empty factory table is a
/// missing provider, not an implicit default.
#[derive(Debug, Clone, Default)]
pub struct PermissiveProvider;

#[async_trait]
impl AuthProvider for PermissiveProvider {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn shutdown(&self) {}

    async fn validate_token(&self, token: &str) -> Result<Option<UserContext>> {
        if token.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(UserContext {
            user_id: Uuid::new_v5(&Uuid::NAMESPACE_URL, token.as_bytes()),
            organization_id: Uuid::nil(),
            roles: vec!["admin".to_string()],
        }))
    }

    async fn check_workspace_access(
        &self,
        _user: &UserContext,
        _workspace_id: &str,
    ) -> Result<bool> {
        Ok(true)
    }

    async fn check_permission(
        &self,
        _user: &UserContext,
        _resource: &str,
        _action: &str,
    ) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_permissive_provider_rejects_empty_token() {
        let provider = PermissiveProvider;
        assert!(provider.validate_token("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_permissive_provider_accepts_any_token() {
        let provider = PermissiveProvider;
        let user = provider.validate_token("abc").await.unwrap().unwrap();
        assert_eq!(user.roles, vec!["admin".to_string()]);
    }

    #[tokio::test]
    async fn test_permissive_provider_allows_everything() {
        let provider = PermissiveProvider;
        let user = provider.validate_token("abc").await.unwrap().unwrap();
        assert!(provider.check_workspace_access(&user, "ws").await.unwrap());
        assert!(provider
            .check_permission(&user, "server", "delete")
            .await
            .unwrap());
    }
}
