//! Token authority - issuance, validation and expiry of bearer tokens.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::models::Token;
use crate::services::{EntityStore, ServiceError};
use crate::utils::secret;

/// Issues and validates opaque bearer tokens bound to a (user, tenant)
/// pair.
///
/// Expired rows are dropped lazily when validation rejects them;
/// [`TokenAuthority::sweep_expired`] offers an eager pass for a periodic
/// caller.
#[derive(Clone)]
pub struct TokenAuthority {
    store: EntityStore,
    default_ttl: Duration,
}

impl TokenAuthority {
    pub fn new(store: EntityStore, config: &TokenConfig) -> Self {
        Self {
            store,
            default_ttl: Duration::seconds(config.default_ttl_seconds),
        }
    }

    /// Issue a token for a user.
    ///
    /// With no explicit tenant the user's default tenant is used; having
    /// neither is a validation failure. Both principals must be enabled.
    pub async fn issue(
        &self,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
        ttl: Option<Duration>,
    ) -> Result<Token, ServiceError> {
        let user = self.store.get_user(user_id).await?;
        let tenant_id = tenant_id.or(user.default_tenant_id).ok_or_else(|| {
            ServiceError::Validation(
                "token issuance requires a tenant or a default tenant on the user".to_string(),
            )
        })?;
        let tenant = self.store.get_tenant(tenant_id).await?;

        if !user.enabled {
            return Err(ServiceError::disabled("user", user.user_id));
        }
        if !tenant.enabled {
            return Err(ServiceError::disabled("tenant", tenant.tenant_id));
        }

        let token = Token::new(
            secret::generate_token_id(),
            user_id,
            tenant_id,
            ttl.unwrap_or(self.default_ttl),
        );
        let token = self.store.insert_token(token).await?;
        tracing::info!(
            user_id = %user_id,
            tenant_id = %tenant_id,
            expires_at = %token.expires_at,
            "token issued"
        );
        Ok(token)
    }

    /// Validate a bearer token and resolve it to its (user, tenant) pair.
    pub async fn validate(&self, token_id: &str) -> Result<(Uuid, Uuid), ServiceError> {
        let Some(token) = self.store.find_token(token_id).await else {
            return Err(ServiceError::InvalidToken);
        };

        if token.is_expired() {
            self.store.remove_token(token_id).await;
            return Err(ServiceError::TokenExpired);
        }

        let user = self
            .store
            .find_user(token.user_id)
            .await
            .ok_or(ServiceError::InvalidToken)?;
        let tenant = self
            .store
            .find_tenant(token.tenant_id)
            .await
            .ok_or(ServiceError::InvalidToken)?;

        if !user.enabled {
            return Err(ServiceError::disabled("user", user.user_id));
        }
        if !tenant.enabled {
            return Err(ServiceError::disabled("tenant", tenant.tenant_id));
        }

        Ok((token.user_id, token.tenant_id))
    }

    /// Validate a token and assert it is bound to the given tenant.
    pub async fn check(
        &self,
        token_id: &str,
        belongs_to: Uuid,
    ) -> Result<(Uuid, Uuid), ServiceError> {
        let (user_id, tenant_id) = self.validate(token_id).await?;
        if tenant_id != belongs_to {
            return Err(ServiceError::InvalidToken);
        }
        Ok((user_id, tenant_id))
    }

    /// Revoke a token. Unknown ids report `InvalidToken`, matching
    /// validation, so revocation cannot be used to probe for live tokens.
    pub async fn revoke(&self, token_id: &str) -> Result<(), ServiceError> {
        match self.store.remove_token(token_id).await {
            Some(token) => {
                tracing::info!(user_id = %token.user_id, "token revoked");
                Ok(())
            }
            None => Err(ServiceError::InvalidToken),
        }
    }

    /// Drop every expired token row. Returns the number removed.
    pub async fn sweep_expired(&self) -> usize {
        let removed = self.store.remove_expired_tokens(Utc::now()).await;
        if removed > 0 {
            tracing::debug!(removed, "expired tokens swept");
        }
        removed
    }

    /// Spawn a background task sweeping expired tokens at an interval.
    pub fn spawn_sweeper(&self, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let authority = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                authority.sweep_expired().await;
            }
        })
    }
}
