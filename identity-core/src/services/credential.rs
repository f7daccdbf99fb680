//! Credential verifier - fail-closed secret verification.

use uuid::Uuid;

use crate::config::KdfConfig;
use crate::models::{Credential, CredentialKind};
use crate::services::{EntityStore, ServiceError};
use crate::utils::{hash_password, verify_password, secret, Password};

/// Verifies presented secrets against stored credential material.
///
/// Verification reports only a boolean. A missing user, a disabled user, a
/// missing credential and a wrong secret are all indistinguishable to the
/// caller, so nothing about account existence leaks.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: EntityStore,
    kdf: KdfConfig,
}

impl CredentialVerifier {
    pub fn new(store: EntityStore, kdf: KdfConfig) -> Self {
        Self { store, kdf }
    }

    /// Hash a password with the configured work factors and store it on the
    /// user.
    pub async fn set_password(&self, user_id: Uuid, password: &str) -> Result<(), ServiceError> {
        let hash = hash_password(&Password::new(password.to_string()), &self.kdf)?;
        self.store
            .update_user_password(user_id, hash.into_string())
            .await
    }

    /// Store a key-pair credential for a user. Only the secret's digest is
    /// persisted.
    pub async fn add_key_credential(
        &self,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
        key: &str,
        plaintext_secret: &str,
    ) -> Result<Credential, ServiceError> {
        self.store
            .add_credential(Credential::new(
                user_id,
                tenant_id,
                key,
                plaintext_secret,
                CredentialKind::Ec2,
            ))
            .await
    }

    /// Verify a presented secret for a user.
    pub async fn verify(
        &self,
        user_id: Uuid,
        presented_secret: &str,
        kind: CredentialKind,
    ) -> Result<bool, ServiceError> {
        let Some(user) = self.store.find_user(user_id).await else {
            return Ok(false);
        };
        if !user.enabled {
            return Ok(false);
        }

        let matched = match kind {
            CredentialKind::Password => user
                .password_hash
                .as_deref()
                .map(|hash| {
                    verify_password(&Password::new(presented_secret.to_string()), hash)
                })
                .unwrap_or(false),
            CredentialKind::Ec2 => {
                let digest = secret::digest_secret(presented_secret);
                self.store
                    .credentials_for_user(user_id, CredentialKind::Ec2)
                    .await
                    .iter()
                    .any(|credential| secret::digests_match(&credential.secret_hash, &digest))
            }
        };
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn test_kdf() -> KdfConfig {
        KdfConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    async fn fixture() -> (CredentialVerifier, EntityStore, User) {
        let store = EntityStore::new();
        let verifier = CredentialVerifier::new(store.clone(), test_kdf());
        let user = store.create_user(User::new("alice", None)).await.unwrap();
        (verifier, store, user)
    }

    #[tokio::test]
    async fn password_round_trip() {
        let (verifier, _store, user) = fixture().await;
        verifier.set_password(user.user_id, "opensesame").await.unwrap();

        assert!(verifier
            .verify(user.user_id, "opensesame", CredentialKind::Password)
            .await
            .unwrap());
        assert!(!verifier
            .verify(user.user_id, "wrong", CredentialKind::Password)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn unknown_user_fails_closed() {
        let (verifier, _store, _user) = fixture().await;
        assert!(!verifier
            .verify(Uuid::new_v4(), "anything", CredentialKind::Password)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn user_without_password_fails_closed() {
        let (verifier, _store, user) = fixture().await;
        assert!(!verifier
            .verify(user.user_id, "anything", CredentialKind::Password)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn disabled_user_fails_closed() {
        let (verifier, store, user) = fixture().await;
        verifier.set_password(user.user_id, "opensesame").await.unwrap();
        store.set_user_enabled(user.user_id, false).await.unwrap();

        assert!(!verifier
            .verify(user.user_id, "opensesame", CredentialKind::Password)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn key_credential_verification() {
        let (verifier, _store, user) = fixture().await;
        verifier
            .add_key_credential(user.user_id, None, "access-key", "key-secret")
            .await
            .unwrap();

        assert!(verifier
            .verify(user.user_id, "key-secret", CredentialKind::Ec2)
            .await
            .unwrap());
        assert!(!verifier
            .verify(user.user_id, "other-secret", CredentialKind::Ec2)
            .await
            .unwrap());
        // Kinds do not cross-match.
        assert!(!verifier
            .verify(user.user_id, "key-secret", CredentialKind::Password)
            .await
            .unwrap());
    }
}
