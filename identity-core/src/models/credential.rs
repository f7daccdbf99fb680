//! Credential model - non-password secrets held by a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::secret;

/// Credential kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Password,
    Ec2,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Password => "password",
            CredentialKind::Ec2 => "ec2",
        }
    }
}

/// Credential entity.
///
/// Only a digest of the secret is stored; the plaintext is dropped at
/// construction. One user may hold several credentials of different kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub credential_id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub key: String,
    pub secret_hash: String,
    pub kind: CredentialKind,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Create a new credential, digesting the secret.
    pub fn new(
        user_id: Uuid,
        tenant_id: Option<Uuid>,
        key: impl Into<String>,
        plaintext_secret: &str,
        kind: CredentialKind,
    ) -> Self {
        Self {
            credential_id: Uuid::new_v4(),
            user_id,
            tenant_id,
            key: key.into(),
            secret_hash: secret::digest_secret(plaintext_secret),
            kind,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_secret_is_not_stored() {
        let credential = Credential::new(
            Uuid::new_v4(),
            None,
            "access-key",
            "very-secret",
            CredentialKind::Ec2,
        );
        assert_ne!(credential.secret_hash, "very-secret");
        assert_eq!(credential.secret_hash.len(), 64);
    }
}
