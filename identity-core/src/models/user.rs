//! User model - principal accounts and their credential material.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity.
///
/// `name` and `uid` are each unique across the store. `uid` is the opaque
/// identifier handed out to external callers; `user_id` never leaves the
/// service boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub uid: String,
    pub enabled: bool,
    pub email: Option<String>,
    pub default_tenant_id: Option<Uuid>,
    /// PHC-format password hash. Stripped by `sanitized()`.
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new enabled user with a fresh external uid.
    pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            name: name.into(),
            uid: Uuid::new_v4().simple().to_string(),
            enabled: true,
            email,
            default_tenant_id: None,
            password_hash: None,
            created_at: Utc::now(),
        }
    }

    /// Convert to a sanitized view (no credential material).
    pub fn sanitized(&self) -> SanitizedUser {
        SanitizedUser {
            user_id: self.user_id,
            name: self.name.clone(),
            uid: self.uid.clone(),
            enabled: self.enabled,
            email: self.email.clone(),
            default_tenant_id: self.default_tenant_id,
            created_at: self.created_at,
        }
    }
}

/// User view without sensitive fields.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedUser {
    pub user_id: Uuid,
    pub name: String,
    pub uid: String,
    pub enabled: bool,
    pub email: Option<String>,
    pub default_tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
