//! Token model - opaque bearer tokens bound to a user and tenant.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bearer token entity.
///
/// The id is the bearer string itself: opaque, CSPRNG-derived, globally
/// unique. A token is valid only while now < `expires_at` and both bound
/// principals are enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Create a new token expiring `ttl` from now.
    pub fn new(id: String, user_id: Uuid, tenant_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            tenant_id,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    /// Check whether this token is expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check whether this token is expired now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
