//! Role assignment model - user→role grants, global or tenant-scoped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scope of a role grant.
///
/// Replaces the nullable tenant column of the persisted layout with an
/// exhaustive variant, so callers must handle both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleScope {
    /// Grant applies in every tenant.
    Global,
    /// Grant applies within a single tenant.
    Tenant(Uuid),
}

impl RoleScope {
    /// The tenant this scope is bound to, if any.
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            RoleScope::Global => None,
            RoleScope::Tenant(tenant_id) => Some(*tenant_id),
        }
    }
}

/// Role assignment entity.
///
/// One row per (user, role, scope) triple; the store rejects duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub scope: RoleScope,
    pub granted_at: DateTime<Utc>,
}

impl RoleAssignment {
    /// Create a new assignment granted now.
    pub fn new(user_id: Uuid, role_id: Uuid, scope: RoleScope) -> Self {
        Self {
            user_id,
            role_id,
            scope,
            granted_at: Utc::now(),
        }
    }
}
