//! Tenant model - isolation boundary for role grants and catalog scoping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant entity.
///
/// `name` and `uid` are each unique across the store. Tenants are disabled,
/// never deleted: role assignments referencing a disabled tenant stay on
/// record and go inert until the tenant is re-enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub tenant_id: Uuid,
    pub name: String,
    pub uid: String,
    pub enabled: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Create a new enabled tenant with a fresh external uid.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            tenant_id: Uuid::new_v4(),
            name: name.into(),
            uid: Uuid::new_v4().simple().to_string(),
            enabled: true,
            description,
            created_at: Utc::now(),
        }
    }
}
