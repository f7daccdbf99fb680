//! Role model - named grants, optionally owned by a service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role entity.
///
/// The (name, service) pair is unique: role names are unique globally or
/// scoped to their owning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub role_id: Uuid,
    pub name: String,
    pub service_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Create a new role.
    pub fn new(
        name: impl Into<String>,
        service_id: Option<Uuid>,
        description: Option<String>,
    ) -> Self {
        Self {
            role_id: Uuid::new_v4(),
            name: name.into(),
            service_id,
            description,
            created_at: Utc::now(),
        }
    }
}
