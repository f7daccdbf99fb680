//! Service model - catalog entries for the services a deployment offers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Service entity.
///
/// `name` is unique across the store. `service_type` is an open set of
/// codes (compute, identity, object-store, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub service_id: Uuid,
    pub name: String,
    pub service_type: String,
    pub description: Option<String>,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Service {
    /// Create a new service.
    pub fn new(name: impl Into<String>, service_type: impl Into<String>) -> Self {
        Self {
            service_id: Uuid::new_v4(),
            name: name.into(),
            service_type: service_type.into(),
            description: None,
            owner_id: None,
            created_at: Utc::now(),
        }
    }
}
