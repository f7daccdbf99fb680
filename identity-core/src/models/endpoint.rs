//! Endpoint models - parametrized service URLs and their tenant bindings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Endpoint template entity.
///
/// Carries the public/internal/admin URL triple for a service in a region.
/// URLs may contain placeholders expanded at catalog resolution time. A
/// global template applies to every tenant; a non-global one only to
/// tenants with a materialized [`Endpoint`] binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointTemplate {
    pub template_id: Uuid,
    pub service_id: Uuid,
    pub region: String,
    pub public_url: String,
    pub internal_url: String,
    pub admin_url: String,
    pub is_global: bool,
    pub enabled: bool,
    pub version_id: Option<String>,
    pub version_info: Option<String>,
    pub version_list: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EndpointTemplate {
    /// Create a new enabled, non-global template.
    pub fn new(
        service_id: Uuid,
        region: impl Into<String>,
        public_url: impl Into<String>,
        internal_url: impl Into<String>,
        admin_url: impl Into<String>,
    ) -> Self {
        Self {
            template_id: Uuid::new_v4(),
            service_id,
            region: region.into(),
            public_url: public_url.into(),
            internal_url: internal_url.into(),
            admin_url: admin_url.into(),
            is_global: false,
            enabled: true,
            version_id: None,
            version_info: None,
            version_list: None,
            created_at: Utc::now(),
        }
    }
}

/// Materialized binding of a template to a tenant.
///
/// Unique per (template, tenant) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub endpoint_id: Uuid,
    pub template_id: Uuid,
    pub tenant_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Endpoint {
    /// Bind a template to a tenant.
    pub fn new(template_id: Uuid, tenant_id: Uuid) -> Self {
        Self {
            endpoint_id: Uuid::new_v4(),
            template_id,
            tenant_id,
            created_at: Utc::now(),
        }
    }
}
