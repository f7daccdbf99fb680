//! Catalog resolver - expands endpoint templates into tenant-scoped URLs.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::services::{EntityStore, ServiceError};

/// Failure to expand a URL template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder '%{0}%'")]
    UnknownPlaceholder(String),

    #[error("unterminated placeholder")]
    Unterminated,
}

/// The closed set of variables a URL template may reference.
struct TemplateVars<'a> {
    tenant_id: &'a str,
    region: &'a str,
}

impl TemplateVars<'_> {
    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "tenant_id" => Some(self.tenant_id),
            "region" => Some(self.region),
            _ => None,
        }
    }
}

/// Expand `%name%` placeholders against the variable set.
///
/// `%%` is a literal percent sign. Unknown names and a trailing unmatched
/// `%` are errors, never passed through.
fn expand(template: &str, vars: &TemplateVars<'_>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        rest = &rest[start + 1..];

        let Some(end) = rest.find('%') else {
            return Err(TemplateError::Unterminated);
        };
        let name = &rest[..end];
        if name.is_empty() {
            out.push('%');
        } else {
            match vars.lookup(name) {
                Some(value) => out.push_str(value),
                None => return Err(TemplateError::UnknownPlaceholder(name.to_string())),
            }
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// One resolved catalog row: a service's endpoint triple in a region.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub service_id: Uuid,
    pub service_name: String,
    pub service_type: String,
    pub region: String,
    pub public_url: String,
    pub internal_url: String,
    pub admin_url: String,
}

/// Expands the endpoint-template table into a tenant's service catalog.
#[derive(Clone)]
pub struct CatalogResolver {
    store: EntityStore,
}

impl CatalogResolver {
    pub fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// Resolve the catalog visible to a tenant.
    ///
    /// Includes every enabled template that is global or has a materialized
    /// endpoint for this tenant. `%tenant_id%` expands to the tenant's
    /// external uid.
    pub async fn resolve_catalog(&self, tenant_id: Uuid) -> Result<Vec<CatalogEntry>, ServiceError> {
        let tenant = self.store.get_tenant(tenant_id).await?;

        let mut entries = Vec::new();
        for template in self.store.list_endpoint_templates().await {
            if !template.enabled {
                continue;
            }
            if !template.is_global
                && self
                    .store
                    .find_endpoint_for(template.template_id, tenant_id)
                    .await
                    .is_none()
            {
                continue;
            }
            let Some(service) = self.store.find_service(template.service_id).await else {
                continue;
            };

            let vars = TemplateVars {
                tenant_id: &tenant.uid,
                region: &template.region,
            };
            entries.push(CatalogEntry {
                service_id: service.service_id,
                service_name: service.name,
                service_type: service.service_type,
                region: template.region.clone(),
                public_url: expand(&template.public_url, &vars)?,
                internal_url: expand(&template.internal_url, &vars)?,
                admin_url: expand(&template.admin_url, &vars)?,
            });
        }

        tracing::debug!(tenant_id = %tenant_id, entries = entries.len(), "catalog resolved");
        Ok(entries)
    }
}
