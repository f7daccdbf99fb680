//! Authorization and token-validation core for a multi-tenant identity
//! service.
//!
//! This crate is the storage-backed heart of the service: the entity store
//! for users, tenants, roles, services, endpoint templates, credentials and
//! tokens, plus the services that operate over it. A client authenticates
//! through the [`services::CredentialVerifier`], receives a bearer token
//! from the [`services::TokenAuthority`], and later presents it back;
//! validation resolves the token to its (user, tenant) pair, the
//! [`services::RoleIndex`] yields the effective role set, and the
//! [`services::CatalogResolver`] expands the tenant's service catalog.
//!
//! Transport is intentionally out of scope: an HTTP or RPC layer holds an
//! [`Identity`] and maps requests onto it.

pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod utils;

use crate::config::IdentityConfig;
use crate::services::{
    CatalogResolver, CredentialVerifier, EntityStore, RoleIndex, ServiceError, TokenAuthority,
};

/// Composition root: the store and the services wired over it.
///
/// All fields are cheaply cloneable and share the same underlying rows.
#[derive(Clone)]
pub struct Identity {
    pub config: IdentityConfig,
    pub store: EntityStore,
    pub credentials: CredentialVerifier,
    pub tokens: TokenAuthority,
    pub roles: RoleIndex,
    pub catalog: CatalogResolver,
}

impl Identity {
    pub fn new(config: IdentityConfig) -> Self {
        let store = EntityStore::new();
        Self {
            credentials: CredentialVerifier::new(store.clone(), config.kdf.clone()),
            tokens: TokenAuthority::new(store.clone(), &config.token),
            roles: RoleIndex::new(store.clone()),
            catalog: CatalogResolver::new(store.clone()),
            store,
            config,
        }
    }

    /// Build from environment configuration.
    pub fn from_env() -> Result<Self, ServiceError> {
        Ok(Self::new(IdentityConfig::from_env()?))
    }
}
