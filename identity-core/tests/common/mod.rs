//! Test helper module for identity-core integration tests.

#![allow(dead_code)]

use identity_core::config::{IdentityConfig, KdfConfig, TokenConfig};
use identity_core::models::{EndpointTemplate, Role, Service, Tenant, User};
use identity_core::Identity;

/// Config with light KDF work factors so tests stay fast.
pub fn test_config() -> IdentityConfig {
    IdentityConfig {
        kdf: KdfConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
        token: TokenConfig {
            default_ttl_seconds: 3600,
        },
        ..IdentityConfig::default()
    }
}

/// Spawn a fresh, empty identity core.
pub fn identity() -> Identity {
    Identity::new(test_config())
}

pub async fn seed_tenant(identity: &Identity, name: &str) -> Tenant {
    identity
        .store
        .create_tenant(Tenant::new(name, None))
        .await
        .expect("Failed to seed tenant")
}

pub async fn seed_user(identity: &Identity, name: &str, password: Option<&str>) -> User {
    let user = identity
        .store
        .create_user(User::new(name, None))
        .await
        .expect("Failed to seed user");
    if let Some(password) = password {
        identity
            .credentials
            .set_password(user.user_id, password)
            .await
            .expect("Failed to set password");
    }
    identity
        .store
        .get_user(user.user_id)
        .await
        .expect("Failed to reload user")
}

pub async fn seed_role(identity: &Identity, name: &str) -> Role {
    identity
        .store
        .create_role(Role::new(name, None, None))
        .await
        .expect("Failed to seed role")
}

pub async fn seed_service(identity: &Identity, name: &str, service_type: &str) -> Service {
    identity
        .store
        .create_service(Service::new(name, service_type))
        .await
        .expect("Failed to seed service")
}

/// Seed a global endpoint template for a service.
pub async fn seed_global_template(
    identity: &Identity,
    service: &Service,
    public_url: &str,
    internal_url: &str,
    admin_url: &str,
) -> EndpointTemplate {
    let mut template = EndpointTemplate::new(
        service.service_id,
        "RegionOne",
        public_url,
        internal_url,
        admin_url,
    );
    template.is_global = true;
    identity
        .store
        .create_endpoint_template(template)
        .await
        .expect("Failed to seed endpoint template")
}
