//! Entity store - concurrent persistence for the identity tables.
//!
//! Rows live in concurrent maps keyed by id. Uniqueness constraints are
//! enforced by secondary index maps whose entries are claimed atomically
//! before the row insert; a failed claim never leaves a partial write.
//! Users and tenants are disabled in place, never removed, so assignments
//! and tokens referencing them stay resolvable.

use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{
    Credential, CredentialKind, Endpoint, EndpointTemplate, Role, RoleAssignment, RoleScope,
    Service, Tenant, Token, User,
};
use crate::services::ServiceError;

/// Key for the role-assignment table: one row per (user, role, scope).
pub type AssignmentKey = (Uuid, Uuid, RoleScope);

#[derive(Default)]
struct Tables {
    users: DashMap<Uuid, User>,
    users_by_name: DashMap<String, Uuid>,
    users_by_uid: DashMap<String, Uuid>,
    tenants: DashMap<Uuid, Tenant>,
    tenants_by_name: DashMap<String, Uuid>,
    tenants_by_uid: DashMap<String, Uuid>,
    roles: DashMap<Uuid, Role>,
    roles_by_name: DashMap<(String, Option<Uuid>), Uuid>,
    services: DashMap<Uuid, Service>,
    services_by_name: DashMap<String, Uuid>,
    templates: DashMap<Uuid, EndpointTemplate>,
    endpoints: DashMap<Uuid, Endpoint>,
    endpoints_by_binding: DashMap<(Uuid, Uuid), Uuid>,
    credentials: DashMap<Uuid, Credential>,
    assignments: DashMap<AssignmentKey, RoleAssignment>,
    tokens: DashMap<String, Token>,
}

/// Concurrent entity store.
///
/// Cloning is cheap; all clones share the same rows.
#[derive(Clone, Default)]
pub struct EntityStore {
    tables: Arc<Tables>,
}

/// Atomically claim a uniqueness-index slot for `id`.
fn claim<K: Eq + Hash>(
    index: &DashMap<K, Uuid>,
    key: K,
    id: Uuid,
    describe: impl FnOnce() -> String,
) -> Result<(), ServiceError> {
    match index.entry(key) {
        Entry::Occupied(_) => Err(ServiceError::conflict(describe())),
        Entry::Vacant(slot) => {
            slot.insert(id);
            Ok(())
        }
    }
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== User Operations ====================

    /// Insert a new user, enforcing name and uid uniqueness.
    pub async fn create_user(&self, user: User) -> Result<User, ServiceError> {
        let t = &self.tables;
        claim(&t.users_by_name, user.name.clone(), user.user_id, || {
            format!("user name '{}' already exists", user.name)
        })?;
        if let Err(err) = claim(&t.users_by_uid, user.uid.clone(), user.user_id, || {
            format!("user uid '{}' already exists", user.uid)
        }) {
            t.users_by_name.remove(&user.name);
            return Err(err);
        }
        t.users.insert(user.user_id, user.clone());
        tracing::info!(user_id = %user.user_id, name = %user.name, "user created");
        Ok(user)
    }

    /// Insert a new user together with an initial role grant.
    ///
    /// Atomic: if the grant targets are invalid the user row and its
    /// uniqueness claims are rolled back.
    pub async fn create_user_with_grant(
        &self,
        user: User,
        role_id: Uuid,
        scope: RoleScope,
    ) -> Result<User, ServiceError> {
        let user = self.create_user(user).await?;
        if let Err(err) = self.check_grant_targets(role_id, scope) {
            let t = &self.tables;
            t.users.remove(&user.user_id);
            t.users_by_name.remove(&user.name);
            t.users_by_uid.remove(&user.uid);
            return Err(err);
        }
        self.tables.assignments.insert(
            (user.user_id, role_id, scope),
            RoleAssignment::new(user.user_id, role_id, scope),
        );
        tracing::info!(user_id = %user.user_id, role_id = %role_id, "user created with initial grant");
        Ok(user)
    }

    /// Fetch a user by id.
    pub async fn get_user(&self, user_id: Uuid) -> Result<User, ServiceError> {
        self.find_user(user_id)
            .await
            .ok_or_else(|| ServiceError::not_found("user", user_id))
    }

    /// Fetch a user by id, `None` if absent.
    pub async fn find_user(&self, user_id: Uuid) -> Option<User> {
        self.tables.users.get(&user_id).map(|row| row.value().clone())
    }

    /// Fetch a user by unique name.
    pub async fn find_user_by_name(&self, name: &str) -> Option<User> {
        let user_id = *self.tables.users_by_name.get(name)?;
        self.find_user(user_id).await
    }

    /// List all users.
    pub async fn list_users(&self) -> Vec<User> {
        self.tables.users.iter().map(|r| r.value().clone()).collect()
    }

    /// Flip the enabled flag. Soft operation: the row is never removed.
    pub async fn set_user_enabled(&self, user_id: Uuid, enabled: bool) -> Result<(), ServiceError> {
        let mut row = self
            .tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;
        row.enabled = enabled;
        tracing::info!(user_id = %user_id, enabled, "user enabled flag changed");
        Ok(())
    }

    /// Replace the user's password hash.
    pub async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: String,
    ) -> Result<(), ServiceError> {
        let mut row = self
            .tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;
        row.password_hash = Some(password_hash);
        tracing::info!(user_id = %user_id, "user password updated");
        Ok(())
    }

    /// Update the user's email.
    pub async fn update_user_email(
        &self,
        user_id: Uuid,
        email: Option<String>,
    ) -> Result<(), ServiceError> {
        let mut row = self
            .tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;
        row.email = email;
        Ok(())
    }

    /// Point the user at a default tenant (must exist), or clear it.
    pub async fn update_user_default_tenant(
        &self,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        if let Some(tenant_id) = tenant_id {
            if !self.tables.tenants.contains_key(&tenant_id) {
                return Err(ServiceError::not_found("tenant", tenant_id));
            }
        }
        let mut row = self
            .tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;
        row.default_tenant_id = tenant_id;
        Ok(())
    }

    // ==================== Tenant Operations ====================

    /// Insert a new tenant, enforcing name and uid uniqueness.
    pub async fn create_tenant(&self, tenant: Tenant) -> Result<Tenant, ServiceError> {
        let t = &self.tables;
        claim(&t.tenants_by_name, tenant.name.clone(), tenant.tenant_id, || {
            format!("tenant name '{}' already exists", tenant.name)
        })?;
        if let Err(err) = claim(&t.tenants_by_uid, tenant.uid.clone(), tenant.tenant_id, || {
            format!("tenant uid '{}' already exists", tenant.uid)
        }) {
            t.tenants_by_name.remove(&tenant.name);
            return Err(err);
        }
        t.tenants.insert(tenant.tenant_id, tenant.clone());
        tracing::info!(tenant_id = %tenant.tenant_id, name = %tenant.name, "tenant created");
        Ok(tenant)
    }

    /// Fetch a tenant by id.
    pub async fn get_tenant(&self, tenant_id: Uuid) -> Result<Tenant, ServiceError> {
        self.find_tenant(tenant_id)
            .await
            .ok_or_else(|| ServiceError::not_found("tenant", tenant_id))
    }

    /// Fetch a tenant by id, `None` if absent.
    pub async fn find_tenant(&self, tenant_id: Uuid) -> Option<Tenant> {
        self.tables.tenants.get(&tenant_id).map(|row| row.value().clone())
    }

    /// Fetch a tenant by unique name.
    pub async fn find_tenant_by_name(&self, name: &str) -> Option<Tenant> {
        let tenant_id = *self.tables.tenants_by_name.get(name)?;
        self.find_tenant(tenant_id).await
    }

    /// List all tenants.
    pub async fn list_tenants(&self) -> Vec<Tenant> {
        self.tables.tenants.iter().map(|r| r.value().clone()).collect()
    }

    /// Flip the enabled flag. Assignments scoped to a disabled tenant stay
    /// on record and go inert until it is re-enabled.
    pub async fn set_tenant_enabled(
        &self,
        tenant_id: Uuid,
        enabled: bool,
    ) -> Result<(), ServiceError> {
        let mut row = self
            .tables
            .tenants
            .get_mut(&tenant_id)
            .ok_or_else(|| ServiceError::not_found("tenant", tenant_id))?;
        row.enabled = enabled;
        tracing::info!(tenant_id = %tenant_id, enabled, "tenant enabled flag changed");
        Ok(())
    }

    /// Update the tenant's description.
    pub async fn update_tenant_description(
        &self,
        tenant_id: Uuid,
        description: Option<String>,
    ) -> Result<(), ServiceError> {
        let mut row = self
            .tables
            .tenants
            .get_mut(&tenant_id)
            .ok_or_else(|| ServiceError::not_found("tenant", tenant_id))?;
        row.description = description;
        Ok(())
    }

    // ==================== Role Operations ====================

    /// Insert a new role, enforcing (name, service) uniqueness.
    pub async fn create_role(&self, role: Role) -> Result<Role, ServiceError> {
        if let Some(service_id) = role.service_id {
            if !self.tables.services.contains_key(&service_id) {
                return Err(ServiceError::not_found("service", service_id));
            }
        }
        claim(
            &self.tables.roles_by_name,
            (role.name.clone(), role.service_id),
            role.role_id,
            || format!("role name '{}' already exists for this service", role.name),
        )?;
        self.tables.roles.insert(role.role_id, role.clone());
        tracing::info!(role_id = %role.role_id, name = %role.name, "role created");
        Ok(role)
    }

    /// Fetch a role by id.
    pub async fn get_role(&self, role_id: Uuid) -> Result<Role, ServiceError> {
        self.find_role(role_id)
            .await
            .ok_or_else(|| ServiceError::not_found("role", role_id))
    }

    /// Fetch a role by id, `None` if absent.
    pub async fn find_role(&self, role_id: Uuid) -> Option<Role> {
        self.tables.roles.get(&role_id).map(|row| row.value().clone())
    }

    /// List all roles.
    pub async fn list_roles(&self) -> Vec<Role> {
        self.tables.roles.iter().map(|r| r.value().clone()).collect()
    }

    // ==================== Service Operations ====================

    /// Insert a new service, enforcing name uniqueness.
    pub async fn create_service(&self, service: Service) -> Result<Service, ServiceError> {
        claim(
            &self.tables.services_by_name,
            service.name.clone(),
            service.service_id,
            || format!("service name '{}' already exists", service.name),
        )?;
        self.tables.services.insert(service.service_id, service.clone());
        tracing::info!(service_id = %service.service_id, name = %service.name, "service created");
        Ok(service)
    }

    /// Fetch a service by id.
    pub async fn get_service(&self, service_id: Uuid) -> Result<Service, ServiceError> {
        self.find_service(service_id)
            .await
            .ok_or_else(|| ServiceError::not_found("service", service_id))
    }

    /// Fetch a service by id, `None` if absent.
    pub async fn find_service(&self, service_id: Uuid) -> Option<Service> {
        self.tables.services.get(&service_id).map(|row| row.value().clone())
    }

    /// Fetch a service by unique name.
    pub async fn find_service_by_name(&self, name: &str) -> Option<Service> {
        let service_id = *self.tables.services_by_name.get(name)?;
        self.find_service(service_id).await
    }

    /// List all services.
    pub async fn list_services(&self) -> Vec<Service> {
        self.tables.services.iter().map(|r| r.value().clone()).collect()
    }

    // ==================== Endpoint Template Operations ====================

    /// Insert a new endpoint template (owning service must exist).
    pub async fn create_endpoint_template(
        &self,
        template: EndpointTemplate,
    ) -> Result<EndpointTemplate, ServiceError> {
        if !self.tables.services.contains_key(&template.service_id) {
            return Err(ServiceError::not_found("service", template.service_id));
        }
        self.tables
            .templates
            .insert(template.template_id, template.clone());
        tracing::info!(template_id = %template.template_id, region = %template.region, "endpoint template created");
        Ok(template)
    }

    /// Fetch a template by id.
    pub async fn get_endpoint_template(
        &self,
        template_id: Uuid,
    ) -> Result<EndpointTemplate, ServiceError> {
        self.tables
            .templates
            .get(&template_id)
            .map(|row| row.value().clone())
            .ok_or_else(|| ServiceError::not_found("endpoint template", template_id))
    }

    /// List all templates.
    pub async fn list_endpoint_templates(&self) -> Vec<EndpointTemplate> {
        self.tables.templates.iter().map(|r| r.value().clone()).collect()
    }

    /// Flip a template's enabled flag.
    pub async fn set_endpoint_template_enabled(
        &self,
        template_id: Uuid,
        enabled: bool,
    ) -> Result<(), ServiceError> {
        let mut row = self
            .tables
            .templates
            .get_mut(&template_id)
            .ok_or_else(|| ServiceError::not_found("endpoint template", template_id))?;
        row.enabled = enabled;
        Ok(())
    }

    // ==================== Endpoint Operations ====================

    /// Materialize a template for a tenant, enforcing (template, tenant)
    /// uniqueness.
    pub async fn create_endpoint(&self, endpoint: Endpoint) -> Result<Endpoint, ServiceError> {
        if !self.tables.templates.contains_key(&endpoint.template_id) {
            return Err(ServiceError::not_found(
                "endpoint template",
                endpoint.template_id,
            ));
        }
        if !self.tables.tenants.contains_key(&endpoint.tenant_id) {
            return Err(ServiceError::not_found("tenant", endpoint.tenant_id));
        }
        claim(
            &self.tables.endpoints_by_binding,
            (endpoint.template_id, endpoint.tenant_id),
            endpoint.endpoint_id,
            || "endpoint already materialized for this template and tenant".to_string(),
        )?;
        self.tables
            .endpoints
            .insert(endpoint.endpoint_id, endpoint.clone());
        Ok(endpoint)
    }

    /// The endpoint binding a template to a tenant, if one exists.
    pub async fn find_endpoint_for(&self, template_id: Uuid, tenant_id: Uuid) -> Option<Endpoint> {
        let endpoint_id = *self
            .tables
            .endpoints_by_binding
            .get(&(template_id, tenant_id))?;
        self.tables.endpoints.get(&endpoint_id).map(|r| r.value().clone())
    }

    /// All endpoint bindings materialized for a tenant.
    pub async fn endpoints_for_tenant(&self, tenant_id: Uuid) -> Vec<Endpoint> {
        self.tables
            .endpoints
            .iter()
            .filter(|row| row.tenant_id == tenant_id)
            .map(|row| row.value().clone())
            .collect()
    }

    // ==================== Credential Operations ====================

    /// Insert a credential row for a user (user and tenant scope must exist).
    pub async fn add_credential(&self, credential: Credential) -> Result<Credential, ServiceError> {
        if !self.tables.users.contains_key(&credential.user_id) {
            return Err(ServiceError::not_found("user", credential.user_id));
        }
        if let Some(tenant_id) = credential.tenant_id {
            if !self.tables.tenants.contains_key(&tenant_id) {
                return Err(ServiceError::not_found("tenant", tenant_id));
            }
        }
        self.tables
            .credentials
            .insert(credential.credential_id, credential.clone());
        tracing::info!(
            user_id = %credential.user_id,
            kind = credential.kind.as_str(),
            "credential added"
        );
        Ok(credential)
    }

    /// All credentials of a kind held by a user.
    pub async fn credentials_for_user(&self, user_id: Uuid, kind: CredentialKind) -> Vec<Credential> {
        self.tables
            .credentials
            .iter()
            .filter(|row| row.user_id == user_id && row.kind == kind)
            .map(|row| row.value().clone())
            .collect()
    }

    /// Remove a credential row.
    pub async fn delete_credential(&self, credential_id: Uuid) -> Result<(), ServiceError> {
        self.tables
            .credentials
            .remove(&credential_id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("credential", credential_id))
    }

    // ==================== Assignment Operations ====================

    /// Validate that a grant's role and scope tenant exist.
    pub(crate) fn check_grant_targets(
        &self,
        role_id: Uuid,
        scope: RoleScope,
    ) -> Result<(), ServiceError> {
        if !self.tables.roles.contains_key(&role_id) {
            return Err(ServiceError::not_found("role", role_id));
        }
        if let Some(tenant_id) = scope.tenant_id() {
            if !self.tables.tenants.contains_key(&tenant_id) {
                return Err(ServiceError::not_found("tenant", tenant_id));
            }
        }
        Ok(())
    }

    /// Insert an assignment row. Returns false if the triple already exists.
    pub async fn insert_assignment(&self, assignment: RoleAssignment) -> bool {
        let key = (assignment.user_id, assignment.role_id, assignment.scope);
        match self.tables.assignments.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(assignment);
                true
            }
        }
    }

    /// Remove an assignment row. Returns false if it was not present.
    pub async fn remove_assignment(&self, key: &AssignmentKey) -> bool {
        self.tables.assignments.remove(key).is_some()
    }

    /// All assignment rows for a user, in no particular order.
    pub async fn assignments_for_user(&self, user_id: Uuid) -> Vec<RoleAssignment> {
        self.tables
            .assignments
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| row.value().clone())
            .collect()
    }

    // ==================== Token Operations ====================

    /// Insert a token row, enforcing global id uniqueness.
    pub async fn insert_token(&self, token: Token) -> Result<Token, ServiceError> {
        match self.tables.tokens.entry(token.id.clone()) {
            Entry::Occupied(_) => Err(ServiceError::conflict("token id already exists")),
            Entry::Vacant(slot) => {
                slot.insert(token.clone());
                Ok(token)
            }
        }
    }

    /// Fetch a token row by bearer id.
    pub async fn find_token(&self, token_id: &str) -> Option<Token> {
        self.tables.tokens.get(token_id).map(|row| row.value().clone())
    }

    /// Remove a token row, returning it if it was present.
    pub async fn remove_token(&self, token_id: &str) -> Option<Token> {
        self.tables.tokens.remove(token_id).map(|(_, token)| token)
    }

    /// Drop every token expired at `now`. Returns the number removed.
    pub async fn remove_expired_tokens(&self, now: DateTime<Utc>) -> usize {
        let before = self.tables.tokens.len();
        self.tables
            .tokens
            .retain(|_, token| !token.is_expired_at(now));
        before.saturating_sub(self.tables.tokens.len())
    }
}
