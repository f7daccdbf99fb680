//! Role-assignment index - resolves user/tenant/role grants.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{Role, RoleAssignment, RoleScope};
use crate::services::{EntityStore, ServiceError};

/// Answers "which roles does this user hold in this tenant?" and owns the
/// grant/revoke mutations behind that question.
#[derive(Clone)]
pub struct RoleIndex {
    store: EntityStore,
}

impl RoleIndex {
    pub fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// Grant a role to a user in the given scope.
    ///
    /// Idempotent: granting an already-held role is a no-op, not an error.
    pub async fn grant(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        scope: RoleScope,
    ) -> Result<(), ServiceError> {
        self.store.get_user(user_id).await?;
        self.store.check_grant_targets(role_id, scope)?;

        let inserted = self
            .store
            .insert_assignment(RoleAssignment::new(user_id, role_id, scope))
            .await;
        if inserted {
            tracing::info!(user_id = %user_id, role_id = %role_id, scope = ?scope, "role granted");
        }
        Ok(())
    }

    /// Revoke a role grant.
    ///
    /// Idempotent: revoking an absent grant is a no-op.
    pub async fn revoke(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        scope: RoleScope,
    ) -> Result<(), ServiceError> {
        self.store.get_user(user_id).await?;

        let removed = self
            .store
            .remove_assignment(&(user_id, role_id, scope))
            .await;
        if removed {
            tracing::info!(user_id = %user_id, role_id = %role_id, scope = ?scope, "role revoked");
        }
        Ok(())
    }

    /// All assignment rows for a user, scoped and global alike.
    pub async fn list_assignments(&self, user_id: Uuid) -> Result<Vec<RoleAssignment>, ServiceError> {
        self.store.get_user(user_id).await?;
        Ok(self.store.assignments_for_user(user_id).await)
    }

    /// The effective role set for a user acting within a tenant: the union
    /// of tenant-scoped grants and global grants, deduplicated by role id.
    ///
    /// Set semantics; the returned order is unspecified. Grants scoped to a
    /// disabled tenant are inert and do not contribute.
    pub async fn effective_roles(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Vec<Role>, ServiceError> {
        self.store.get_user(user_id).await?;
        let tenant = self.store.get_tenant(tenant_id).await?;

        let mut role_ids = HashSet::new();
        for assignment in self.store.assignments_for_user(user_id).await {
            match assignment.scope {
                RoleScope::Global => {
                    role_ids.insert(assignment.role_id);
                }
                RoleScope::Tenant(scoped) if scoped == tenant_id && tenant.enabled => {
                    role_ids.insert(assignment.role_id);
                }
                RoleScope::Tenant(_) => {}
            }
        }

        let mut roles = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            if let Some(role) = self.store.find_role(role_id).await {
                roles.push(role);
            }
        }
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, Tenant, User};

    async fn fixture() -> (RoleIndex, EntityStore, User, Tenant, Role) {
        let store = EntityStore::new();
        let index = RoleIndex::new(store.clone());
        let user = store.create_user(User::new("alice", None)).await.unwrap();
        let tenant = store
            .create_tenant(Tenant::new("acme", None))
            .await
            .unwrap();
        let role = store
            .create_role(Role::new("member", None, None))
            .await
            .unwrap();
        (index, store, user, tenant, role)
    }

    #[tokio::test]
    async fn granting_twice_stores_one_assignment() {
        let (index, store, user, tenant, role) = fixture().await;
        let scope = RoleScope::Tenant(tenant.tenant_id);

        index.grant(user.user_id, role.role_id, scope).await.unwrap();
        index.grant(user.user_id, role.role_id, scope).await.unwrap();

        assert_eq!(store.assignments_for_user(user.user_id).await.len(), 1);
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let (index, store, user, tenant, role) = fixture().await;
        let scope = RoleScope::Tenant(tenant.tenant_id);

        index.grant(user.user_id, role.role_id, scope).await.unwrap();
        index
            .revoke(user.user_id, role.role_id, scope)
            .await
            .unwrap();
        index
            .revoke(user.user_id, role.role_id, scope)
            .await
            .unwrap();

        assert!(store.assignments_for_user(user.user_id).await.is_empty());
    }

    #[tokio::test]
    async fn effective_roles_unions_scoped_and_global_grants() {
        let (index, store, user, tenant, role) = fixture().await;
        let global_role = store
            .create_role(Role::new("auditor", None, None))
            .await
            .unwrap();
        let other_tenant = store
            .create_tenant(Tenant::new("globex", None))
            .await
            .unwrap();
        let other_role = store
            .create_role(Role::new("operator", None, None))
            .await
            .unwrap();

        index
            .grant(user.user_id, role.role_id, RoleScope::Tenant(tenant.tenant_id))
            .await
            .unwrap();
        index
            .grant(user.user_id, global_role.role_id, RoleScope::Global)
            .await
            .unwrap();
        index
            .grant(
                user.user_id,
                other_role.role_id,
                RoleScope::Tenant(other_tenant.tenant_id),
            )
            .await
            .unwrap();

        let names: HashSet<String> = index
            .effective_roles(user.user_id, tenant.tenant_id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(
            names,
            HashSet::from(["member".to_string(), "auditor".to_string()])
        );
    }

    #[tokio::test]
    async fn effective_roles_ignore_insertion_order() {
        let (index, store, user, tenant, role) = fixture().await;
        let second = store
            .create_role(Role::new("auditor", None, None))
            .await
            .unwrap();

        index
            .grant(user.user_id, second.role_id, RoleScope::Global)
            .await
            .unwrap();
        index
            .grant(user.user_id, role.role_id, RoleScope::Tenant(tenant.tenant_id))
            .await
            .unwrap();

        let forward: HashSet<Uuid> = index
            .effective_roles(user.user_id, tenant.tenant_id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.role_id)
            .collect();

        index
            .revoke(user.user_id, second.role_id, RoleScope::Global)
            .await
            .unwrap();
        index
            .revoke(user.user_id, role.role_id, RoleScope::Tenant(tenant.tenant_id))
            .await
            .unwrap();
        index
            .grant(user.user_id, role.role_id, RoleScope::Tenant(tenant.tenant_id))
            .await
            .unwrap();
        index
            .grant(user.user_id, second.role_id, RoleScope::Global)
            .await
            .unwrap();

        let reversed: HashSet<Uuid> = index
            .effective_roles(user.user_id, tenant.tenant_id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.role_id)
            .collect();

        assert_eq!(forward, reversed);
    }

    #[tokio::test]
    async fn disabled_tenant_makes_scoped_grants_inert() {
        let (index, store, user, tenant, role) = fixture().await;
        let global_role = store
            .create_role(Role::new("auditor", None, None))
            .await
            .unwrap();

        index
            .grant(user.user_id, role.role_id, RoleScope::Tenant(tenant.tenant_id))
            .await
            .unwrap();
        index
            .grant(user.user_id, global_role.role_id, RoleScope::Global)
            .await
            .unwrap();

        store
            .set_tenant_enabled(tenant.tenant_id, false)
            .await
            .unwrap();
        let names: Vec<String> = index
            .effective_roles(user.user_id, tenant.tenant_id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["auditor".to_string()]);

        // Inert, not deleted: re-enabling restores the scoped grant.
        store
            .set_tenant_enabled(tenant.tenant_id, true)
            .await
            .unwrap();
        assert_eq!(
            index
                .effective_roles(user.user_id, tenant.tenant_id)
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (index, _store, _user, tenant, _role) = fixture().await;
        let err = index
            .effective_roles(Uuid::new_v4(), tenant.tenant_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { kind: "user", .. }));
    }

    #[tokio::test]
    async fn grant_against_unknown_tenant_is_not_found() {
        let (index, _store, user, _tenant, role) = fixture().await;
        let err = index
            .grant(user.user_id, role.role_id, RoleScope::Tenant(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { kind: "tenant", .. }));
    }
}
