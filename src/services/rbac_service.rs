// src/services/rbac_service.rs

use sqlx::PgPool;
use std::{collections::HashSet, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    authz::{
        gate::{is_reserved_role_name, Grants},
        matcher::PermissionMatcher,
        tenant::TenantScope,
    },
    common::error::AppError,
    db::{RbacRepository, UserRepository, WorkspaceRepository},
    models::{
        auth::Actor,
        rbac::{CreateRolePayload, Permission, PermissionPayload, Role, RoleResponse},
    },
    services::tenancy_service::TenantService,
};

/// Foto compilada do catálogo de permissões, trocada inteira a cada escrita.
#[derive(Clone, Default)]
pub struct PermissionRegistry {
    matcher: Arc<RwLock<Arc<PermissionMatcher>>>,
}

impl PermissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<PermissionMatcher> {
        self.matcher.read().await.clone()
    }

    pub async fn replace(&self, permissions: Vec<Permission>) {
        let count = permissions.len();
        let compiled = Arc::new(PermissionMatcher::build(permissions));
        *self.matcher.write().await = compiled;
        tracing::info!("Catálogo de permissões carregado ({} permissões)", count);
    }

    pub async fn reload(&self, repo: &RbacRepository) -> Result<(), AppError> {
        let permissions = repo.list_permissions().await?;
        self.replace(permissions).await;
        Ok(())
    }
}

#[derive(Clone)]
pub struct RbacService {
    repo: RbacRepository,
    user_repo: UserRepository,
    workspace_repo: WorkspaceRepository,
    tenants: TenantService,
    registry: PermissionRegistry,
    pool: PgPool,
}

impl RbacService {
    pub fn new(
        repo: RbacRepository,
        user_repo: UserRepository,
        workspace_repo: WorkspaceRepository,
        tenants: TenantService,
        registry: PermissionRegistry,
        pool: PgPool,
    ) -> Self {
        Self { repo, user_repo, workspace_repo, tenants, registry, pool }
    }

    // ---
    // Catálogo
    // ---

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        self.repo.list_permissions().await
    }

    pub async fn create_permission(&self, payload: &PermissionPayload) -> Result<Permission, AppError> {
        let permission = self.repo.create_permission(payload).await?;
        self.registry.reload(&self.repo).await?;
        tracing::info!(permission = %permission.name, "Permissão criada");
        Ok(permission)
    }

    pub async fn update_permission(&self, id: Uuid, payload: &PermissionPayload) -> Result<Permission, AppError> {
        let permission = self
            .repo
            .update_permission(id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound)?;
        self.registry.reload(&self.repo).await?;
        tracing::info!(permission = %permission.name, "Permissão atualizada");
        Ok(permission)
    }

    // ---
    // Papéis
    // ---

    pub async fn list_roles(&self, scope: &TenantScope) -> Result<Vec<Role>, AppError> {
        self.repo.list_roles(scope.company_id()).await
    }

    /// Cria o papel na empresa do usuário (global, se super-admin sem empresa)
    /// já com as permissões, numa única transação.
    ///
    /// Fora do super-admin, o papel só pode carregar permissões que o próprio
    /// usuário já tem no escopo do papel.
    pub async fn create_role(
        &self,
        actor: &Actor,
        scope: &TenantScope,
        payload: &CreateRolePayload,
    ) -> Result<RoleResponse, AppError> {
        let company_id = scope.company_id();

        if is_reserved_role_name(&payload.name) {
            return Err(AppError::field("name", "reserved", "Este nome de cargo é reservado."));
        }

        if let Some(workspace_id) = payload.workspace_id {
            let workspace = self
                .workspace_repo
                .find_workspace(workspace_id)
                .await?
                .ok_or(AppError::ResourceNotFound)?;
            scope.ensure_owns(workspace.company_id)?;
        }

        let requested: HashSet<&str> = payload.permissions.iter().map(String::as_str).collect();

        let permissions = self.repo.find_permissions_by_names(&self.pool, &payload.permissions).await?;
        if permissions.len() != requested.len() {
            let known: HashSet<&str> = permissions.iter().map(|p| p.name.as_str()).collect();
            let unknown: Vec<&str> = requested.difference(&known).copied().collect();
            tracing::debug!("Permissões desconhecidas: {:?}", unknown);
            return Err(AppError::field("permissions", "unknown", "Uma ou mais permissões não existem."));
        }

        if !actor.is_super_admin && company_id.is_some() {
            let held = Grants::from_rows(self.repo.grant_rows(actor.id()).await?, company_id, payload.workspace_id);
            if let Some(missing) = permissions.iter().find(|p| !held.permission_ids.contains(&p.id)) {
                return Err(AppError::PermissionDenied(missing.name.clone()));
            }
        }

        let mut tx = self.pool.begin().await?;

        let role = self
            .repo
            .create_role(&mut *tx, payload.name.trim(), company_id, payload.workspace_id)
            .await?;

        let permission_ids: Vec<Uuid> = permissions.iter().map(|p| p.id).collect();
        if !permission_ids.is_empty() {
            self.repo.assign_permissions(&mut *tx, role.id, &permission_ids).await?;
        }

        tx.commit().await?;

        tracing::info!(role_id = %role.id, "Cargo criado com {} permissões", permission_ids.len());
        Ok(RoleResponse {
            role,
            permissions: permissions.into_iter().map(|p| p.name).collect(),
        })
    }

    /// Atribui um papel a um usuário da mesma empresa.
    /// Fora do super-admin, só papéis da própria empresa podem ser atribuídos.
    pub async fn assign_role(&self, scope: &TenantScope, role_id: Uuid, user_id: Uuid) -> Result<RoleResponse, AppError> {
        let role = self.repo.find_role(role_id).await?.ok_or(AppError::ResourceNotFound)?;

        if let TenantScope::Company(company) = scope {
            if role.company_id != Some(company.id) {
                return Err(AppError::ResourceNotFound);
            }

            let user = self.user_repo.find_by_id(user_id).await?.ok_or(AppError::ResourceNotFound)?;
            let user_company = self.tenants.find_company(&user).await?;
            if user_company.map(|c| c.id) != Some(company.id) {
                return Err(AppError::ResourceNotFound);
            }
        } else if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(AppError::ResourceNotFound);
        }

        self.repo.assign_role(&self.pool, user_id, role.id).await?;
        let permissions = self.repo.permission_names_for_role(role.id).await?;

        tracing::info!(role_id = %role.id, user_id = %user_id, "Cargo atribuído");
        Ok(RoleResponse { role, permissions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::matcher::tests::permission;

    #[tokio::test]
    async fn registry_swaps_snapshot_on_replace() {
        let registry = PermissionRegistry::new();
        let before = registry.snapshot().await;
        assert!(before.find_guarding_permission(Some("tasks.index")).is_none());

        registry
            .replace(vec![permission(1, "tasks.view", Some("tasks.index"), None)])
            .await;

        // A foto antiga continua válida para quem já a segurava
        assert!(before.find_guarding_permission(Some("tasks.index")).is_none());
        assert!(registry.snapshot().await.find_guarding_permission(Some("tasks.index")).is_some());
    }
}
