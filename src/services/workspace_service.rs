// src/services/workspace_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    authz::tenant::TenantScope,
    common::error::AppError,
    db::{RbacRepository, WorkspaceRepository},
    models::{
        auth::Actor,
        rbac::PermissionScope,
        workspace::{
            CreateProjectPayload, CreateSubTaskPayload, CreateTaskPayload, CreateWorkspacePayload, Project, SubTask,
            Task, TaskStatus, Workspace,
        },
    },
};

/// Papel criado junto com cada workspace e dado a quem o criou.
pub const WORKSPACE_ADMIN_ROLE: &str = "workspace-admin";

// As rotas que chegam aqui já passaram pelo HierarchyAuthorizer:
// os ids recebidos pertencem uns aos outros e à empresa do usuário.
#[derive(Clone)]
pub struct WorkspaceService {
    repo: WorkspaceRepository,
    rbac_repo: RbacRepository,
    pool: PgPool,
}

impl WorkspaceService {
    pub fn new(repo: WorkspaceRepository, rbac_repo: RbacRepository, pool: PgPool) -> Self {
        Self { repo, rbac_repo, pool }
    }

    pub async fn list_workspaces(&self, scope: &TenantScope) -> Result<Vec<Workspace>, AppError> {
        self.repo.list_workspaces(scope.company_id()).await
    }

    /// Cria o workspace, o papel `workspace-admin` com todas as permissões de
    /// escopo workspace e atribui esse papel ao criador. Tudo ou nada.
    pub async fn create_workspace(
        &self,
        actor: &Actor,
        scope: &TenantScope,
        payload: &CreateWorkspacePayload,
    ) -> Result<Workspace, AppError> {
        let company_id = match scope {
            TenantScope::Company(company) => company.id,
            TenantScope::Unrestricted => payload
                .company_id
                .ok_or_else(|| AppError::field("company_id", "required", "Informe a empresa do workspace."))?,
        };

        let mut tx = self.pool.begin().await?;

        let workspace = self
            .repo
            .create_workspace(&mut *tx, company_id, payload.name.trim(), payload.description.as_deref())
            .await
            .map_err(|e| match e {
                AppError::DatabaseError(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                    AppError::field("company_id", "exists", "A empresa informada não existe.")
                }
                other => other,
            })?;

        let role = self
            .rbac_repo
            .create_role(&mut *tx, WORKSPACE_ADMIN_ROLE, Some(company_id), Some(workspace.id))
            .await?;

        let permission_ids = self
            .rbac_repo
            .find_permission_ids_by_scope(&mut *tx, PermissionScope::Workspace)
            .await?;
        if !permission_ids.is_empty() {
            self.rbac_repo.assign_permissions(&mut *tx, role.id, &permission_ids).await?;
        }

        self.rbac_repo.assign_role(&mut *tx, actor.id(), role.id).await?;

        tx.commit().await?;

        tracing::info!(workspace_id = %workspace.id, company_id = %company_id, "Workspace criado");
        Ok(workspace)
    }

    pub async fn get_workspace(&self, id: Uuid) -> Result<Workspace, AppError> {
        self.repo.find_workspace(id).await?.ok_or(AppError::ResourceNotFound)
    }

    // ---
    // Projetos
    // ---

    pub async fn list_projects(&self, workspace_id: Uuid) -> Result<Vec<Project>, AppError> {
        self.repo.list_projects(workspace_id).await
    }

    pub async fn create_project(&self, workspace_id: Uuid, payload: &CreateProjectPayload) -> Result<Project, AppError> {
        self.repo
            .create_project(workspace_id, payload.name.trim(), payload.description.as_deref())
            .await
    }

    // ---
    // Tarefas
    // ---

    pub async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<Task>, AppError> {
        self.repo.list_tasks(project_id).await
    }

    pub async fn create_task(&self, actor: &Actor, project_id: Uuid, payload: &CreateTaskPayload) -> Result<Task, AppError> {
        self.repo
            .create_task(
                project_id,
                payload.title.trim(),
                payload.description.as_deref(),
                payload.status.unwrap_or(TaskStatus::Todo),
                payload.due_date,
                actor.id(),
            )
            .await
    }

    pub async fn get_task(&self, task_id: Uuid) -> Result<(Task, Vec<SubTask>), AppError> {
        let task = self.repo.find_task(task_id).await?.ok_or(AppError::ResourceNotFound)?;
        let sub_tasks = self.repo.list_sub_tasks(task.id).await?;
        Ok((task, sub_tasks))
    }

    // ---
    // Subtarefas
    // ---

    pub async fn create_sub_task(&self, project_id: Uuid, task_id: Uuid, payload: &CreateSubTaskPayload) -> Result<SubTask, AppError> {
        self.repo.create_sub_task(task_id, project_id, payload.title.trim()).await
    }

    /// Alterna a conclusão. `completed_by` acompanha: quem concluiu, ou nulo ao reabrir.
    pub async fn toggle_sub_task(&self, actor: &Actor, sub_task_id: Uuid) -> Result<SubTask, AppError> {
        let mut tx = self.pool.begin().await?;

        let sub_task = self
            .repo
            .find_sub_task_for_update(&mut *tx, sub_task_id)
            .await?
            .ok_or(AppError::ResourceNotFound)?;

        let (is_completed, completed_by) = sub_task.toggled_by(actor.id());
        let updated = self
            .repo
            .set_sub_task_completion(&mut *tx, sub_task.id, is_completed, completed_by)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_sub_task(&self, sub_task_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_sub_task(sub_task_id).await? {
            return Err(AppError::ResourceNotFound);
        }
        Ok(())
    }
}
