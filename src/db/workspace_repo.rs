// src/db/workspace_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::workspace::{Project, SubTask, Task, TaskStatus, Workspace},
};

const TASK_COLUMNS: &str = "id, project_id, title, description, status, due_date, created_by, created_at, updated_at";
const SUB_TASK_COLUMNS: &str = "id, task_id, project_id, title, is_completed, completed_by, created_at, updated_at";

// Workspaces, projetos, tarefas e subtarefas.
// Nenhum método aqui checa hierarquia: isso é feito antes, pelo HierarchyAuthorizer.
#[derive(Clone)]
pub struct WorkspaceRepository {
    pool: PgPool,
}

impl WorkspaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Workspaces
    // ---

    /// `None` lista todos (super-admin).
    pub async fn list_workspaces(&self, company_id: Option<Uuid>) -> Result<Vec<Workspace>, AppError> {
        let workspaces = sqlx::query_as::<_, Workspace>(
            r#"
            SELECT id, company_id, name, description, created_at, updated_at
            FROM workspaces
            WHERE $1::uuid IS NULL OR company_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(workspaces)
    }

    pub async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, AppError> {
        let workspace = sqlx::query_as::<_, Workspace>(
            "SELECT id, company_id, name, description, created_at, updated_at FROM workspaces WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(workspace)
    }

    pub async fn create_workspace<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Workspace, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (company_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, company_id, name, description, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await?;
        Ok(workspace)
    }

    // ---
    // Projetos
    // ---

    pub async fn list_projects(&self, workspace_id: Uuid) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, workspace_id, name, description, created_at, updated_at
            FROM projects
            WHERE workspace_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    pub async fn create_project(&self, workspace_id: Uuid, name: &str, description: Option<&str>) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (workspace_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, workspace_id, name, description, created_at, updated_at
            "#,
        )
        .bind(workspace_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(project)
    }

    // ---
    // Tarefas
    // ---

    pub async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE project_id = $1 ORDER BY created_at, id",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    pub async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn task_in_workspace(&self, task_id: Uuid, workspace_id: Uuid) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM tasks t
                JOIN projects p ON p.id = t.project_id
                WHERE t.id = $1 AND p.workspace_id = $2
            )
            "#,
        )
        .bind(task_id)
        .bind(workspace_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    pub async fn create_task(
        &self,
        project_id: Uuid,
        title: &str,
        description: Option<&str>,
        status: TaskStatus,
        due_date: Option<chrono::NaiveDate>,
        created_by: Uuid,
    ) -> Result<Task, AppError> {
        let sql = format!(
            r#"
            INSERT INTO tasks (project_id, title, description, status, due_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(project_id)
            .bind(title)
            .bind(description)
            .bind(status.as_str())
            .bind(due_date)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    // ---
    // Subtarefas
    // ---

    pub async fn list_sub_tasks(&self, task_id: Uuid) -> Result<Vec<SubTask>, AppError> {
        let sql = format!(
            "SELECT {} FROM sub_tasks WHERE task_id = $1 ORDER BY created_at, id",
            SUB_TASK_COLUMNS
        );
        let sub_tasks = sqlx::query_as::<_, SubTask>(&sql)
            .bind(task_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(sub_tasks)
    }

    pub async fn create_sub_task(&self, task_id: Uuid, project_id: Uuid, title: &str) -> Result<SubTask, AppError> {
        let sql = format!(
            "INSERT INTO sub_tasks (task_id, project_id, title) VALUES ($1, $2, $3) RETURNING {}",
            SUB_TASK_COLUMNS
        );
        let sub_task = sqlx::query_as::<_, SubTask>(&sql)
            .bind(task_id)
            .bind(project_id)
            .bind(title)
            .fetch_one(&self.pool)
            .await?;
        Ok(sub_task)
    }

    pub async fn find_sub_task_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<SubTask>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM sub_tasks WHERE id = $1 FOR UPDATE", SUB_TASK_COLUMNS);
        let sub_task = sqlx::query_as::<_, SubTask>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sub_task)
    }

    pub async fn set_sub_task_completion<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_completed: bool,
        completed_by: Option<Uuid>,
    ) -> Result<SubTask, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE sub_tasks
            SET is_completed = $2, completed_by = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SUB_TASK_COLUMNS
        );
        let sub_task = sqlx::query_as::<_, SubTask>(&sql)
            .bind(id)
            .bind(is_completed)
            .bind(completed_by)
            .fetch_one(executor)
            .await?;
        Ok(sub_task)
    }

    pub async fn delete_sub_task(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sub_tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
