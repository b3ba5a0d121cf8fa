// src/db/hierarchy_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    authz::hierarchy::{Node, ResourceKind},
    common::error::AppError,
};

/// Carrega só as chaves (id + referências aos pais) de cada recurso.
#[derive(Clone)]
pub struct HierarchyRepository {
    pool: PgPool,
}

impl HierarchyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn load_node(&self, kind: ResourceKind, id: Uuid) -> Result<Option<Node>, AppError> {
        let node = match kind {
            ResourceKind::Company => sqlx::query_scalar::<_, Uuid>("SELECT id FROM companies WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .map(|id| Node::new(kind, id)),

            ResourceKind::Workspace => self
                .single_parent("SELECT id, company_id FROM workspaces WHERE id = $1", id)
                .await?
                .map(|(id, company)| Node::new(kind, id).with_parent(ResourceKind::Company, company)),

            ResourceKind::Project => self
                .single_parent("SELECT id, workspace_id FROM projects WHERE id = $1", id)
                .await?
                .map(|(id, ws)| Node::new(kind, id).with_parent(ResourceKind::Workspace, ws)),

            ResourceKind::Task => self
                .single_parent("SELECT id, project_id FROM tasks WHERE id = $1", id)
                .await?
                .map(|(id, project)| Node::new(kind, id).with_parent(ResourceKind::Project, project)),

            ResourceKind::SubTask => {
                sqlx::query_as::<_, (Uuid, Uuid, Uuid)>("SELECT id, task_id, project_id FROM sub_tasks WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
                    .map(|(id, task, project)| {
                        Node::new(kind, id)
                            .with_parent(ResourceKind::Task, task)
                            .with_parent(ResourceKind::Project, project)
                    })
            }

            ResourceKind::Timesheet => self
                .single_parent("SELECT id, workspace_id FROM timesheets WHERE id = $1", id)
                .await?
                .map(|(id, ws)| Node::new(kind, id).with_parent(ResourceKind::Workspace, ws)),

            ResourceKind::TimesheetEntry => self
                .single_parent("SELECT id, timesheet_id FROM timesheet_entries WHERE id = $1", id)
                .await?
                .map(|(id, ts)| Node::new(kind, id).with_parent(ResourceKind::Timesheet, ts)),
        };

        Ok(node)
    }

    async fn single_parent(&self, sql: &'static str, id: Uuid) -> Result<Option<(Uuid, Uuid)>, AppError> {
        let row = sqlx::query_as::<_, (Uuid, Uuid)>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
