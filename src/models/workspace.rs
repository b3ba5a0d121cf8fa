// src/models/workspace.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::UnknownVariant;

// ---
// Cadeia de posse: Workspace -> Project -> Task -> SubTask
// ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub company_id: Uuid,

    #[schema(example = "Operações")]
    pub name: String,

    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub workspace_id: Uuid,

    #[schema(example = "Implantação Cliente X")]
    pub name: String,

    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(UnknownVariant(value)),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,

    #[schema(example = "Configurar ambiente")]
    pub title: String,

    pub description: Option<String>,

    #[sqlx(try_from = "String")]
    pub status: TaskStatus,

    pub due_date: Option<NaiveDate>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: Uuid,
    pub task_id: Uuid,

    // Cópia desnormalizada do projeto da tarefa
    pub project_id: Uuid,

    #[schema(example = "Criar usuário no servidor")]
    pub title: String,

    pub is_completed: bool,

    // Quem concluiu; nulo enquanto estiver aberta
    pub completed_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tarefa com as subtarefas (GET de uma tarefa).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub sub_tasks: Vec<SubTask>,
}

impl SubTask {
    /// Estado após alternar a conclusão: (is_completed, completed_by).
    pub fn toggled_by(&self, actor_id: Uuid) -> (bool, Option<Uuid>) {
        if self.is_completed {
            (false, None)
        } else {
            (true, Some(actor_id))
        }
    }
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspacePayload {
    #[validate(length(min = 1, max = 150, message = "O nome do workspace é obrigatório."))]
    #[schema(example = "Operações")]
    pub name: String,

    pub description: Option<String>,

    // Só o super-admin escolhe a empresa; os demais usam a própria
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    #[validate(length(min = 1, max = 150, message = "O nome do projeto é obrigatório."))]
    pub name: String,

    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[validate(length(min = 1, max = 255, message = "O título da tarefa é obrigatório."))]
    pub title: String,

    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubTaskPayload {
    #[validate(length(min = 1, max = 255, message = "O título da subtarefa é obrigatório."))]
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub_task() -> SubTask {
        SubTask {
            id: Uuid::from_u128(2),
            task_id: Uuid::from_u128(7),
            project_id: Uuid::from_u128(3),
            title: "Checklist".into(),
            is_completed: false,
            completed_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn toggling_twice_reopens_and_clears_completer() {
        let actor = Uuid::from_u128(42);
        let mut st = sub_task();

        let (done, by) = st.toggled_by(actor);
        assert!(done);
        assert_eq!(by, Some(actor));
        st.is_completed = done;
        st.completed_by = by;

        let (done, by) = st.toggled_by(actor);
        assert!(!done);
        assert_eq!(by, None);
    }
}
