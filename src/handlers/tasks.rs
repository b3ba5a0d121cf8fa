// src/handlers/tasks.rs
//
// Tudo aqui fica sob /workspaces/{workspace}/projects/{project}: antes de
// qualquer coisa a cadeia de ids da URL passa pelo HierarchyAuthorizer.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    authz::{ResourceKind, ResourcePath},
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::Actor,
        workspace::{CreateSubTaskPayload, CreateTaskPayload, SubTask, Task, TaskDetail},
    },
};

fn project_path(workspace_id: Uuid, project_id: Uuid) -> ResourcePath {
    ResourcePath::workspace(workspace_id).then(ResourceKind::Project, project_id)
}

fn task_path(workspace_id: Uuid, project_id: Uuid, task_id: Uuid) -> ResourcePath {
    project_path(workspace_id, project_id).then(ResourceKind::Task, task_id)
}

#[utoipa::path(
    get,
    path = "/api/workspaces/{workspace}/projects/{project}/tasks",
    tag = "Tasks",
    params(
        ("workspace" = Uuid, Path, description = "ID do workspace"),
        ("project" = Uuid, Path, description = "ID do projeto")
    ),
    responses((status = 200, description = "Tarefas do projeto", body = Vec<Task>)),
    security(("api_jwt" = []))
)]
pub async fn index(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path((workspace_id, project_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .hierarchy
        .authorize(&actor, &project_path(workspace_id, project_id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let tasks = app_state
        .workspace_service
        .list_tasks(project_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(tasks)))
}

#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace}/projects/{project}/tasks",
    tag = "Tasks",
    request_body = CreateTaskPayload,
    params(
        ("workspace" = Uuid, Path, description = "ID do workspace"),
        ("project" = Uuid, Path, description = "ID do projeto")
    ),
    responses((status = 201, description = "Tarefa criada", body = Task)),
    security(("api_jwt" = []))
)]
pub async fn store(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path((workspace_id, project_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    app_state
        .hierarchy
        .authorize(&actor, &project_path(workspace_id, project_id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let task = app_state
        .workspace_service
        .create_task(&actor, project_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    get,
    path = "/api/workspaces/{workspace}/projects/{project}/tasks/{task}",
    tag = "Tasks",
    params(
        ("workspace" = Uuid, Path, description = "ID do workspace"),
        ("project" = Uuid, Path, description = "ID do projeto"),
        ("task" = Uuid, Path, description = "ID da tarefa")
    ),
    responses(
        (status = 200, description = "Tarefa com subtarefas", body = TaskDetail),
        (status = 404, description = "Tarefa inexistente ou fora do projeto informado")
    ),
    security(("api_jwt" = []))
)]
pub async fn show(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path((workspace_id, project_id, task_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .hierarchy
        .authorize(&actor, &task_path(workspace_id, project_id, task_id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let (task, sub_tasks) = app_state
        .workspace_service
        .get_task(task_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(TaskDetail { task, sub_tasks })))
}

#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace}/projects/{project}/tasks/{task}/subtasks",
    tag = "Tasks",
    request_body = CreateSubTaskPayload,
    params(
        ("workspace" = Uuid, Path, description = "ID do workspace"),
        ("project" = Uuid, Path, description = "ID do projeto"),
        ("task" = Uuid, Path, description = "ID da tarefa")
    ),
    responses((status = 201, description = "Subtarefa criada", body = SubTask)),
    security(("api_jwt" = []))
)]
pub async fn store_sub_task(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path((workspace_id, project_id, task_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(payload): Json<CreateSubTaskPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    app_state
        .hierarchy
        .authorize(&actor, &task_path(workspace_id, project_id, task_id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let sub_task = app_state
        .workspace_service
        .create_sub_task(project_id, task_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(sub_task)))
}

#[utoipa::path(
    patch,
    path = "/api/workspaces/{workspace}/projects/{project}/tasks/{task}/subtasks/{sub_task}/toggle",
    tag = "Tasks",
    params(
        ("workspace" = Uuid, Path, description = "ID do workspace"),
        ("project" = Uuid, Path, description = "ID do projeto"),
        ("task" = Uuid, Path, description = "ID da tarefa"),
        ("sub_task" = Uuid, Path, description = "ID da subtarefa")
    ),
    responses((status = 200, description = "Conclusão alternada", body = SubTask)),
    security(("api_jwt" = []))
)]
pub async fn toggle_sub_task(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path((workspace_id, project_id, task_id, sub_task_id)): Path<(Uuid, Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let path = task_path(workspace_id, project_id, task_id).then(ResourceKind::SubTask, sub_task_id);
    app_state
        .hierarchy
        .authorize(&actor, &path)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let sub_task = app_state
        .workspace_service
        .toggle_sub_task(&actor, sub_task_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(sub_task)))
}

#[utoipa::path(
    delete,
    path = "/api/workspaces/{workspace}/projects/{project}/tasks/{task}/subtasks/{sub_task}",
    tag = "Tasks",
    params(
        ("workspace" = Uuid, Path, description = "ID do workspace"),
        ("project" = Uuid, Path, description = "ID do projeto"),
        ("task" = Uuid, Path, description = "ID da tarefa"),
        ("sub_task" = Uuid, Path, description = "ID da subtarefa")
    ),
    responses((status = 204, description = "Subtarefa removida")),
    security(("api_jwt" = []))
)]
pub async fn destroy_sub_task(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path((workspace_id, project_id, task_id, sub_task_id)): Path<(Uuid, Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let path = task_path(workspace_id, project_id, task_id).then(ResourceKind::SubTask, sub_task_id);
    app_state
        .hierarchy
        .authorize(&actor, &path)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    app_state
        .workspace_service
        .delete_sub_task(sub_task_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
