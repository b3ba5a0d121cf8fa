// src/handlers/workspaces.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    authz::ResourcePath,
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::{
        auth::Actor,
        workspace::{CreateProjectPayload, CreateWorkspacePayload, Project, Workspace},
    },
};

#[utoipa::path(
    get,
    path = "/api/workspaces",
    tag = "Workspaces",
    responses((status = 200, description = "Workspaces da empresa", body = Vec<Workspace>)),
    security(("api_jwt" = []))
)]
pub async fn index(
    State(app_state): State<AppState>,
    locale: Locale,
    TenantContext(scope): TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let workspaces = app_state
        .workspace_service
        .list_workspaces(&scope)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(workspaces)))
}

#[utoipa::path(
    post,
    path = "/api/workspaces",
    tag = "Workspaces",
    request_body = CreateWorkspacePayload,
    responses(
        (status = 201, description = "Workspace criado (o criador vira workspace-admin)", body = Workspace)
    ),
    security(("api_jwt" = []))
)]
pub async fn store(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    TenantContext(scope): TenantContext,
    Json(payload): Json<CreateWorkspacePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let workspace = app_state
        .workspace_service
        .create_workspace(&actor, &scope, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(workspace)))
}

#[utoipa::path(
    get,
    path = "/api/workspaces/{workspace}",
    tag = "Workspaces",
    params(("workspace" = Uuid, Path, description = "ID do workspace")),
    responses(
        (status = 200, description = "Workspace", body = Workspace),
        (status = 404, description = "Não encontrado"),
        (status = 403, description = "Workspace de outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn show(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .hierarchy
        .authorize(&actor, &ResourcePath::workspace(workspace_id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let workspace = app_state
        .workspace_service
        .get_workspace(workspace_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(workspace)))
}

#[utoipa::path(
    get,
    path = "/api/workspaces/{workspace}/projects",
    tag = "Workspaces",
    params(("workspace" = Uuid, Path, description = "ID do workspace")),
    responses((status = 200, description = "Projetos do workspace", body = Vec<Project>)),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .hierarchy
        .authorize(&actor, &ResourcePath::workspace(workspace_id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let projects = app_state
        .workspace_service
        .list_projects(workspace_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(projects)))
}

#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace}/projects",
    tag = "Workspaces",
    request_body = CreateProjectPayload,
    params(("workspace" = Uuid, Path, description = "ID do workspace")),
    responses((status = 201, description = "Projeto criado", body = Project)),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path(workspace_id): Path<Uuid>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    app_state
        .hierarchy
        .authorize(&actor, &ResourcePath::workspace(workspace_id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let project = app_state
        .workspace_service
        .create_project(workspace_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(project)))
}
