// src/handlers/timesheets.rs

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
        timesheet::{
            ApprovalPayload, CreateEntryPayload, CreateTimesheetPayload, Timesheet, TimesheetApproval,
            TimesheetEntry,
        },
    },
};

fn timesheet_path(workspace_id: Uuid, timesheet_id: Uuid) -> ResourcePath {
    ResourcePath::workspace(workspace_id).then(ResourceKind::Timesheet, timesheet_id)
}

#[utoipa::path(
    get,
    path = "/api/workspaces/{workspace}/timesheets",
    tag = "Timesheets",
    params(("workspace" = Uuid, Path, description = "ID do workspace")),
    responses((status = 200, description = "Folhas de horas do workspace", body = Vec<Timesheet>)),
    security(("api_jwt" = []))
)]
pub async fn index(
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

    let timesheets = app_state
        .timesheet_service
        .list(workspace_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(timesheets)))
}

#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace}/timesheets",
    tag = "Timesheets",
    request_body = CreateTimesheetPayload,
    params(("workspace" = Uuid, Path, description = "ID do workspace")),
    responses((status = 201, description = "Folha criada (pendente)", body = Timesheet)),
    security(("api_jwt" = []))
)]
pub async fn store(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path(workspace_id): Path<Uuid>,
    Json(payload): Json<CreateTimesheetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    app_state
        .hierarchy
        .authorize(&actor, &ResourcePath::workspace(workspace_id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let timesheet = app_state
        .timesheet_service
        .create(&actor, workspace_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(timesheet)))
}

#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace}/timesheets/{timesheet}/entries",
    tag = "Timesheets",
    request_body = CreateEntryPayload,
    params(
        ("workspace" = Uuid, Path, description = "ID do workspace"),
        ("timesheet" = Uuid, Path, description = "ID da folha")
    ),
    responses(
        (status = 201, description = "Lançamento criado", body = TimesheetEntry),
        (status = 409, description = "Folha já aprovada ou rejeitada")
    ),
    security(("api_jwt" = []))
)]
pub async fn store_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path((workspace_id, timesheet_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CreateEntryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    app_state
        .hierarchy
        .authorize(&actor, &timesheet_path(workspace_id, timesheet_id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let entry = app_state
        .timesheet_service
        .add_entry(timesheet_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/workspaces/{workspace}/timesheets/{timesheet}/entries/{entry}",
    tag = "Timesheets",
    params(
        ("workspace" = Uuid, Path, description = "ID do workspace"),
        ("timesheet" = Uuid, Path, description = "ID da folha"),
        ("entry" = Uuid, Path, description = "ID do lançamento")
    ),
    responses((status = 204, description = "Lançamento removido")),
    security(("api_jwt" = []))
)]
pub async fn destroy_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path((workspace_id, timesheet_id, entry_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let path = timesheet_path(workspace_id, timesheet_id).then(ResourceKind::TimesheetEntry, entry_id);
    app_state
        .hierarchy
        .authorize(&actor, &path)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    app_state
        .timesheet_service
        .delete_entry(timesheet_id, entry_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/workspaces/{workspace}/timesheets/{timesheet}/approval",
    tag = "Timesheets",
    request_body = ApprovalPayload,
    params(
        ("workspace" = Uuid, Path, description = "ID do workspace"),
        ("timesheet" = Uuid, Path, description = "ID da folha")
    ),
    responses(
        (status = 201, description = "Decisão registrada", body = TimesheetApproval),
        (status = 409, description = "Folha já decidida")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path((workspace_id, timesheet_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ApprovalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    app_state
        .hierarchy
        .authorize(&actor, &timesheet_path(workspace_id, timesheet_id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let approval = app_state
        .timesheet_service
        .decide(&actor, timesheet_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(approval)))
}
