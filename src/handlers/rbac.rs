// src/handlers/rbac.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::{
        auth::Actor,
        rbac::{AssignRolePayload, CreateRolePayload, Permission, PermissionPayload, Role, RoleResponse},
    },
};

// ---
// Catálogo de permissões (super-admin)
// ---

#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    responses((status = 200, description = "Catálogo de permissões", body = Vec<Permission>)),
    security(("api_jwt" = []))
)]
pub async fn list_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let permissions = app_state
        .rbac_service
        .list_permissions()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(permissions)))
}

#[utoipa::path(
    post,
    path = "/api/permissions",
    tag = "RBAC",
    request_body = PermissionPayload,
    responses(
        (status = 201, description = "Permissão criada", body = Permission),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_permission(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<PermissionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let permission = app_state
        .rbac_service
        .create_permission(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(permission)))
}

#[utoipa::path(
    put,
    path = "/api/permissions/{permission}",
    tag = "RBAC",
    request_body = PermissionPayload,
    params(("permission" = Uuid, Path, description = "ID da permissão")),
    responses(
        (status = 200, description = "Permissão atualizada", body = Permission),
        (status = 404, description = "Permissão não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_permission(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(permission_id): Path<Uuid>,
    Json(payload): Json<PermissionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let permission = app_state
        .rbac_service
        .update_permission(permission_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(permission)))
}

// ---
// Cargos (company_can:roles.manage)
// ---

#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "RBAC",
    responses((status = 200, description = "Cargos visíveis para a empresa", body = Vec<Role>)),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    locale: Locale,
    TenantContext(scope): TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let roles = app_state
        .rbac_service
        .list_roles(&scope)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(roles)))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "RBAC",
    request_body = CreateRolePayload,
    responses(
        (status = 201, description = "Cargo criado", body = RoleResponse),
        (status = 400, description = "Permissão desconhecida ou nome reservado"),
        (status = 403, description = "Permissão que o usuário não possui")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    TenantContext(scope): TenantContext,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let role = app_state
        .rbac_service
        .create_role(&actor, &scope, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    post,
    path = "/api/roles/{role}/users",
    tag = "RBAC",
    request_body = AssignRolePayload,
    params(("role" = Uuid, Path, description = "ID do cargo")),
    responses(
        (status = 200, description = "Cargo atribuído", body = RoleResponse),
        (status = 404, description = "Cargo ou usuário fora da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_role(
    State(app_state): State<AppState>,
    locale: Locale,
    TenantContext(scope): TenantContext,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<AssignRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let role = app_state
        .rbac_service
        .assign_role(&scope, role_id, payload.user_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(role)))
}
