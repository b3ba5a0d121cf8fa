// src/handlers/companies.rs
//
// Rotas do super-admin (`role:admin`). O guard já barrou os demais.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        multipart::read_form,
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::Actor,
        company::{ChangeStatusPayload, Company, CompanyAppealLog, CreateCompanyForm},
    },
};

#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    responses((status = 200, description = "Todas as empresas", body = Vec<Company>)),
    security(("api_jwt" = []))
)]
pub async fn index(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let companies = app_state
        .company_service
        .list_companies()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(companies)))
}

#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    request_body(content_type = "multipart/form-data", description = "Mesmos campos do cadastro público"),
    responses(
        (status = 201, description = "Empresa criada", body = Company),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn store(
    State(app_state): State<AppState>,
    locale: Locale,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart)
        .await
        .and_then(CreateCompanyForm::from_form)
        .map_err(|e| e.to_api_error(&locale))?;

    let (_owner, company) = app_state
        .company_service
        .create_company(form)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(company)))
}

#[utoipa::path(
    get,
    path = "/api/companies/{company}",
    tag = "Companies",
    params(("company" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn show(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let company = app_state
        .company_service
        .get_company(company_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(company)))
}

#[utoipa::path(
    patch,
    path = "/api/companies/{company}/status",
    tag = "Companies",
    request_body = ChangeStatusPayload,
    params(("company" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Status aplicado (sem histórico quando nada muda)", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let company = app_state
        .company_service
        .change_status(&actor, company_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(company)))
}

#[utoipa::path(
    get,
    path = "/api/companies/{company}/appeals",
    tag = "Companies",
    params(("company" = Uuid, Path, description = "ID da empresa")),
    responses((status = 200, description = "Histórico de ativação/suspensão", body = Vec<CompanyAppealLog>)),
    security(("api_jwt" = []))
)]
pub async fn appeals(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = app_state
        .company_service
        .appeal_logs(company_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(logs)))
}
