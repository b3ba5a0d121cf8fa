// src/handlers/auth.rs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        multipart::read_form,
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::{AuthResponse, LoginUserPayload},
        company::CreateCompanyForm,
    },
};

// Cadastro público: cria o usuário dono + a empresa e já devolve o token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body(content_type = "multipart/form-data", description = "name, email, password, password_confirmation, company_name, category_id, address, phone, logo"),
    responses(
        (status = 201, description = "Empresa e usuário criados", body = AuthResponse),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart)
        .await
        .and_then(CreateCompanyForm::from_form)
        .map_err(|e| e.to_api_error(&locale))?;

    let (user, _company) = app_state
        .company_service
        .create_company(form)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let token = app_state
        .auth_service
        .create_token(user.id)
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login bem-sucedido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(AuthResponse { token })))
}
