// src/handlers/profile.rs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{error::ApiError, multipart::read_form},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::Actor,
        company::{ProfileResponse, UpdateProfileForm},
    },
};

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "Usuário autenticado e sua empresa", body = ProfileResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn show(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .company_service
        .profile(&actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(profile)))
}

// Multipart por causa do logo.
#[utoipa::path(
    post,
    path = "/api/profile",
    tag = "Profile",
    request_body(content_type = "multipart/form-data", description = "name, email, company_name, address, phone, logo"),
    responses(
        (status = 200, description = "Perfil atualizado", body = ProfileResponse),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update(
    State(app_state): State<AppState>,
    locale: Locale,
    actor: Actor,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart)
        .await
        .and_then(UpdateProfileForm::from_form)
        .map_err(|e| e.to_api_error(&locale))?;

    let profile = app_state
        .company_service
        .update_profile(&actor, form)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(profile)))
}
