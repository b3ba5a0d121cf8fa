// src/middleware/tenancy.rs

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::{
    authz::tenant::TenantScope,
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::auth::Actor,
};

// O nosso extrator de tenant: a empresa do usuário autenticado
// (ou sem restrição, para o super-admin). Sem empresa -> 403.
#[derive(Debug, Clone)]
pub struct TenantContext(pub TenantScope);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(&parts.headers);
        let actor = Actor::from_request_parts(parts, state)
            .await
            .map_err(|e| e.to_api_error(&locale))?;

        let app_state = AppState::from_ref(state);
        app_state
            .tenant_service
            .resolve(&actor)
            .await
            .map(TenantContext)
            .map_err(|e| e.to_api_error(&locale))
    }
}
