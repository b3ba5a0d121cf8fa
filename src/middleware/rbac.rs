// src/middleware/rbac.rs

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use uuid::Uuid;

use crate::{
    authz::gate::{self, is_super_admin_row, Access, Grants},
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::bearer_token, i18n::Locale},
    models::auth::Actor,
    routes::RouteTable,
};

/// Valor de um parâmetro de rota, casando o template (`/a/{x}/b`) com o caminho real.
pub fn path_param<'a>(template: &str, path: &'a str, name: &str) -> Option<&'a str> {
    let placeholder = format!("{{{}}}", name);
    template
        .split('/')
        .zip(path.split('/'))
        .find(|(t, _)| *t == placeholder)
        .map(|(_, value)| value)
}

/// Guard único de todas as rotas.
///
/// Ordem: autenticação -> super-admin (libera tudo) -> modo de acesso da rota.
/// Os papéis do usuário são consultados a cada requisição.
pub async fn route_guard(
    State(state): State<AppState>,
    Extension(table): Extension<RouteTable>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());

    let template = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_owned())
        .unwrap_or_default();

    let (access, route_name) = match table.find(request.method(), &template) {
        Some(entry) => (entry.access, entry.name),
        None => {
            tracing::warn!("Rota sem registro na tabela: {} {}", request.method(), template);
            (Access::Authenticated, None)
        }
    };

    if !access.requires_auth() {
        return Ok(next.run(request).await);
    }

    let workspace_id = path_param(&template, request.uri().path(), "workspace")
        .and_then(|raw| Uuid::parse_str(raw).ok());

    let actor = authorize_request(&state, request.headers(), access, route_name, workspace_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

async fn authorize_request(
    state: &AppState,
    headers: &axum::http::HeaderMap,
    access: Access,
    route_name: Option<&'static str>,
    workspace_id: Option<Uuid>,
) -> Result<Actor, AppError> {
    let token = bearer_token(headers)?;
    let user = state.auth_service.validate_token(&token).await?;

    let rows = state.rbac_repo.grant_rows(user.id).await?;
    let is_super_admin = rows.iter().any(is_super_admin_row);
    let actor = Actor { user, is_super_admin };

    // Super-admin e rotas que só pedem login não precisam do resto
    if is_super_admin || access == Access::Authenticated {
        return Ok(actor);
    }

    let company_id = state
        .tenant_service
        .find_company(&actor.user)
        .await?
        .map(|c| c.id);
    let grants = Grants::from_rows(rows, company_id, workspace_id);
    let matcher = state.permissions.snapshot().await;

    if let Err(e) = gate::authorize(access, route_name, &grants, &matcher) {
        tracing::warn!(
            user_id = %actor.id(),
            route = route_name.unwrap_or("-"),
            "Acesso negado: {}",
            e
        );
        return Err(e);
    }

    Ok(actor)
}
