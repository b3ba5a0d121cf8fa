// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::report::{CompanyExportFilter, CompanyExportQuery},
};

#[utoipa::path(
    get,
    path = "/api/reports/company/export",
    tag = "Reports",
    params(CompanyExportQuery),
    responses(
        (status = 200, description = "CSV das empresas", content_type = "text/csv", body = String)
    ),
    security(("api_jwt" = []))
)]
pub async fn export_companies(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<CompanyExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = CompanyExportFilter::try_from(query).map_err(|e| e.to_api_error(&locale))?;

    let file = app_state
        .report_service
        .export_companies(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    ))
}
