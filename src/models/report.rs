// src/models/report.rs

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::common::error::AppError;

/// Query string crua de `GET /api/reports/company/export`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompanyExportQuery {
    /// `1`/`true` = ativas, `0`/`false` = suspensas, ausente = todas
    pub is_active: Option<String>,
    /// `AAAA-MM-DD`; vazio = sem limite
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Slug,
    Email,
    IsActive,
    CreatedAt,
}

impl SortColumn {
    // Lista branca: o valor vai direto para o ORDER BY
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("name") => SortColumn::Name,
            Some("slug") => SortColumn::Slug,
            Some("email") => SortColumn::Email,
            Some("is_active") => SortColumn::IsActive,
            _ => SortColumn::CreatedAt,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Slug => "slug",
            SortColumn::Email => "email",
            SortColumn::IsActive => "is_active",
            SortColumn::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|d| d.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Filtro já normalizado, pronto para o repositório.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyExportFilter {
    pub is_active: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_by: SortColumn,
    pub sort_dir: SortDirection,
}

pub fn parse_active_flag(raw: Option<&str>) -> Option<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("1") | Some("true") => Some(true),
        Some("0") | Some("false") => Some(false),
        _ => None,
    }
}

// Vazio conta como ausente, igual a `is_active`
fn parse_date(raw: Option<&str>, field: &'static str) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::field(field, "date", "Data inválida; use AAAA-MM-DD.")),
    }
}

impl TryFrom<CompanyExportQuery> for CompanyExportFilter {
    type Error = AppError;

    fn try_from(query: CompanyExportQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            is_active: parse_active_flag(query.is_active.as_deref()),
            start_date: parse_date(query.start_date.as_deref(), "start_date")?,
            end_date: parse_date(query.end_date.as_deref(), "end_date")?,
            sort_by: SortColumn::parse(query.sort_by.as_deref()),
            sort_dir: SortDirection::parse(query.sort_dir.as_deref()),
        })
    }
}
