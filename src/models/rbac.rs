// src/models/rbac.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::error::UnknownVariant;

// Nível em que uma permissão (ou papel) se aplica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PermissionScope {
    Company,
    Workspace,
}

impl PermissionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionScope::Company => "company",
            PermissionScope::Workspace => "workspace",
        }
    }
}

impl TryFrom<String> for PermissionScope {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "company" => Ok(PermissionScope::Company),
            "workspace" => Ok(PermissionScope::Workspace),
            _ => Err(UnknownVariant(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    General,
    Unique,
}

impl PermissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionKind::General => "general",
            PermissionKind::Unique => "unique",
        }
    }
}

impl TryFrom<String> for PermissionKind {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "general" => Ok(PermissionKind::General),
            "unique" => Ok(PermissionKind::Unique),
            _ => Err(UnknownVariant(value)),
        }
    }
}

// O que sai do banco (Tabela permissions)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: Uuid,

    #[schema(example = "tasks.manage")]
    pub name: String,

    #[schema(example = "TASKS")]
    pub module: String,

    #[sqlx(rename = "type", try_from = "String")]
    pub kind: PermissionKind,

    #[sqlx(try_from = "String")]
    pub scope: PermissionScope,

    #[schema(value_type = f64, example = 0.0)]
    pub price: Decimal,

    #[schema(example = "tasks.index")]
    pub route_name: Option<String>,

    pub route_path: Option<String>,
    pub controller_action: Option<String>,
    pub icon: Option<String>,
    pub is_menu: bool,
    pub is_group: bool,

    // Padrões glob ("tasks.*") em ordem
    #[schema(value_type = Option<Vec<String>>, example = json!(["tasks.*", "subtasks.*"]))]
    pub group_routes: Option<Json<Vec<String>>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    pub fn group_patterns(&self) -> &[String] {
        match &self.group_routes {
            Some(routes) if self.is_group => routes.0.as_slice(),
            _ => &[],
        }
    }
}

// O que sai do banco (Tabela roles)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,

    #[schema(example = "workspace-admin")]
    pub name: String,

    #[schema(example = "api")]
    pub guard_name: String,

    // Ambos nulos => papel global
    pub company_id: Option<Uuid>,
    pub workspace_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

/// Papel + permissão, como lidos para montar o conjunto de acesso de um usuário.
#[derive(Debug, Clone, FromRow)]
pub struct RoleGrantRow {
    pub role_name: String,
    pub role_company_id: Option<Uuid>,
    pub role_workspace_id: Option<Uuid>,
    pub permission_id: Option<Uuid>,
    pub permission_name: Option<String>,
}

// ---
// Payloads
// ---

fn validate_group_patterns(patterns: &[String]) -> Result<(), ValidationError> {
    for pattern in patterns {
        if pattern.trim().is_empty() || globset::Glob::new(pattern).is_err() {
            let mut err = ValidationError::new("glob");
            err.message = Some(format!("Padrão de rota inválido: '{}'.", pattern).into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_permission_payload", skip_on_field_errors = false))]
pub struct PermissionPayload {
    #[validate(length(min = 1, max = 150, message = "O nome é obrigatório."))]
    #[schema(example = "reports.view")]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "O módulo é obrigatório."))]
    #[schema(example = "REPORTS")]
    pub module: String,

    pub kind: Option<PermissionKind>,
    pub scope: Option<PermissionScope>,

    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,

    pub route_name: Option<String>,
    pub route_path: Option<String>,
    pub controller_action: Option<String>,
    pub icon: Option<String>,

    #[serde(default)]
    pub is_menu: bool,

    #[serde(default)]
    pub is_group: bool,

    #[validate(custom(function = "validate_group_patterns"))]
    #[schema(example = json!(["reports.*"]))]
    pub group_routes: Option<Vec<String>>,
}

// Permissão de grupo sem padrões nunca casaria com nada
fn validate_permission_payload(payload: &PermissionPayload) -> Result<(), ValidationError> {
    let has_patterns = payload
        .group_routes
        .as_ref()
        .is_some_and(|routes| !routes.is_empty());
    if payload.is_group && !has_patterns {
        let mut err = ValidationError::new("group_routes_required");
        err.message = Some("Permissões de grupo precisam de ao menos um padrão de rota.".into());
        return Err(err);
    }
    Ok(())
}

// O Payload para criar um cargo
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    #[validate(length(min = 1, max = 100, message = "O nome do cargo é obrigatório."))]
    #[schema(example = "Coordenador")]
    pub name: String,

    // Quando presente, o cargo vale só dentro deste workspace
    pub workspace_id: Option<Uuid>,

    #[schema(example = json!(["tasks.manage", "timesheets.access"]))]
    pub permissions: Vec<String>, // Nomes das permissões
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolePayload {
    pub user_id: Uuid,
}

// Resposta completa (Cargo + Lista de Permissões)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    #[serde(flatten)]
    pub role: Role,

    #[schema(example = json!(["tasks.manage"]))]
    pub permissions: Vec<String>,
}
