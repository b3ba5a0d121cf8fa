// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Recurso inexistente OU fora da hierarquia informada na URL.
    // As duas situações são propositalmente indistinguíveis.
    #[error("Recurso não encontrado")]
    ResourceNotFound,

    #[error("Empresa não identificada para o usuário")]
    TenantNotResolved,

    #[error("Recurso pertence a outra empresa")]
    TenantMismatch,

    #[error("Permissão ausente: {0}")]
    PermissionDenied(String),

    #[error("Papel ausente: {0}")]
    RoleRequired(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Conflito de estado: {0}")]
    Conflict(String),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),
}

/// Valor textual do banco que não corresponde a nenhuma variante do enum.
#[derive(Debug, Error)]
#[error("valor desconhecido: {0}")]
pub struct UnknownVariant(pub String);

/// O erro que efetivamente sai pela API (já traduzido).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists
            | AppError::UniqueConstraintViolation(_)
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::ResourceNotFound => StatusCode::NOT_FOUND,
            AppError::DatabaseError(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::TenantNotResolved
            | AppError::TenantMismatch
            | AppError::PermissionDenied(_)
            | AppError::RoleRequired(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta da API, no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let en = locale.is_english();
        let pick = |pt: &str, en_msg: &str| if en { en_msg.to_string() } else { pt.to_string() };
        let status = self.status();

        let error = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                return ApiError {
                    status,
                    error: pick("Um ou mais campos são inválidos.", "One or more fields are invalid."),
                    details: Some(json!(details)),
                };
            }
            AppError::EmailAlreadyExists => pick("Este e-mail já está em uso.", "This e-mail is already in use."),
            AppError::InvalidCredentials => pick("E-mail ou senha inválidos.", "Invalid e-mail or password."),
            AppError::InvalidToken => pick(
                "Token de autenticação inválido ou ausente.",
                "Missing or invalid authentication token.",
            ),
            AppError::ResourceNotFound | AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                pick("Recurso não encontrado.", "Resource not found.")
            }
            AppError::TenantNotResolved => pick(
                "Sua conta não está vinculada a nenhuma empresa.",
                "Your account is not linked to any company.",
            ),
            AppError::TenantMismatch | AppError::RoleRequired(_) => {
                pick("Acesso negado.", "Access denied.")
            }
            AppError::PermissionDenied(perm) => {
                if en {
                    format!("You need the '{}' permission to perform this action.", perm)
                } else {
                    format!("Você precisa da permissão '{}' para realizar esta ação.", perm)
                }
            }
            AppError::UniqueConstraintViolation(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            // Todos os outros erros viram 500; o detalhe fica só no log.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                pick("Ocorreu um erro inesperado.", "An unexpected error occurred.")
            }
        };

        ApiError { status, error, details: None }
    }

    /// Monta um erro de validação para um único campo (regras fora do `validator` derive).
    pub fn field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut err = validator::ValidationError::new(code);
        err.message = Some(message.into());
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, err);
        AppError::ValidationError(errors)
    }
}

// Usado pelos middlewares, que não têm um handler para traduzir o erro.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

/// Converte violações de unicidade do Postgres em um erro amigável.
pub fn map_unique_violation(e: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(message.to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_and_tenant_errors_map_to_distinct_statuses() {
        assert_eq!(AppError::ResourceNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::TenantMismatch.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::TenantNotResolved.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn messages_follow_locale() {
        let pt = AppError::ResourceNotFound.to_api_error(&Locale::default());
        let en = AppError::ResourceNotFound.to_api_error(&Locale("en".into()));
        assert_eq!(pt.error, "Recurso não encontrado.");
        assert_eq!(en.error, "Resource not found.");
    }

    #[test]
    fn field_error_carries_details() {
        let api = AppError::field("email", "taken", "O e-mail já existe.").to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("detalhes");
        assert_eq!(details["email"][0], "O e-mail já existe.");
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo")).to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("segredo"));
    }
}
