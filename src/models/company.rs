// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::{
    error::{AppError, UnknownVariant},
    multipart::{FormData, UploadedFile},
};

const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

// ---
// 1. Company (o Tenant)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,

    // Usuário dono da empresa
    pub user_id: Uuid,

    pub category_id: Option<Uuid>,

    #[schema(example = "Acme Consultoria")]
    pub name: String,

    #[schema(example = "acme-consultoria-x7k2p9")]
    pub slug: String,

    pub logo_path: Option<String>,

    #[schema(example = "contato@acme.com")]
    pub email: String,

    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ---
// 2. Histórico de ativação/suspensão
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AppealStatus {
    Active,
    Suspended,
}

impl AppealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppealStatus::Active => "active",
            AppealStatus::Suspended => "suspended",
        }
    }

    /// Status resultante de uma mudança em `is_active`; `None` quando nada mudou.
    pub fn from_transition(was_active: bool, is_active: bool) -> Option<Self> {
        match (was_active, is_active) {
            (false, true) => Some(AppealStatus::Active),
            (true, false) => Some(AppealStatus::Suspended),
            _ => None,
        }
    }
}

impl TryFrom<String> for AppealStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(AppealStatus::Active),
            "suspended" => Ok(AppealStatus::Suspended),
            _ => Err(UnknownVariant(value)),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAppealLog {
    pub id: Uuid,
    pub company_id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status_to: AppealStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---
// 3. Formulários (multipart)
// ---

// Política de senha: letras e números
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        let mut err = ValidationError::new("password_policy");
        err.message = Some("A senha deve conter letras e números.".into());
        return Err(err);
    }
    Ok(())
}

fn parse_uuid_field(form: &FormData, field: &'static str) -> Result<Option<Uuid>, AppError> {
    match form.text(field) {
        Some(raw) => Uuid::parse_str(&raw)
            .map(Some)
            .map_err(|_| AppError::field(field, "uuid", "Identificador inválido.")),
        None => Ok(None),
    }
}

fn check_logo(logo: &Option<UploadedFile>) -> Result<(), AppError> {
    if let Some(file) = logo {
        if file.extension().is_none() {
            return Err(AppError::field("logo", "mimes", "O logo deve ser PNG, JPG, WEBP ou SVG."));
        }
        if file.bytes.len() > MAX_LOGO_BYTES {
            return Err(AppError::field("logo", "max", "O logo deve ter no máximo 2 MB."));
        }
    }
    Ok(())
}

/// Cadastro de empresa + usuário dono (registro público e criação pelo admin).
#[derive(Debug, Validate)]
pub struct CreateCompanyForm {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(
        length(min = 8, message = "A senha deve ter no mínimo 8 caracteres."),
        custom(function = "validate_password_strength")
    )]
    pub password: String,

    #[validate(must_match(other = "password", message = "A confirmação da senha não confere."))]
    pub password_confirmation: String,

    #[validate(length(min = 1, max = 255, message = "O nome da empresa é obrigatório."))]
    pub company_name: String,

    #[validate(required(message = "A categoria é obrigatória."))]
    pub category_id: Option<Uuid>,

    #[validate(length(max = 500, message = "Endereço muito longo."))]
    pub address: Option<String>,

    #[validate(length(max = 30, message = "Telefone muito longo."))]
    pub phone: Option<String>,

    pub logo: Option<UploadedFile>,
}

impl CreateCompanyForm {
    pub fn from_form(mut form: FormData) -> Result<Self, AppError> {
        let category_id = parse_uuid_field(&form, "category_id")?;
        let logo = form.take_file("logo");
        check_logo(&logo)?;

        let data = Self {
            name: form.text("name").unwrap_or_default(),
            email: form.text("email").unwrap_or_default().to_lowercase(),
            password: form.fields.get("password").cloned().unwrap_or_default(),
            password_confirmation: form.fields.get("password_confirmation").cloned().unwrap_or_default(),
            company_name: form.text("company_name").unwrap_or_default(),
            category_id,
            address: form.text("address"),
            phone: form.text("phone"),
            logo,
        };

        data.validate()?;
        Ok(data)
    }
}

/// Atualização do perfil (usuário + campos espelhados na empresa).
#[derive(Debug, Validate)]
pub struct UpdateProfileForm {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "O nome da empresa não pode ser vazio."))]
    pub company_name: Option<String>,

    #[validate(length(max = 500, message = "Endereço muito longo."))]
    pub address: Option<String>,

    #[validate(length(max = 30, message = "Telefone muito longo."))]
    pub phone: Option<String>,

    pub logo: Option<UploadedFile>,
}

impl UpdateProfileForm {
    pub fn from_form(mut form: FormData) -> Result<Self, AppError> {
        let logo = form.take_file("logo");
        check_logo(&logo)?;

        let data = Self {
            name: form.text("name").unwrap_or_default(),
            email: form.text("email").unwrap_or_default().to_lowercase(),
            company_name: form.text("company_name"),
            address: form.text("address"),
            phone: form.text("phone"),
            logo,
        };

        data.validate()?;
        Ok(data)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusPayload {
    pub is_active: bool,

    #[validate(length(max = 500, message = "O motivo deve ter no máximo 500 caracteres."))]
    #[schema(example = "policy violation")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: crate::models::auth::User,
    pub company: Option<Company>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_form() -> FormData {
        let mut form = FormData::default();
        for (k, v) in [
            ("name", "Maria"),
            ("email", "Maria@Acme.com"),
            ("password", "segredo123"),
            ("password_confirmation", "segredo123"),
            ("company_name", "Acme"),
            ("category_id", "6f2c1a8e-8d0b-4a53-9b7f-2d1f0f0c9a11"),
        ] {
            form.fields.insert(k.to_string(), v.to_string());
        }
        form
    }

    #[test]
    fn transition_only_reports_real_changes() {
        assert_eq!(AppealStatus::from_transition(true, false), Some(AppealStatus::Suspended));
        assert_eq!(AppealStatus::from_transition(false, true), Some(AppealStatus::Active));
        assert_eq!(AppealStatus::from_transition(true, true), None);
        assert_eq!(AppealStatus::from_transition(false, false), None);
    }

    #[test]
    fn create_form_normalizes_email() {
        let form = CreateCompanyForm::from_form(base_form()).expect("formulário válido");
        assert_eq!(form.email, "maria@acme.com");
        assert!(form.logo.is_none());
    }

    #[test]
    fn create_form_rejects_weak_password() {
        let mut form = base_form();
        form.fields.insert("password".into(), "somenteletras".into());
        form.fields.insert("password_confirmation".into(), "somenteletras".into());
        let err = CreateCompanyForm::from_form(form).unwrap_err();
        match err {
            AppError::ValidationError(errors) => {
                assert!(errors.field_errors().contains_key("password"));
            }
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[test]
    fn create_form_requires_matching_confirmation() {
        let mut form = base_form();
        form.fields.insert("password_confirmation".into(), "outra123".into());
        assert!(matches!(
            CreateCompanyForm::from_form(form),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn create_form_rejects_unknown_logo_type() {
        let mut form = base_form();
        form.files.insert(
            "logo".into(),
            UploadedFile {
                file_name: "logo.exe".into(),
                content_type: Some("application/octet-stream".into()),
                bytes: axum::body::Bytes::from_static(b"MZ"),
            },
        );
        assert!(matches!(
            CreateCompanyForm::from_form(form),
            Err(AppError::ValidationError(_))
        ));
    }
}
