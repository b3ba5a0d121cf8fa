// src/common/multipart.rs

use axum::{body::Bytes, extract::Multipart};
use std::collections::HashMap;

use crate::common::error::AppError;

/// Arquivo recebido num formulário multipart.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Extensão segura para gravar no disco (derivada do content-type, nunca do nome enviado).
    pub fn extension(&self) -> Option<&'static str> {
        match self.content_type.as_deref() {
            Some("image/png") => Some("png"),
            Some("image/jpeg") | Some("image/jpg") => Some("jpg"),
            Some("image/webp") => Some("webp"),
            Some("image/svg+xml") => Some("svg"),
            _ => None,
        }
    }
}

/// Campos de texto + arquivos de um formulário multipart.
#[derive(Debug, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Valor de texto "limpo": ausente e vazio são a mesma coisa.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

pub async fn read_form(mut multipart: Multipart) -> Result<FormData, AppError> {
    let mut form = FormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;

                // Navegadores mandam o campo de arquivo vazio quando nada foi selecionado
                if !bytes.is_empty() {
                    form.files.insert(name, UploadedFile { file_name, content_type, bytes });
                }
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}
