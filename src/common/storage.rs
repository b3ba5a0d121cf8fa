// src/common/storage.rs

use std::path::PathBuf;
use uuid::Uuid;

use crate::common::{error::AppError, multipart::UploadedFile};

/// Armazenamento local dos arquivos enviados (logos das empresas).
/// Os caminhos gravados no banco são relativos à raiz.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Grava o arquivo em `<root>/<dir>/<uuid>.<ext>` e devolve o caminho relativo.
    pub async fn put(&self, dir: &str, file: &UploadedFile) -> Result<String, AppError> {
        let ext = file
            .extension()
            .ok_or_else(|| AppError::BadRequest("Tipo de arquivo não suportado.".into()))?;

        let relative = format!("{}/{}.{}", dir, Uuid::new_v4(), ext);
        let full = self.root.join(&relative);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, &file.bytes).await?;

        tracing::debug!("Arquivo gravado: {}", relative);
        Ok(relative)
    }

    /// Remove sem falhar: arquivo ausente não é erro.
    pub async fn delete(&self, relative: &str) {
        if let Err(e) = tokio::fs::remove_file(self.root.join(relative)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Falha ao remover arquivo {}: {}", relative, e);
            }
        }
    }
}
