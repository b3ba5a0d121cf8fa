// src/services/report_service.rs

use chrono::{DateTime, Utc};

use crate::{
    common::error::AppError,
    db::CompanyRepository,
    models::{company::Company, report::CompanyExportFilter},
};

const HEADER: [&str; 8] = ["id", "nome", "slug", "email", "telefone", "endereco", "ativa", "criada_em"];

/// Planilha pronta para download.
#[derive(Debug)]
pub struct ExportFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

#[derive(Clone)]
pub struct ReportService {
    company_repo: CompanyRepository,
}

pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("companies_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

pub fn companies_to_csv(companies: &[Company]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .map_err(|e| anyhow::anyhow!("Falha ao escrever CSV: {}", e))?;

    for company in companies {
        writer
            .write_record([
                company.id.to_string(),
                company.name.clone(),
                company.slug.clone(),
                company.email.clone(),
                company.phone.clone().unwrap_or_default(),
                company.address.clone().unwrap_or_default(),
                if company.is_active { "1" } else { "0" }.to_string(),
                company.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ])
            .map_err(|e| anyhow::anyhow!("Falha ao escrever CSV: {}", e))?;
    }

    let content = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Falha ao finalizar CSV: {}", e))?;
    Ok(content)
}

impl ReportService {
    pub fn new(company_repo: CompanyRepository) -> Self {
        Self { company_repo }
    }

    // Síncrono por natureza: a requisição espera a planilha inteira
    pub async fn export_companies(&self, filter: &CompanyExportFilter) -> Result<ExportFile, AppError> {
        let companies = self.company_repo.export(filter).await?;
        tracing::info!("Exportando {} empresas", companies.len());

        Ok(ExportFile {
            file_name: export_file_name(Utc::now()),
            content: companies_to_csv(&companies)?,
        })
    }
}
