// src/db/company_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        company::{AppealStatus, Company, CompanyAppealLog},
        report::CompanyExportFilter,
    },
};

const COMPANY_COLUMNS: &str = "id, user_id, category_id, name, slug, logo_path, email, address, phone, \
     is_active, created_at, updated_at";

/// Dados de uma nova empresa, já normalizados pelo serviço.
#[derive(Debug)]
pub struct NewCompany<'a> {
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: &'a str,
    pub slug: &'a str,
    pub logo_path: Option<&'a str>,
    pub email: &'a str,
    pub address: Option<&'a str>,
    pub phone: Option<&'a str>,
}

/// Campos da empresa espelhados no perfil do usuário.
#[derive(Debug)]
pub struct CompanyProfileUpdate<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub email: &'a str,
    pub address: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub logo_path: Option<&'a str>,
}

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewCompany<'_>) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO companies (user_id, category_id, name, slug, logo_path, email, address, phone, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        );

        sqlx::query_as::<_, Company>(&sql)
            .bind(new.user_id)
            .bind(new.category_id)
            .bind(new.name)
            .bind(new.slug)
            .bind(new.logo_path)
            .bind(new.email)
            .bind(new.address)
            .bind(new.phone)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::field("category_id", "exists", "A categoria informada não existe.");
                    }
                    if db_err.is_unique_violation() {
                        return AppError::UniqueConstraintViolation("Já existe uma empresa com este slug.".into());
                    }
                }
                e.into()
            })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let sql = format!("SELECT {} FROM companies WHERE id = $1", COMPANY_COLUMNS);
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    /// Trava a linha até o fim da transação.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM companies WHERE id = $1 FOR UPDATE", COMPANY_COLUMNS);
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(company)
    }

    // Empresa da qual o usuário é membro (users.company_id)
    pub async fn find_by_member(&self, user_id: Uuid) -> Result<Option<Company>, AppError> {
        let sql = format!(
            "SELECT {} FROM companies WHERE id = (SELECT company_id FROM users WHERE id = $1)",
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    // Empresa da qual o usuário é dono; a mais antiga, se houver várias
    pub async fn find_owned_by(&self, user_id: Uuid) -> Result<Option<Company>, AppError> {
        let sql = format!(
            "SELECT {} FROM companies WHERE user_id = $1 ORDER BY created_at, id LIMIT 1",
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    pub async fn list_all(&self) -> Result<Vec<Company>, AppError> {
        let sql = format!("SELECT {} FROM companies ORDER BY name, id", COMPANY_COLUMNS);
        let companies = sqlx::query_as::<_, Company>(&sql).fetch_all(&self.pool).await?;
        Ok(companies)
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        update: &CompanyProfileUpdate<'_>,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE companies
            SET name = $2, slug = $3, email = $4, address = $5, phone = $6, logo_path = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .bind(update.name)
            .bind(update.slug)
            .bind(update.email)
            .bind(update.address)
            .bind(update.phone)
            .bind(update.logo_path)
            .fetch_one(executor)
            .await?;
        Ok(company)
    }

    pub async fn set_active<'e, E>(&self, executor: E, id: Uuid, is_active: bool) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE companies SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .bind(is_active)
            .fetch_one(executor)
            .await?;
        Ok(company)
    }

    pub async fn insert_appeal_log<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        user_id: Uuid,
        status_to: AppealStatus,
        reason: Option<&str>,
    ) -> Result<CompanyAppealLog, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let log = sqlx::query_as::<_, CompanyAppealLog>(
            r#"
            INSERT INTO company_appeal_logs (company_id, user_id, status_to, reason)
            VALUES ($1, $2, $3, $4)
            RETURNING id, company_id, user_id, status_to, reason, created_at
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .bind(status_to.as_str())
        .bind(reason)
        .fetch_one(executor)
        .await?;
        Ok(log)
    }

    pub async fn list_appeal_logs(&self, company_id: Uuid) -> Result<Vec<CompanyAppealLog>, AppError> {
        let logs = sqlx::query_as::<_, CompanyAppealLog>(
            r#"
            SELECT id, company_id, user_id, status_to, reason, created_at
            FROM company_appeal_logs
            WHERE company_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    /// Consulta do relatório. A coluna/direção do ORDER BY vêm de enums
    /// (lista branca); os filtros entram como bind.
    pub async fn export(&self, filter: &CompanyExportFilter) -> Result<Vec<Company>, AppError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM companies WHERE TRUE", COMPANY_COLUMNS));

        if let Some(is_active) = filter.is_active {
            qb.push(" AND is_active = ").push_bind(is_active);
        }
        if let Some(start) = filter.start_date {
            qb.push(" AND created_at::date >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND created_at::date <= ").push_bind(end);
        }

        qb.push(format!(
            " ORDER BY {} {}, id ASC",
            filter.sort_by.column(),
            filter.sort_dir.keyword()
        ));

        let companies = qb.build_query_as::<Company>().fetch_all(&self.pool).await?;
        Ok(companies)
    }
}
