// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, path::PathBuf, time::Duration};

use crate::{
    common::storage::LocalStorage,
    db::{
        CompanyRepository, HierarchyRepository, RbacRepository, TimesheetRepository, UserRepository,
        WorkspaceRepository,
    },
    events::EventBus,
    services::{
        auth::AuthService, company_service::CompanyService, hierarchy_service::HierarchyAuthorizer,
        rbac_service::{PermissionRegistry, RbacService}, report_service::ReportService,
        tenancy_service::TenantService, timesheet_service::TimesheetService,
        workspace_service::WorkspaceService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub storage_dir: PathBuf,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let storage_dir = env::var("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./storage"));

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {}", raw))?,
            Err(_) => 5,
        };

        Ok(Self { database_url, jwt_secret, bind_addr, storage_dir, db_max_connections })
    }
}

pub async fn connect_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub hierarchy: HierarchyAuthorizer,
    pub company_service: CompanyService,
    pub rbac_repo: RbacRepository,
    pub rbac_service: RbacService,
    pub permissions: PermissionRegistry,
    pub workspace_service: WorkspaceService,
    pub timesheet_service: TimesheetService,
    pub report_service: ReportService,
}

impl AppState {
    // Monta o gráfico de dependências. Não toca no banco: o catálogo de
    // permissões é carregado depois, com `permissions.reload`.
    pub fn new(config: &Config, db_pool: PgPool) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let workspace_repo = WorkspaceRepository::new(db_pool.clone());
        let timesheet_repo = TimesheetRepository::new(db_pool.clone());

        let events = EventBus::with_defaults(company_repo.clone(), timesheet_repo.clone());
        let storage = LocalStorage::new(config.storage_dir.clone());
        let permissions = PermissionRegistry::new();

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone());
        let tenant_service = TenantService::new(company_repo.clone());
        let hierarchy = HierarchyAuthorizer::new(
            HierarchyRepository::new(db_pool.clone()),
            tenant_service.clone(),
        );

        let company_service = CompanyService::new(
            company_repo.clone(),
            user_repo.clone(),
            rbac_repo.clone(),
            tenant_service.clone(),
            storage,
            events.clone(),
            db_pool.clone(),
        );

        let rbac_service = RbacService::new(
            rbac_repo.clone(),
            user_repo,
            workspace_repo.clone(),
            tenant_service.clone(),
            permissions.clone(),
            db_pool.clone(),
        );

        let workspace_service = WorkspaceService::new(workspace_repo.clone(), rbac_repo.clone(), db_pool.clone());
        let timesheet_service = TimesheetService::new(timesheet_repo, workspace_repo, events, db_pool.clone());
        let report_service = ReportService::new(company_repo);

        Self {
            db_pool,
            auth_service,
            tenant_service,
            hierarchy,
            company_service,
            rbac_repo,
            rbac_service,
            permissions,
            workspace_service,
            timesheet_service,
            report_service,
        }
    }
}
