// src/services/tenancy_service.rs

use crate::{
    authz::tenant::{self, TenantScope},
    common::error::AppError,
    db::CompanyRepository,
    models::{
        auth::{Actor, User},
        company::Company,
    },
};

/// Resolve a empresa (tenant) do usuário.
#[derive(Clone)]
pub struct TenantService {
    company_repo: CompanyRepository,
}

impl TenantService {
    pub fn new(company_repo: CompanyRepository) -> Self {
        Self { company_repo }
    }

    /// Empresa do usuário: a de que é membro e, na falta dela, a de que é dono.
    pub async fn find_company(&self, user: &User) -> Result<Option<Company>, AppError> {
        if user.company_id.is_some() {
            if let Some(company) = self.company_repo.find_by_member(user.id).await? {
                return Ok(Some(company));
            }
        }
        self.company_repo.find_owned_by(user.id).await
    }

    pub async fn resolve(&self, actor: &Actor) -> Result<TenantScope, AppError> {
        if actor.is_super_admin {
            return Ok(TenantScope::Unrestricted);
        }

        let company = self.find_company(&actor.user).await?;
        if company.is_none() {
            tracing::warn!(user_id = %actor.id(), "Usuário sem empresa vinculada");
        }
        tenant::resolve(false, company, None)
    }
}
