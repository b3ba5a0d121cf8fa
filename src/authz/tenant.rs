// src/authz/tenant.rs

use uuid::Uuid;

use crate::{common::error::AppError, models::company::Company};

/// Até onde vão os dados que o usuário pode enxergar.
#[derive(Debug, Clone)]
pub enum TenantScope {
    /// Super-admin: sem restrição de empresa.
    Unrestricted,
    Company(Company),
}

impl TenantScope {
    pub fn company_id(&self) -> Option<Uuid> {
        match self {
            TenantScope::Unrestricted => None,
            TenantScope::Company(company) => Some(company.id),
        }
    }

    /// O recurso (identificado pela empresa dona) pertence ao escopo?
    pub fn ensure_owns(&self, owner_company_id: Uuid) -> Result<(), AppError> {
        match self {
            TenantScope::Unrestricted => Ok(()),
            TenantScope::Company(company) if company.id == owner_company_id => Ok(()),
            TenantScope::Company(_) => Err(AppError::TenantMismatch),
        }
    }
}

/// Regra de resolução: super-admin não tem escopo; os demais usam a empresa
/// da qual são membros e, na falta dela, a empresa da qual são donos.
pub fn resolve(
    is_super_admin: bool,
    member_of: Option<Company>,
    owner_of: Option<Company>,
) -> Result<TenantScope, AppError> {
    if is_super_admin {
        return Ok(TenantScope::Unrestricted);
    }

    member_of
        .or(owner_of)
        .map(TenantScope::Company)
        .ok_or(AppError::TenantNotResolved)
}
