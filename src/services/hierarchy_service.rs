// src/services/hierarchy_service.rs

use crate::{
    authz::hierarchy::{authorize_path, ResourcePath},
    common::error::AppError,
    db::HierarchyRepository,
    models::auth::Actor,
    services::tenancy_service::TenantService,
};

/// Checagem única de hierarquia + posse para todas as rotas aninhadas.
#[derive(Clone)]
pub struct HierarchyAuthorizer {
    repo: HierarchyRepository,
    tenants: TenantService,
}

impl HierarchyAuthorizer {
    pub fn new(repo: HierarchyRepository, tenants: TenantService) -> Self {
        Self { repo, tenants }
    }

    pub async fn authorize(&self, actor: &Actor, path: &ResourcePath) -> Result<(), AppError> {
        let mut nodes = Vec::with_capacity(path.segments().len());
        for (kind, id) in path.segments() {
            let node = self.repo.load_node(*kind, *id).await?;
            let missing = node.is_none();
            nodes.push(node);
            // O resto do caminho não importa: já é 404
            if missing {
                break;
            }
        }

        authorize_path(path, &nodes, || self.tenants.resolve(actor)).await
    }
}
