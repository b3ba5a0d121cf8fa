// src/authz/hierarchy.rs

use std::{fmt, future::Future};
use uuid::Uuid;

use crate::{authz::tenant::TenantScope, common::error::AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Company,
    Workspace,
    Project,
    Task,
    SubTask,
    Timesheet,
    TimesheetEntry,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Company => "company",
            ResourceKind::Workspace => "workspace",
            ResourceKind::Project => "project",
            ResourceKind::Task => "task",
            ResourceKind::SubTask => "sub_task",
            ResourceKind::Timesheet => "timesheet",
            ResourceKind::TimesheetEntry => "timesheet_entry",
        };
        f.write_str(name)
    }
}

/// Um recurso carregado do banco, com as referências que ele guarda para
/// os seus pais (inclusive as desnormalizadas, como `sub_tasks.project_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: ResourceKind,
    pub id: Uuid,
    pub parents: Vec<(ResourceKind, Uuid)>,
}

impl Node {
    pub fn new(kind: ResourceKind, id: Uuid) -> Self {
        Self { kind, id, parents: Vec::new() }
    }

    pub fn with_parent(mut self, kind: ResourceKind, id: Uuid) -> Self {
        self.parents.push((kind, id));
        self
    }

    pub fn parent(&self, kind: ResourceKind) -> Option<Uuid> {
        self.parents.iter().find(|(k, _)| *k == kind).map(|(_, id)| *id)
    }
}

/// Caminho pedido na URL, do mais externo para o mais interno.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath(Vec<(ResourceKind, Uuid)>);

impl ResourcePath {
    pub fn workspace(id: Uuid) -> Self {
        Self(vec![(ResourceKind::Workspace, id)])
    }

    pub fn then(mut self, kind: ResourceKind, id: Uuid) -> Self {
        self.0.push((kind, id));
        self
    }

    pub fn segments(&self) -> &[(ResourceKind, Uuid)] {
        &self.0
    }
}

/// Fase 1: coerência estrutural.
///
/// `nodes[i]` é o resultado da busca de `path[i]` (`None` = não existe).
/// Cada nó precisa apontar para o segmento imediatamente anterior, e toda
/// referência que ele guarde para outro segmento do caminho precisa bater.
/// Qualquer divergência é `ResourceNotFound`, igual a um recurso inexistente.
pub fn validate_structure(path: &ResourcePath, nodes: &[Option<Node>]) -> Result<(), AppError> {
    let segments = path.segments();
    if nodes.len() != segments.len() {
        return Err(AppError::ResourceNotFound);
    }

    for (i, ((kind, id), node)) in segments.iter().zip(nodes).enumerate() {
        let node = node.as_ref().ok_or(AppError::ResourceNotFound)?;
        if node.kind != *kind || node.id != *id {
            return Err(AppError::ResourceNotFound);
        }

        if i == 0 {
            continue;
        }

        let (parent_kind, parent_id) = segments[i - 1];
        if node.parent(parent_kind) != Some(parent_id) {
            tracing::debug!(
                "Hierarquia inválida: {} {} não pertence a {} {}",
                kind, id, parent_kind, parent_id
            );
            return Err(AppError::ResourceNotFound);
        }

        for (ancestor_kind, ancestor_id) in &segments[..i - 1] {
            if let Some(stored) = node.parent(*ancestor_kind) {
                if stored != *ancestor_id {
                    return Err(AppError::ResourceNotFound);
                }
            }
        }
    }

    Ok(())
}

/// Empresa dona do caminho (a do nó mais externo).
pub fn owning_company(nodes: &[Option<Node>]) -> Option<Uuid> {
    nodes
        .first()
        .and_then(|n| n.as_ref())
        .and_then(|n| n.parent(ResourceKind::Company))
}

/// Fase 1 e depois fase 2 (posse). A ordem é fixa: uma URL malformada
/// nunca chega à checagem de empresa.
/// `scope` só é chamado (e o tenant só é resolvido) depois da fase 1.
pub async fn authorize_path<F, Fut>(
    path: &ResourcePath,
    nodes: &[Option<Node>],
    scope: F,
) -> Result<(), AppError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<TenantScope, AppError>>,
{
    validate_structure(path, nodes)?;

    let owner = owning_company(nodes).ok_or(AppError::ResourceNotFound)?;
    scope().await?.ensure_owns(owner)
}
