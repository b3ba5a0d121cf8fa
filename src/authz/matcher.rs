// src/authz/matcher.rs

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashMap;

use crate::models::rbac::Permission;

/// Casa nomes de rota com o catálogo de permissões.
///
/// É montado uma única vez a partir de uma "foto" do catálogo: os padrões
/// glob das permissões de grupo ficam compilados e nada é reprocessado a cada
/// requisição. Precedência quando mais de uma permissão casa:
/// 1. `route_name` exato sempre vence um padrão de grupo;
/// 2. entre candidatas do mesmo tipo, vence o menor id.
#[derive(Debug, Default)]
pub struct PermissionMatcher {
    permissions: Vec<Permission>,
    exact: HashMap<String, usize>,
    groups: Vec<(GlobSet, usize)>,
}

impl PermissionMatcher {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build(mut permissions: Vec<Permission>) -> Self {
        permissions.sort_by_key(|p| p.id);

        let mut exact = HashMap::new();
        let mut groups = Vec::new();

        for (idx, permission) in permissions.iter().enumerate() {
            if let Some(route_name) = permission.route_name.as_deref().filter(|r| !r.is_empty()) {
                // Ordenado por id: o primeiro a entrar é o de menor id
                exact.entry(route_name.to_string()).or_insert(idx);
            }

            if permission.is_group {
                match compile_patterns(permission.group_patterns()) {
                    Ok(Some(set)) => groups.push((set, idx)),
                    Ok(None) => {
                        tracing::warn!(permission = %permission.name, "Permissão de grupo sem padrões; ignorada.");
                    }
                    Err(e) => {
                        tracing::warn!(permission = %permission.name, "Padrão glob inválido ignorado: {}", e);
                    }
                }
            }
        }

        Self { permissions, exact, groups }
    }

    /// Permissão que protege a rota. Rotas sem nome nunca são protegidas.
    pub fn find_guarding_permission(&self, route_name: Option<&str>) -> Option<&Permission> {
        let route_name = route_name.filter(|r| !r.is_empty())?;

        if let Some(&idx) = self.exact.get(route_name) {
            return Some(&self.permissions[idx]);
        }

        self.groups
            .iter()
            .find(|(set, _)| set.is_match(route_name))
            .map(|(_, idx)| &self.permissions[*idx])
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Option<GlobSet>, globset::Error> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(Some(builder.build()?))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::rbac::{PermissionKind, PermissionScope};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sqlx::types::Json;
    use uuid::Uuid;

    pub(crate) fn permission(id: u128, name: &str, route_name: Option<&str>, group: Option<&[&str]>) -> Permission {
        Permission {
            id: Uuid::from_u128(id),
            name: name.to_string(),
            module: "TEST".to_string(),
            kind: PermissionKind::General,
            scope: PermissionScope::Company,
            price: Decimal::ZERO,
            route_name: route_name.map(String::from),
            route_path: None,
            controller_action: None,
            icon: None,
            is_menu: false,
            is_group: group.is_some(),
            group_routes: group.map(|g| Json(g.iter().map(|s| s.to_string()).collect())),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn exact_route_name_matches() {
        let matcher = PermissionMatcher::build(vec![permission(1, "tasks.view", Some("tasks.index"), None)]);
        let found = matcher.find_guarding_permission(Some("tasks.index")).expect("deve casar");
        assert_eq!(found.name, "tasks.view");
        assert!(matcher.find_guarding_permission(Some("tasks.store")).is_none());
    }

    #[test]
    fn group_patterns_use_glob_semantics() {
        let matcher = PermissionMatcher::build(vec![permission(
            1,
            "tasks.manage",
            None,
            Some(&["tasks.*", "subtasks.*"]),
        )]);
        assert!(matcher.find_guarding_permission(Some("subtasks.toggle")).is_some());
        assert!(matcher.find_guarding_permission(Some("tasks.store")).is_some());
        assert!(matcher.find_guarding_permission(Some("projects.index")).is_none());
        // Sensível a maiúsculas
        assert!(matcher.find_guarding_permission(Some("Tasks.store")).is_none());
    }

    #[test]
    fn unnamed_routes_are_never_guarded() {
        let matcher = PermissionMatcher::build(vec![permission(1, "all", None, Some(&["*"]))]);
        assert!(matcher.find_guarding_permission(None).is_none());
        assert!(matcher.find_guarding_permission(Some("")).is_none());
        assert!(matcher.find_guarding_permission(Some("qualquer.coisa")).is_some());
    }

    #[test]
    fn exact_match_wins_over_group_regardless_of_id() {
        let matcher = PermissionMatcher::build(vec![
            permission(1, "tasks.manage", None, Some(&["tasks.*"])),
            permission(9, "tasks.view", Some("tasks.index"), None),
        ]);
        let found = matcher.find_guarding_permission(Some("tasks.index")).unwrap();
        assert_eq!(found.name, "tasks.view");
    }

    #[test]
    fn lowest_id_wins_between_groups() {
        // A ordem de entrada não importa, só o id
        let matcher = PermissionMatcher::build(vec![
            permission(5, "b.group", None, Some(&["reports.*"])),
            permission(2, "a.group", None, Some(&["reports.company.*"])),
        ]);
        let found = matcher.find_guarding_permission(Some("reports.company.export")).unwrap();
        assert_eq!(found.name, "a.group");
    }

    #[test]
    fn group_flag_without_patterns_is_ignored() {
        let mut p = permission(1, "broken", None, Some(&[]));
        p.is_group = true;
        let matcher = PermissionMatcher::build(vec![p]);
        assert!(matcher.find_guarding_permission(Some("broken.index")).is_none());
    }

    #[test]
    fn patterns_ignored_when_not_a_group() {
        let mut p = permission(1, "not-group", None, Some(&["tasks.*"]));
        p.is_group = false;
        let matcher = PermissionMatcher::build(vec![p]);
        assert!(matcher.find_guarding_permission(Some("tasks.index")).is_none());
    }
}
