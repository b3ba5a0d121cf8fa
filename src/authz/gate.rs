// src/authz/gate.rs

use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    authz::matcher::PermissionMatcher, common::error::AppError, models::rbac::RoleGrantRow,
};

/// Papel global que funciona como super-admin.
pub const SUPER_ADMIN_ROLE: &str = "admin";

/// Papel global dado ao dono no cadastro da empresa.
pub const COMPANY_ROLE: &str = "company";

/// Nomes que só existem como papéis globais.
pub fn is_reserved_role_name(name: &str) -> bool {
    let name = name.trim();
    name.eq_ignore_ascii_case(SUPER_ADMIN_ROLE) || name.eq_ignore_ascii_case(COMPANY_ROLE)
}

/// Como uma rota é protegida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Sem autenticação.
    Public,
    /// Basta estar autenticado.
    Authenticated,
    /// A chave exigida é o próprio nome da rota, resolvido pelo catálogo.
    RouteName,
    /// `company_can:<permissão>`: a chave exigida é o nome da permissão.
    Permission(&'static str),
    /// `role:<papel>`.
    Role(&'static str),
}

impl Access {
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Access::Public)
    }
}

/// Tudo que o usuário acumula no escopo atual (empresa + workspace).
#[derive(Debug, Default, Clone)]
pub struct Grants {
    pub is_super_admin: bool,
    pub roles: HashSet<String>,
    /// Só os papéis sem empresa e sem workspace; é o que `role:<papel>` consulta.
    pub global_roles: HashSet<String>,
    pub permission_ids: HashSet<Uuid>,
    pub permission_names: HashSet<String>,
}

fn is_global_row(row: &RoleGrantRow) -> bool {
    row.role_company_id.is_none() && row.role_workspace_id.is_none()
}

/// Papel `admin` global (sem empresa e sem workspace).
pub fn is_super_admin_row(row: &RoleGrantRow) -> bool {
    is_global_row(row) && row.role_name == SUPER_ADMIN_ROLE
}

impl Grants {
    pub fn super_admin() -> Self {
        Self { is_super_admin: true, ..Default::default() }
    }

    /// Junta as linhas papel/permissão que valem para o escopo pedido.
    /// Um papel vale se a empresa dele é nula ou a do usuário, e o
    /// workspace dele é nulo ou o da rota.
    pub fn from_rows(
        rows: impl IntoIterator<Item = RoleGrantRow>,
        company_id: Option<Uuid>,
        workspace_id: Option<Uuid>,
    ) -> Self {
        let mut grants = Grants::default();

        for row in rows {
            let company_ok = row.role_company_id.is_none() || row.role_company_id == company_id;
            let workspace_ok = row.role_workspace_id.is_none() || row.role_workspace_id == workspace_id;
            if !(company_ok && workspace_ok) {
                continue;
            }

            if is_super_admin_row(&row) {
                grants.is_super_admin = true;
            }

            if is_global_row(&row) {
                grants.global_roles.insert(row.role_name.clone());
            }

            if let Some(id) = row.permission_id {
                grants.permission_ids.insert(id);
            }
            if let Some(name) = row.permission_name {
                grants.permission_names.insert(name);
            }
            grants.roles.insert(row.role_name);
        }

        grants
    }
}

/// Decide se o usuário passa pela rota.
///
/// O super-admin é avaliado antes de qualquer outra coisa e libera tudo,
/// inclusive sem nenhuma permissão atribuída.
pub fn authorize(
    access: Access,
    route_name: Option<&str>,
    grants: &Grants,
    matcher: &PermissionMatcher,
) -> Result<(), AppError> {
    if grants.is_super_admin {
        return Ok(());
    }

    match access {
        Access::Public | Access::Authenticated => Ok(()),
        // Papel homônimo criado dentro de uma empresa não conta
        Access::Role(role) => {
            if grants.global_roles.contains(role) {
                Ok(())
            } else {
                Err(AppError::RoleRequired(role.to_string()))
            }
        }
        Access::RouteName => match matcher.find_guarding_permission(route_name) {
            // Rota sem permissão cadastrada: aberta a qualquer autenticado
            None => Ok(()),
            Some(permission) if grants.permission_ids.contains(&permission.id) => Ok(()),
            Some(permission) => Err(AppError::PermissionDenied(permission.name.clone())),
        },
        Access::Permission(key) => {
            if grants.permission_names.contains(key) {
                Ok(())
            } else {
                Err(AppError::PermissionDenied(key.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::matcher::tests::permission;

    fn row(role: &str, company: Option<u128>, workspace: Option<u128>, perm: Option<(u128, &str)>) -> RoleGrantRow {
        RoleGrantRow {
            role_name: role.to_string(),
            role_company_id: company.map(Uuid::from_u128),
            role_workspace_id: workspace.map(Uuid::from_u128),
            permission_id: perm.map(|(id, _)| Uuid::from_u128(id)),
            permission_name: perm.map(|(_, name)| name.to_string()),
        }
    }

    fn matcher() -> PermissionMatcher {
        PermissionMatcher::build(vec![
            permission(1, "tasks.manage", None, Some(&["tasks.*", "subtasks.*"])),
            permission(2, "tasks.view", Some("tasks.index"), None),
            permission(3, "roles.manage", None, None),
        ])
    }

    #[test]
    fn super_admin_passes_every_gate_without_permissions() {
        let grants = Grants::super_admin();
        let m = matcher();
        for access in [
            Access::RouteName,
            Access::Permission("roles.manage"),
            Access::Role("admin"),
            Access::Role("qualquer"),
        ] {
            assert!(authorize(access, Some("subtasks.toggle"), &grants, &m).is_ok());
        }
    }

    #[test]
    fn route_name_requires_the_guarding_permission() {
        let m = matcher();
        let grants = Grants::from_rows(vec![row("member", Some(5), None, Some((2, "tasks.view")))], Some(Uuid::from_u128(5)), None);

        assert!(authorize(Access::RouteName, Some("tasks.index"), &grants, &m).is_ok());
        let err = authorize(Access::RouteName, Some("tasks.store"), &grants, &m).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(ref p) if p == "tasks.manage"));
    }

    #[test]
    fn unguarded_route_is_open_to_authenticated_users() {
        let grants = Grants::default();
        assert!(authorize(Access::RouteName, Some("profile.show"), &grants, &matcher()).is_ok());
        assert!(authorize(Access::RouteName, None, &grants, &matcher()).is_ok());
    }

    #[test]
    fn explicit_permission_key_checks_by_name() {
        let m = matcher();
        let with = Grants::from_rows(vec![row("company", None, None, Some((3, "roles.manage")))], None, None);
        let without = Grants::default();
        assert!(authorize(Access::Permission("roles.manage"), Some("roles.index"), &with, &m).is_ok());
        assert!(authorize(Access::Permission("roles.manage"), Some("roles.index"), &without, &m).is_err());
    }

    #[test]
    fn roles_from_other_scopes_are_ignored() {
        let rows = vec![
            row("member", Some(5), None, Some((2, "tasks.view"))),
            row("intruso", Some(6), None, Some((1, "tasks.manage"))),
            row("ws-admin", Some(5), Some(9), Some((1, "tasks.manage"))),
        ];

        // Fora do workspace 9: só o papel da empresa 5
        let grants = Grants::from_rows(rows.clone(), Some(Uuid::from_u128(5)), None);
        assert!(grants.permission_names.contains("tasks.view"));
        assert!(!grants.permission_names.contains("tasks.manage"));

        // Dentro do workspace 9: soma o papel do workspace
        let grants = Grants::from_rows(rows, Some(Uuid::from_u128(5)), Some(Uuid::from_u128(9)));
        assert!(grants.permission_names.contains("tasks.manage"));
        assert!(!grants.roles.contains("intruso"));
    }

    #[test]
    fn global_admin_role_flags_super_admin() {
        let grants = Grants::from_rows(vec![row(SUPER_ADMIN_ROLE, None, None, None)], None, None);
        assert!(grants.is_super_admin);

        // Um papel "admin" de uma empresa não é super-admin
        let scoped = Grants::from_rows(vec![row(SUPER_ADMIN_ROLE, Some(5), None, None)], Some(Uuid::from_u128(5)), None);
        assert!(!scoped.is_super_admin);
    }

    #[test]
    fn tenant_role_named_like_a_global_one_does_not_open_role_gates() {
        let five = Some(Uuid::from_u128(5));
        let grants = Grants::from_rows(vec![row(SUPER_ADMIN_ROLE, Some(5), None, None)], five, None);
        assert!(grants.roles.contains(SUPER_ADMIN_ROLE));

        let err = authorize(Access::Role("admin"), Some("companies.index"), &grants, &matcher()).unwrap_err();
        assert!(matches!(err, AppError::RoleRequired(_)));

        let ws = Grants::from_rows(vec![row(SUPER_ADMIN_ROLE, Some(5), Some(9), None)], five, Some(Uuid::from_u128(9)));
        assert!(authorize(Access::Role("admin"), Some("companies.index"), &ws, &matcher()).is_err());
    }

    #[test]
    fn global_role_opens_its_gate() {
        let grants = Grants::from_rows(vec![row(COMPANY_ROLE, None, None, None)], Some(Uuid::from_u128(5)), None);
        assert!(authorize(Access::Role(COMPANY_ROLE), Some("profile.show"), &grants, &matcher()).is_ok());
    }

    #[test]
    fn reserved_role_names_ignore_case_and_spaces() {
        assert!(is_reserved_role_name("admin"));
        assert!(is_reserved_role_name(" Company "));
        assert!(!is_reserved_role_name("Coordenador"));
    }

    #[test]
    fn role_gate_denies_missing_role() {
        let err = authorize(Access::Role("admin"), Some("companies.index"), &Grants::default(), &matcher()).unwrap_err();
        assert!(matches!(err, AppError::RoleRequired(_)));
    }
}
