// src/routes.rs

use axum::{
    handler::Handler,
    http::Method,
    middleware as axum_middleware,
    routing::{on, MethodFilter},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{
    authz::gate::Access,
    config::AppState,
    docs, handlers,
    middleware::rbac::route_guard,
};

/// Uma rota registrada: método + caminho (no formato do axum), nome e como é protegida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub method: Method,
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub access: Access,
}

/// Tabela de rotas da aplicação. O axum não tem rotas nomeadas; o guard
/// acha a entrada pelo `MatchedPath` + método.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Arc<[RouteEntry]>,
}

impl RouteTable {
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.method == *method && e.path == path)
    }
}

/// Router que guarda, junto com cada rota, o nome e o modo de acesso.
struct NamedRouter {
    router: Router<AppState>,
    entries: Vec<RouteEntry>,
}

impl NamedRouter {
    fn new() -> Self {
        Self { router: Router::new(), entries: Vec::new() }
    }

    fn add<H, T>(
        mut self,
        method: Method,
        filter: MethodFilter,
        path: &'static str,
        name: Option<&'static str>,
        access: Access,
        handler: H,
    ) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        self.router = self.router.route(path, on(filter, handler));
        self.entries.push(RouteEntry { method, path, name, access });
        self
    }

    fn get<H: Handler<T, AppState>, T: 'static>(self, path: &'static str, name: Option<&'static str>, access: Access, h: H) -> Self {
        self.add(Method::GET, MethodFilter::GET, path, name, access, h)
    }

    fn post<H: Handler<T, AppState>, T: 'static>(self, path: &'static str, name: Option<&'static str>, access: Access, h: H) -> Self {
        self.add(Method::POST, MethodFilter::POST, path, name, access, h)
    }

    fn put<H: Handler<T, AppState>, T: 'static>(self, path: &'static str, name: Option<&'static str>, access: Access, h: H) -> Self {
        self.add(Method::PUT, MethodFilter::PUT, path, name, access, h)
    }

    fn patch<H: Handler<T, AppState>, T: 'static>(self, path: &'static str, name: Option<&'static str>, access: Access, h: H) -> Self {
        self.add(Method::PATCH, MethodFilter::PATCH, path, name, access, h)
    }

    fn delete<H: Handler<T, AppState>, T: 'static>(self, path: &'static str, name: Option<&'static str>, access: Access, h: H) -> Self {
        self.add(Method::DELETE, MethodFilter::DELETE, path, name, access, h)
    }

    fn finish(self) -> (Router<AppState>, RouteTable) {
        (self.router, RouteTable { entries: self.entries.into() })
    }
}

const ADMIN: Access = Access::Role("admin");
const MANAGE_ROLES: Access = Access::Permission("roles.manage");

/// Monta todas as rotas. Não precisa de estado, então a auditoria de
/// rotas usa a mesma tabela sem subir o servidor.
pub fn build() -> (Router<AppState>, RouteTable) {
    use handlers::*;
    use Access::{Authenticated, Public, RouteName};

    NamedRouter::new()
        .get("/api/health", None, Public, || async { "OK" })
        .get("/api/openapi.json", None, Public, docs::openapi_json)
        // --- Auth ---
        .post("/api/auth/register", Some("auth.register"), Public, auth::register)
        .post("/api/auth/login", Some("auth.login"), Public, auth::login)
        // --- Perfil ---
        .get("/api/profile", Some("profile.show"), Authenticated, profile::show)
        .post("/api/profile", Some("profile.update"), Authenticated, profile::update)
        // --- Empresas (admin) ---
        .get("/api/companies", Some("companies.index"), ADMIN, companies::index)
        .post("/api/companies", Some("companies.store"), ADMIN, companies::store)
        .get("/api/companies/{company}", Some("companies.show"), ADMIN, companies::show)
        .patch("/api/companies/{company}/status", Some("companies.status"), ADMIN, companies::change_status)
        .get("/api/companies/{company}/appeals", Some("companies.appeals"), ADMIN, companies::appeals)
        .get("/api/reports/company/export", Some("reports.company.export"), ADMIN, reports::export_companies)
        // --- RBAC ---
        .get("/api/permissions", Some("permissions.index"), ADMIN, rbac::list_permissions)
        .post("/api/permissions", Some("permissions.store"), ADMIN, rbac::create_permission)
        .put("/api/permissions/{permission}", Some("permissions.update"), ADMIN, rbac::update_permission)
        .get("/api/roles", Some("roles.index"), MANAGE_ROLES, rbac::list_roles)
        .post("/api/roles", Some("roles.store"), MANAGE_ROLES, rbac::create_role)
        .post("/api/roles/{role}/users", Some("roles.assign"), MANAGE_ROLES, rbac::assign_role)
        // --- Workspaces / projetos ---
        .get("/api/workspaces", Some("workspaces.index"), RouteName, workspaces::index)
        .post("/api/workspaces", Some("workspaces.store"), RouteName, workspaces::store)
        .get("/api/workspaces/{workspace}", Some("workspaces.show"), RouteName, workspaces::show)
        .get("/api/workspaces/{workspace}/projects", Some("projects.index"), RouteName, workspaces::list_projects)
        .post("/api/workspaces/{workspace}/projects", Some("projects.store"), RouteName, workspaces::create_project)
        // --- Tarefas / subtarefas ---
        .get("/api/workspaces/{workspace}/projects/{project}/tasks", Some("tasks.index"), RouteName, tasks::index)
        .post("/api/workspaces/{workspace}/projects/{project}/tasks", Some("tasks.store"), RouteName, tasks::store)
        .get("/api/workspaces/{workspace}/projects/{project}/tasks/{task}", Some("tasks.show"), RouteName, tasks::show)
        .post(
            "/api/workspaces/{workspace}/projects/{project}/tasks/{task}/subtasks",
            Some("subtasks.store"),
            RouteName,
            tasks::store_sub_task,
        )
        .patch(
            "/api/workspaces/{workspace}/projects/{project}/tasks/{task}/subtasks/{sub_task}/toggle",
            Some("subtasks.toggle"),
            RouteName,
            tasks::toggle_sub_task,
        )
        .delete(
            "/api/workspaces/{workspace}/projects/{project}/tasks/{task}/subtasks/{sub_task}",
            Some("subtasks.destroy"),
            RouteName,
            tasks::destroy_sub_task,
        )
        // --- Timesheets ---
        .get("/api/workspaces/{workspace}/timesheets", Some("timesheets.index"), RouteName, timesheets::index)
        .post("/api/workspaces/{workspace}/timesheets", Some("timesheets.store"), RouteName, timesheets::store)
        .post(
            "/api/workspaces/{workspace}/timesheets/{timesheet}/entries",
            Some("timesheets.entries.store"),
            RouteName,
            timesheets::store_entry,
        )
        .delete(
            "/api/workspaces/{workspace}/timesheets/{timesheet}/entries/{entry}",
            Some("timesheets.entries.destroy"),
            RouteName,
            timesheets::destroy_entry,
        )
        .post(
            "/api/workspaces/{workspace}/timesheets/{timesheet}/approval",
            Some("timesheets.approve"),
            RouteName,
            timesheets::approve,
        )
        .finish()
}

/// Só a tabela (auditoria de rotas).
pub fn table() -> RouteTable {
    build().1
}

/// Aplicação completa: rotas + guard + tracing.
pub fn app(state: AppState) -> Router {
    let (router, table) = build();

    router
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), route_guard))
        .layer(Extension(table))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn route_names_are_unique() {
        let table = table();
        let mut seen = HashSet::new();
        for name in table.entries().iter().filter_map(|e| e.name) {
            assert!(seen.insert(name), "nome repetido: {}", name);
        }
    }

    #[test]
    fn lookup_by_method_and_template() {
        let table = table();
        let entry = table
            .find(&Method::PATCH, "/api/workspaces/{workspace}/projects/{project}/tasks/{task}/subtasks/{sub_task}/toggle")
            .expect("rota registrada");
        assert_eq!(entry.name, Some("subtasks.toggle"));
        assert_eq!(entry.access, Access::RouteName);
        assert!(table.find(&Method::GET, "/api/inexistente").is_none());
    }

    #[test]
    fn only_auth_and_utility_routes_are_public() {
        let public: Vec<&str> = table()
            .entries()
            .iter()
            .filter(|e| !e.access.requires_auth())
            .map(|e| e.path)
            .collect();
        assert_eq!(
            public,
            vec!["/api/health", "/api/openapi.json", "/api/auth/register", "/api/auth/login"]
        );
    }
}
