// src/docs.rs

use axum::Json;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Profile ---
        handlers::profile::show,
        handlers::profile::update,

        // --- Companies ---
        handlers::companies::index,
        handlers::companies::store,
        handlers::companies::show,
        handlers::companies::change_status,
        handlers::companies::appeals,

        // --- Reports ---
        handlers::reports::export_companies,

        // --- RBAC ---
        handlers::rbac::list_permissions,
        handlers::rbac::create_permission,
        handlers::rbac::update_permission,
        handlers::rbac::list_roles,
        handlers::rbac::create_role,
        handlers::rbac::assign_role,

        // --- Workspaces ---
        handlers::workspaces::index,
        handlers::workspaces::store,
        handlers::workspaces::show,
        handlers::workspaces::list_projects,
        handlers::workspaces::create_project,

        // --- Tasks ---
        handlers::tasks::index,
        handlers::tasks::store,
        handlers::tasks::show,
        handlers::tasks::store_sub_task,
        handlers::tasks::toggle_sub_task,
        handlers::tasks::destroy_sub_task,

        // --- Timesheets ---
        handlers::timesheets::index,
        handlers::timesheets::store,
        handlers::timesheets::store_entry,
        handlers::timesheets::destroy_entry,
        handlers::timesheets::approve,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Companies ---
            models::company::Company,
            models::company::Category,
            models::company::AppealStatus,
            models::company::CompanyAppealLog,
            models::company::ChangeStatusPayload,
            models::company::ProfileResponse,

            // --- RBAC ---
            models::rbac::PermissionKind,
            models::rbac::PermissionScope,
            models::rbac::Permission,
            models::rbac::Role,
            models::rbac::PermissionPayload,
            models::rbac::CreateRolePayload,
            models::rbac::AssignRolePayload,
            models::rbac::RoleResponse,

            // --- Workspaces ---
            models::workspace::Workspace,
            models::workspace::Project,
            models::workspace::TaskStatus,
            models::workspace::Task,
            models::workspace::SubTask,
            models::workspace::TaskDetail,
            models::workspace::CreateWorkspacePayload,
            models::workspace::CreateProjectPayload,
            models::workspace::CreateTaskPayload,
            models::workspace::CreateSubTaskPayload,

            // --- Timesheets ---
            models::timesheet::TimesheetStatus,
            models::timesheet::ApprovalDecision,
            models::timesheet::Timesheet,
            models::timesheet::TimesheetEntry,
            models::timesheet::TimesheetApproval,
            models::timesheet::CreateTimesheetPayload,
            models::timesheet::CreateEntryPayload,
            models::timesheet::ApprovalPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Profile", description = "Perfil do usuário e da empresa"),
        (name = "Companies", description = "Gestão de empresas (super-admin)"),
        (name = "Reports", description = "Exportações"),
        (name = "RBAC", description = "Controle de Acesso (Cargos e Permissões)"),
        (name = "Workspaces", description = "Workspaces e Projetos"),
        (name = "Tasks", description = "Tarefas e Subtarefas"),
        (name = "Timesheets", description = "Folhas de horas e aprovação")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
