pub mod auth;
pub mod company_service;
pub mod hierarchy_service;
pub mod rbac_service;
pub mod report_service;
pub mod route_audit;
pub mod tenancy_service;
pub mod timesheet_service;
pub mod workspace_service;
