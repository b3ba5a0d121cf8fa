pub mod user_repo;
pub use user_repo::UserRepository;
pub mod company_repo;
pub use company_repo::CompanyRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod workspace_repo;
pub use workspace_repo::WorkspaceRepository;
pub mod hierarchy_repo;
pub use hierarchy_repo::HierarchyRepository;
pub mod timesheet_repo;
pub use timesheet_repo::TimesheetRepository;
