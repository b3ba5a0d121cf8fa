pub mod auth;
pub mod company;
pub mod rbac;
pub mod report;
pub mod timesheet;
pub mod workspace;
