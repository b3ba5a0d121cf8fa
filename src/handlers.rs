pub mod auth;
pub mod companies;
pub mod profile;
pub mod rbac;
pub mod reports;
pub mod tasks;
pub mod timesheets;
pub mod workspaces;
