pub mod gate;
pub mod hierarchy;
pub mod matcher;
pub mod tenant;

pub use gate::{Access, Grants};
pub use hierarchy::{Node, ResourceKind, ResourcePath};
pub use matcher::PermissionMatcher;
pub use tenant::TenantScope;
