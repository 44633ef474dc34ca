//! SurrealDB repository implementations.

mod organization;
mod permission;
mod user;

pub use organization::SurrealOrganizationRepository;
pub use permission::{SurrealPermissionRepository, permission_record_id};
pub use user::SurrealUserRepository;
