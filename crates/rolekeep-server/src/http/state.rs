//! Application state for HTTP handlers.

use rolekeep_db::repository::{
    SurrealOrganizationRepository, SurrealPermissionRepository, SurrealUserRepository,
};
use surrealdb::{Connection, Surreal};

/// Repositories shared by all handlers.
///
/// Every repository holds a clone of the same store handle; there is no
/// other shared state between requests.
#[derive(Clone)]
pub struct AppState<C: Connection> {
    pub users: SurrealUserRepository<C>,
    pub orgs: SurrealOrganizationRepository<C>,
    pub permissions: SurrealPermissionRepository<C>,
}

impl<C: Connection> AppState<C> {
    /// State that accepts any non-empty permission role.
    pub fn new(db: Surreal<C>) -> Self {
        Self::with_allowed_roles(db, Vec::new())
    }

    pub fn with_allowed_roles(db: Surreal<C>, allowed_roles: Vec<String>) -> Self {
        Self {
            users: SurrealUserRepository::new(db.clone()),
            orgs: SurrealOrganizationRepository::new(db.clone()),
            permissions: SurrealPermissionRepository::with_allowed_roles(db, allowed_roles),
        }
    }
}
