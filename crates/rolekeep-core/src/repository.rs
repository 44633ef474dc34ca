//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and take the store handle from the
//! implementing type, never from global state. Name filters are
//! case-insensitive substring matches.

use uuid::Uuid;

use crate::error::RolekeepResult;
use crate::models::{
    organization::{CreateOrganization, Organization},
    permission::{BulkDeleteResult, BulkUpsertResult, Permission, PermissionKey, UpsertPermission},
    user::{CreateUser, User},
};

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` when a caller-supplied id is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = RolekeepResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RolekeepResult<User>> + Send;
    fn list(&self, name: Option<&str>) -> impl Future<Output = RolekeepResult<Vec<User>>> + Send;
}

pub trait OrganizationRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the name is taken.
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = RolekeepResult<Organization>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = RolekeepResult<Organization>> + Send;
    fn list(
        &self,
        name: Option<&str>,
    ) -> impl Future<Output = RolekeepResult<Vec<Organization>>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    /// Insert or overwrite a batch of permissions.
    ///
    /// The batch is validated in full before any write; repeated keys
    /// resolve to the last entry.
    fn bulk_upsert(
        &self,
        entries: Vec<UpsertPermission>,
    ) -> impl Future<Output = RolekeepResult<BulkUpsertResult>> + Send;

    /// Delete a batch of permissions by key. Keys that match nothing are
    /// reported in `not_found` rather than failing the request.
    fn bulk_delete(
        &self,
        keys: Vec<PermissionKey>,
    ) -> impl Future<Output = RolekeepResult<BulkDeleteResult>> + Send;

    fn get(&self, key: &PermissionKey) -> impl Future<Output = RolekeepResult<Permission>> + Send;

    /// All stored permissions, ordered by `(user_id, org_name)`.
    fn list(&self) -> impl Future<Output = RolekeepResult<Vec<Permission>>> + Send;
}
