//! Permission domain model.
//!
//! A permission grants a user a role within an organization. There is no
//! generated identifier: the `(user_id, org_name)` pair is the identity,
//! and at most one permission exists per pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Permission {
    /// Referenced user. Not checked against the user table.
    pub user_id: String,
    /// Referenced organization name. Not checked against the organization table.
    pub org_name: String,
    /// Access level, e.g. `READ`, `WRITE`, `ADMIN`.
    pub role: String,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    pub fn key(&self) -> PermissionKey {
        PermissionKey::new(&self.user_id, &self.org_name)
    }
}

/// Natural key of a permission.
///
/// Extra fields in the request body (such as a `role` on delete) are ignored.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub struct PermissionKey {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub org_name: String,
}

impl PermissionKey {
    pub fn new(user_id: impl Into<String>, org_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            org_name: org_name.into(),
        }
    }
}

/// One entry of a bulk upsert request.
///
/// Missing fields deserialize as empty strings so that batch validation
/// can report which entry is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpsertPermission {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub org_name: String,
    #[serde(default)]
    pub role: String,
}

impl UpsertPermission {
    pub fn new(
        user_id: impl Into<String>,
        org_name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            org_name: org_name.into(),
            role: role.into(),
        }
    }

    pub fn key(&self) -> PermissionKey {
        PermissionKey::new(&self.user_id, &self.org_name)
    }
}

/// Outcome of a bulk upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkUpsertResult {
    /// Final state of every distinct key in the batch, in first-appearance order.
    pub permissions: Vec<Permission>,
    /// Keys that had no permission before the batch.
    pub created: u64,
    /// Keys whose existing permission was overwritten.
    pub updated: u64,
}

/// Outcome of a bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteResult {
    pub deleted: Vec<PermissionKey>,
    /// Keys that matched nothing. Not an error.
    pub not_found: Vec<PermissionKey>,
}

impl BulkDeleteResult {
    pub fn deleted_count(&self) -> u64 {
        self.deleted.len() as u64
    }
}
