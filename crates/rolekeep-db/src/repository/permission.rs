//! SurrealDB implementation of [`PermissionRepository`].
//!
//! A permission's record key is derived from its `(user_id, org_name)`
//! pair, so an `UPSERT` on that record is an insert-or-replace on the
//! natural key. A bulk write first validates and de-duplicates the batch,
//! reads which keys already exist, then sends all writes as a single
//! transaction and reads back the final state.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use rolekeep_core::batch::{dedupe_keys, dedupe_upserts, validate_keys, validate_upserts};
use rolekeep_core::error::{RolekeepError, RolekeepResult};
use rolekeep_core::models::permission::{
    BulkDeleteResult, BulkUpsertResult, Permission, PermissionKey, UpsertPermission,
};
use rolekeep_core::repository::PermissionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

const UPSERT_BATCH: &str = "\
BEGIN TRANSACTION;
FOR $entry IN $entries {
    UPSERT type::record('permission', $entry.record_id) SET \
        user_id = $entry.user_id, \
        org_name = $entry.org_name, \
        role = $entry.role, \
        updated_at = time::now();
};
COMMIT TRANSACTION;
";

const DELETE_BATCH: &str = "\
BEGIN TRANSACTION;
FOR $record_id IN $record_ids {
    DELETE type::record('permission', $record_id);
};
COMMIT TRANSACTION;
";

#[derive(Debug, SurrealValue)]
struct PermissionRow {
    user_id: String,
    org_name: String,
    role: String,
    updated_at: DateTime<Utc>,
}

impl PermissionRow {
    fn key(&self) -> PermissionKey {
        PermissionKey::new(&self.user_id, &self.org_name)
    }
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Permission {
            user_id: row.user_id,
            org_name: row.org_name,
            role: row.role,
            updated_at: row.updated_at,
        }
    }
}

/// One element of the `$entries` parameter of [`UPSERT_BATCH`].
#[derive(Debug, SurrealValue)]
struct PermissionWrite {
    record_id: String,
    user_id: String,
    org_name: String,
    role: String,
}

impl From<UpsertPermission> for PermissionWrite {
    fn from(entry: UpsertPermission) -> Self {
        Self {
            record_id: permission_record_id(&entry.key()),
            user_id: entry.user_id,
            org_name: entry.org_name,
            role: entry.role,
        }
    }
}

/// Deterministic record key for a permission.
///
/// A UUIDv5 over `"{len(user_id)}:{user_id}{org_name}"`. The byte-length
/// prefix fixes where `user_id` ends, so distinct pairs never share a name.
pub fn permission_record_id(key: &PermissionKey) -> String {
    let name = format!("{}:{}{}", key.user_id.len(), key.user_id, key.org_name);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
    /// Accepted roles. Empty accepts any non-empty role.
    allowed_roles: Vec<String>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            allowed_roles: Vec::new(),
        }
    }

    pub fn with_allowed_roles(db: Surreal<C>, allowed_roles: Vec<String>) -> Self {
        Self { db, allowed_roles }
    }

    /// Load the stored rows for `keys`, indexed by key.
    ///
    /// The query matches on the cross product of the requested user ids and
    /// org names; rows outside the requested pairs are dropped here.
    async fn load(
        &self,
        keys: &[PermissionKey],
    ) -> Result<HashMap<PermissionKey, PermissionRow>, DbError> {
        let user_ids: Vec<String> = keys
            .iter()
            .map(|k| k.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let org_names: Vec<String> = keys
            .iter()
            .map(|k| k.org_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut result = self
            .db
            .query(
                "SELECT * FROM permission \
                 WHERE user_id IN $user_ids AND org_name IN $org_names",
            )
            .bind(("user_ids", user_ids))
            .bind(("org_names", org_names))
            .await?;

        let rows: Vec<PermissionRow> = result.take(0)?;

        let requested: HashSet<&PermissionKey> = keys.iter().collect();
        Ok(rows
            .into_iter()
            .map(|row| (row.key(), row))
            .filter(|(key, _)| requested.contains(key))
            .collect())
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn bulk_upsert(
        &self,
        entries: Vec<UpsertPermission>,
    ) -> RolekeepResult<BulkUpsertResult> {
        validate_upserts(&entries, &self.allowed_roles)?;

        let submitted = entries.len();
        let entries = dedupe_upserts(entries);
        let keys: Vec<PermissionKey> = entries.iter().map(UpsertPermission::key).collect();

        let updated = self.load(&keys).await?.len() as u64;
        let created = keys.len() as u64 - updated;

        let writes: Vec<PermissionWrite> = entries.into_iter().map(PermissionWrite::from).collect();

        self.db
            .query(UPSERT_BATCH)
            .bind(("entries", writes))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("permission", e))?;

        let mut stored = self.load(&keys).await?;
        let permissions = keys
            .iter()
            .map(|key| {
                stored.remove(key).map(Permission::from).ok_or_else(|| {
                    RolekeepError::Internal(format!(
                        "permission missing after upsert: user_id={:?}, org_name={:?}",
                        key.user_id, key.org_name
                    ))
                })
            })
            .collect::<RolekeepResult<Vec<_>>>()?;

        debug!(
            submitted,
            distinct = permissions.len(),
            created,
            updated,
            "Applied permission upsert batch"
        );

        Ok(BulkUpsertResult {
            permissions,
            created,
            updated,
        })
    }

    async fn bulk_delete(&self, keys: Vec<PermissionKey>) -> RolekeepResult<BulkDeleteResult> {
        validate_keys(&keys)?;

        let keys = dedupe_keys(keys);
        let existing = self.load(&keys).await?;

        let (deleted, not_found): (Vec<_>, Vec<_>) = keys
            .into_iter()
            .partition(|key| existing.contains_key(key));

        if !deleted.is_empty() {
            let record_ids: Vec<String> = deleted.iter().map(permission_record_id).collect();

            self.db
                .query(DELETE_BATCH)
                .bind(("record_ids", record_ids))
                .await
                .map_err(DbError::from)?
                .check()
                .map_err(|e| DbError::from_statement("permission", e))?;
        }

        debug!(
            deleted = deleted.len(),
            not_found = not_found.len(),
            "Applied permission delete batch"
        );

        Ok(BulkDeleteResult { deleted, not_found })
    }

    async fn get(&self, key: &PermissionKey) -> RolekeepResult<Permission> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('permission', $id)")
            .bind(("id", permission_record_id(key)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: format!("user_id={},org_name={}", key.user_id, key.org_name),
        })?;

        Ok(row.into())
    }

    async fn list(&self) -> RolekeepResult<Vec<Permission>> {
        let mut result = self
            .db
            .query("SELECT * FROM permission ORDER BY user_id ASC, org_name ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(Permission::from).collect())
    }
}
