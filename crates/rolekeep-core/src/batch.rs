//! Validation and intra-batch de-duplication for permission bulk writes.
//!
//! Every bulk operation runs in two phases: the whole batch is validated
//! first, then it is reduced to one entry per [`PermissionKey`]. Only the
//! reduced batch is handed to storage, so the stored result never depends
//! on the order in which the store applies individual writes.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::error::{RolekeepError, RolekeepResult};
use crate::models::permission::{PermissionKey, UpsertPermission};

/// Maximum number of entries accepted in one bulk request.
pub const MAX_BATCH_SIZE: usize = 1000;

fn check_batch_len(len: usize) -> RolekeepResult<()> {
    if len == 0 {
        return Err(RolekeepError::validation(
            "batch must contain at least one entry",
        ));
    }
    if len > MAX_BATCH_SIZE {
        return Err(RolekeepError::validation(format!(
            "batch size {len} exceeds maximum of {MAX_BATCH_SIZE}"
        )));
    }
    Ok(())
}

fn check_key_fields(index: usize, user_id: &str, org_name: &str) -> RolekeepResult<()> {
    if user_id.trim().is_empty() {
        return Err(RolekeepError::validation(format!(
            "entry {index}: user_id is required"
        )));
    }
    if org_name.trim().is_empty() {
        return Err(RolekeepError::validation(format!(
            "entry {index}: org_name is required"
        )));
    }
    Ok(())
}

/// Validate a bulk upsert batch as a whole.
///
/// `allowed_roles` restricts the accepted roles; an empty slice accepts any
/// non-empty role.
pub fn validate_upserts(
    entries: &[UpsertPermission],
    allowed_roles: &[String],
) -> RolekeepResult<()> {
    check_batch_len(entries.len())?;

    for (index, entry) in entries.iter().enumerate() {
        check_key_fields(index, &entry.user_id, &entry.org_name)?;
        if entry.role.trim().is_empty() {
            return Err(RolekeepError::validation(format!(
                "entry {index}: role is required"
            )));
        }
        if !allowed_roles.is_empty() && !allowed_roles.iter().any(|r| r == &entry.role) {
            return Err(RolekeepError::validation(format!(
                "entry {index}: invalid role '{}', expected one of {:?}",
                entry.role, allowed_roles
            )));
        }
    }
    Ok(())
}

/// Validate a bulk delete batch as a whole.
pub fn validate_keys(keys: &[PermissionKey]) -> RolekeepResult<()> {
    check_batch_len(keys.len())?;

    for (index, key) in keys.iter().enumerate() {
        check_key_fields(index, &key.user_id, &key.org_name)?;
    }
    Ok(())
}

/// Reduce an upsert batch to one entry per key.
///
/// Keys keep the position of their first appearance; the role is taken from
/// the last entry for that key.
pub fn dedupe_upserts(entries: Vec<UpsertPermission>) -> Vec<UpsertPermission> {
    let mut unique: Vec<UpsertPermission> = Vec::with_capacity(entries.len());
    let mut key_to_index: HashMap<PermissionKey, usize> = HashMap::new();

    for entry in entries {
        match key_to_index.entry(entry.key()) {
            Entry::Occupied(slot) => unique[*slot.get()].role = entry.role,
            Entry::Vacant(slot) => {
                slot.insert(unique.len());
                unique.push(entry);
            }
        }
    }
    unique
}

/// Drop repeated keys, keeping first-appearance order.
pub fn dedupe_keys(keys: Vec<PermissionKey>) -> Vec<PermissionKey> {
    let mut seen: HashSet<PermissionKey> = HashSet::with_capacity(keys.len());
    keys.into_iter()
        .filter(|key| seen.insert(key.clone()))
        .collect()
}
