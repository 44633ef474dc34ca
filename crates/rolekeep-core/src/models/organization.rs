//! Organization domain model.
//!
//! An organization's `name` is unique and is what permissions refer to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{RolekeepError, RolekeepResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Organization {
    pub id: Uuid,
    /// Unique, human-readable name.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrganization {
    #[serde(default)]
    pub name: String,
}

impl CreateOrganization {
    pub fn validate(&self) -> RolekeepResult<()> {
        if self.name.trim().is_empty() {
            return Err(RolekeepError::validation("organization name is required"));
        }
        Ok(())
    }
}
