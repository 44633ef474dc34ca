//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{RolekeepError, RolekeepResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: Uuid,
    /// Display name. Not unique.
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUser {
    /// Caller-chosen identifier. A fresh UUID is generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl CreateUser {
    pub fn validate(&self) -> RolekeepResult<()> {
        if self.name.trim().is_empty() {
            return Err(RolekeepError::validation("user name is required"));
        }
        if self.email.trim().is_empty() {
            return Err(RolekeepError::validation("user email is required"));
        }
        if !self.email.contains('@') {
            return Err(RolekeepError::validation(format!(
                "invalid email address: {}",
                self.email
            )));
        }
        Ok(())
    }
}
