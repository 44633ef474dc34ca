//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use rolekeep_core::error::{RolekeepError, RolekeepResult};
use rolekeep_core::models::organization::{CreateOrganization, Organization};
use rolekeep_core::repository::OrganizationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid organization UUID: {e}")))?;
        Ok(Organization {
            id,
            name: self.name,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<OrganizationRowWithId>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM organization WHERE name = $name",
            )
            .bind(("name", name.to_string()))
            .await?;

        let rows: Vec<OrganizationRowWithId> = result.take(0)?;
        Ok(rows.into_iter().next())
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> RolekeepResult<Organization> {
        input.validate()?;

        if self.find_by_name(&input.name).await?.is_some() {
            return Err(RolekeepError::AlreadyExists {
                entity: format!("organization '{}'", input.name),
            });
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // The unique index still catches a concurrent create with the same name.
        let result = self
            .db
            .query("CREATE type::record('organization', $id) SET name = $name")
            .bind(("id", id_str.clone()))
            .bind(("name", input.name.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            DbError::from_statement(&format!("organization '{}'", input.name), e)
        })?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        debug!(org_id = %id, name = %row.name, "Created organization");
        Ok(Organization {
            id,
            name: row.name,
            created_at: row.created_at,
        })
    }

    async fn get_by_name(&self, name: &str) -> RolekeepResult<Organization> {
        let row = self
            .find_by_name(name)
            .await?
            .ok_or_else(|| DbError::NotFound {
                entity: "organization".into(),
                id: format!("name={name}"),
            })?;

        Ok(row.try_into_organization()?)
    }

    async fn list(&self, name: Option<&str>) -> RolekeepResult<Vec<Organization>> {
        let mut result = match name.filter(|n| !n.is_empty()) {
            Some(name) => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM organization \
                     WHERE string::contains(string::lowercase(name), \
                     string::lowercase($name)) \
                     ORDER BY created_at ASC",
                )
                .bind(("name", name.to_string()))
                .await
                .map_err(DbError::from)?,
            None => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM organization \
                     ORDER BY created_at ASC",
                )
                .await
                .map_err(DbError::from)?,
        };

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_organization())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
