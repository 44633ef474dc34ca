//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use rolekeep_core::error::{RolekeepError, RolekeepResult};
use rolekeep_core::models::user::{CreateUser, User};
use rolekeep_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid user UUID: {e}")))?;
        Ok(User {
            id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_row(&self, id_str: &str) -> Result<Option<UserRow>, DbError> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.to_string()))
            .await?;

        let rows: Vec<UserRow> = result.take(0)?;
        Ok(rows.into_iter().next())
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> RolekeepResult<User> {
        input.validate()?;

        let id = input.id.unwrap_or_else(Uuid::new_v4);
        let id_str = id.to_string();

        if input.id.is_some() && self.find_row(&id_str).await?.is_some() {
            return Err(RolekeepError::AlreadyExists {
                entity: format!("user {id_str}"),
            });
        }

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 name = $name, email = $email",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("user", e))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        debug!(user_id = %id, "Created user");
        Ok(row.into_user(id))
    }

    async fn get_by_id(&self, id: Uuid) -> RolekeepResult<User> {
        let id_str = id.to_string();

        let row = self.find_row(&id_str).await?.ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn list(&self, name: Option<&str>) -> RolekeepResult<Vec<User>> {
        let mut result = match name.filter(|n| !n.is_empty()) {
            Some(name) => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM user \
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
                    "SELECT meta::id(id) AS record_id, * FROM user \
                     ORDER BY created_at ASC",
                )
                .await
                .map_err(DbError::from)?,
        };

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }
}
