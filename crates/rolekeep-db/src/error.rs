//! Database-specific error types and conversions.

use rolekeep_core::error::RolekeepError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unique constraint violated on {entity}")]
    Conflict { entity: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Classify an error raised by one of the statements of a query.
    ///
    /// Unique index violations become [`DbError::Conflict`]; anything else
    /// is reported as a failed query.
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") || message.contains("already exists") {
            DbError::Conflict {
                entity: entity.to_string(),
            }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for RolekeepError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RolekeepError::NotFound { entity, id },
            DbError::Conflict { entity } => RolekeepError::AlreadyExists { entity },
            other => RolekeepError::Database(other.to_string()),
        }
    }
}
