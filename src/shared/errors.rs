use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Not-found carrying the exact message shown to API clients.
    #[error("{0}")]
    Missing(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("No available spaces for this reservation at charging station {station_id}")]
    CapacityExceeded { station_id: i32 },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        DomainError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. } | DomainError::Missing(_))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => {
                debug!(constraint = %msg, "Unique constraint violated");
                DomainError::Conflict("This item already exists".into())
            }
            Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(msg)) => {
                debug!(constraint = %msg, "Foreign key constraint violated");
                let message = "Referenced resource does not exist or is still linked";
                DomainError::Conflict(message.into())
            }
            _ => DomainError::Storage(e.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
