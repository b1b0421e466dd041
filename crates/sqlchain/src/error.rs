//! Error types for sqlchain

use thiserror::Error;

/// Result type alias for sqlchain operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors produced while rendering or executing a statement.
#[derive(Debug, Error)]
pub enum SqlError {
    /// Statement is structurally incomplete (missing table, no SET clause, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A convenience execution method was called without an attached runner
    #[error("cannot run; no Runner set (run_with)")]
    RunnerNotSet,

    /// The attached runner cannot fetch a single row
    #[error("cannot query_row; Runner is not a QueryRower")]
    RunnerNotQueryRunner,

    /// Unknown or unusable placeholder format
    #[error("Placeholder format error: {0}")]
    Placeholder(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl SqlError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error comes from runner configuration rather than the database
    pub fn is_runner_config(&self) -> bool {
        matches!(self, Self::RunnerNotSet | Self::RunnerNotQueryRunner)
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Parse a tokio_postgres error into a more specific SqlError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SqlError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_errors_are_config_errors() {
        assert!(SqlError::RunnerNotSet.is_runner_config());
        assert!(SqlError::RunnerNotQueryRunner.is_runner_config());
        assert!(!SqlError::validation("x").is_runner_config());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            SqlError::validation("update statements must specify a table").to_string(),
            "Validation error: update statements must specify a table"
        );
        assert_eq!(
            SqlError::decode("id", "bad int").to_string(),
            "Decode error on column 'id': bad int"
        );
    }
}
