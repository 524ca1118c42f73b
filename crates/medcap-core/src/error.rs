//! Error types module
//!
//! All errors are unified under the `AppError` enum which can represent
//! database, validation, and configuration errors.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx`
//! feature. With `default-features = false`, build without the `sqlx`
//! feature; then `AppError` has no database variant and you must use other
//! error types for DB errors.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Template references unknown field: {field}")]
    MissingField { field: String },

    #[error("Invalid caption template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid extraction rule table: {0}")]
    InvalidRuleTable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}
