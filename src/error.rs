//! Unified error hierarchy for LiftLog
//!
//! The analytics and 1RM calculators never fail; everything that can go wrong
//! lives at the edges (request validation, the record store, configuration).

use thiserror::Error;

/// Top-level error type for all LiftLog operations
#[derive(Debug, Error)]
pub enum LiftLogError {
    /// Request validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Record store errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Request validation failures, reported before any calculator runs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field was missing or blank
    #[error("{field} is required")]
    Required { field: &'static str },

    /// A numeric field fell outside its allowed range
    #[error("{field} must be {rule}, got {value}")]
    OutOfRange {
        field: &'static str,
        rule: &'static str,
        value: String,
    },

    /// A date string did not parse as YYYY-MM-DD
    #[error("Invalid date format for {field}: '{value}'. Use YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    /// An enumerated field carried an unknown value
    #[error("Unknown {field}: '{value}'")]
    UnknownVariant { field: &'static str, value: String },

    /// Week/day outside the 4 x 6 training grid
    #[error("Grid cell week {week} day {day} is outside the 4x6 grid")]
    GridOutOfBounds { week: usize, day: usize },
}

/// Record store errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Record not found: {table}.{id}")]
    NotFound { table: &'static str, id: i64 },

    #[error("Duplicate entry: {table}.{key}")]
    Duplicate { table: &'static str, key: String },

    #[error("Operation not permitted: {0}")]
    Forbidden(String),
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}

/// Result type alias for LiftLog operations
pub type Result<T> = std::result::Result<T, LiftLogError>;

impl LiftLogError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LiftLogError::Validation(_) => ErrorSeverity::Warning,
            LiftLogError::Database(DatabaseError::NotFound { .. }) => ErrorSeverity::Warning,
            LiftLogError::Database(DatabaseError::Forbidden(_)) => ErrorSeverity::Warning,
            LiftLogError::Database(DatabaseError::Duplicate { .. }) => ErrorSeverity::Warning,
            LiftLogError::Database(_) => ErrorSeverity::Error,
            LiftLogError::Configuration(_) => ErrorSeverity::Error,
            LiftLogError::Io(_) => ErrorSeverity::Error,
            LiftLogError::Serialization(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LiftLogError::Validation(err) => format!("Invalid request: {}", err),
            LiftLogError::Database(DatabaseError::NotFound { table, id }) => {
                format!("No {} record with id {} for this profile", table, id)
            }
            LiftLogError::Database(DatabaseError::Forbidden(reason)) => reason.clone(),
            LiftLogError::Database(DatabaseError::Sqlite(_)) => {
                "Unable to access the training database. Please check the database path.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// True when the error means the addressed record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, LiftLogError::Database(DatabaseError::NotFound { .. }))
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Rejected input or missing record; the caller can correct it
    Warning,
}
