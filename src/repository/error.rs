#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DatabaseError {
    #[error("Internal database error: {0}")]
    BackendError(#[from] sqlx::Error),

    #[error("Internal database error: {message}")]
    InternalError { message: String },
}

impl DatabaseError {
    /// True when the underlying driver reported a UNIQUE constraint violation.
    ///
    /// The subscription ledger relies on this to turn a lost insert race into
    /// the duplicate-subscription conflict instead of an internal error.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::BackendError(sqlx::Error::Database(db_err)) => {
                matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
            }
            _ => false,
        }
    }

    /// True when the underlying driver reported a FOREIGN KEY violation.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            Self::BackendError(sqlx::Error::Database(db_err)) => {
                matches!(db_err.kind(), sqlx::error::ErrorKind::ForeignKeyViolation)
            }
            _ => false,
        }
    }
}
