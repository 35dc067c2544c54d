use crate::locale::Locale;
use crate::locale::MessageKey;
use crate::repository::error::DatabaseError;

/// Business-rule error taxonomy.
///
/// Every variant carries the stable [`MessageKey`] identifying the
/// user-facing message; the web boundary localizes the key and maps the
/// variant to a status code. Tests match on the variant and key, never on
/// translated text.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("Validation failed: {}", .key.text(Locale::En))]
    Validation { key: MessageKey },

    #[error("Not found: {}", .key.text(Locale::En))]
    NotFound { key: MessageKey },

    #[error("Forbidden: {}", .key.text(Locale::En))]
    Forbidden { key: MessageKey },

    #[error("Conflict: {}", .key.text(Locale::En))]
    Conflict { key: MessageKey },

    #[error("Past date: {}", .key.text(Locale::En))]
    PastDate { key: MessageKey },

    #[error("Expired: {}", .key.text(Locale::En))]
    Expired { key: MessageKey },

    #[error("Auth failed: {}", .key.text(Locale::En))]
    Auth { key: MessageKey },

    #[error("Unexpected result: {message}")]
    UnexpectedResult { message: String },

    #[error("DatabaseError: {0}")]
    DatabaseError(#[from] DatabaseError),
}

impl ServiceError {
    /// The message key for user-facing variants, if any.
    pub fn key(&self) -> Option<MessageKey> {
        match self {
            Self::Validation { key }
            | Self::NotFound { key }
            | Self::Forbidden { key }
            | Self::Conflict { key }
            | Self::PastDate { key }
            | Self::Expired { key }
            | Self::Auth { key } => Some(*key),
            _ => None,
        }
    }
}
