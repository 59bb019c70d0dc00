//! Error types for Holocron Core
//!
//! [`CeremonyError`] is the caller-visible taxonomy. Access, validation and
//! store failures convert into it with `?`. Cache failures never reach it.

use holocron_access::AccessError;
use holocron_model::TemplateError;

/// Caller-visible service error
#[derive(Debug, thiserror::Error)]
pub enum CeremonyError {
    /// No identity where one is mandatory
    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    /// Identity present but not authorized
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Malformed or missing request field
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Referenced entity absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Store failure
    #[error("internal error: {0}")]
    Internal(#[from] StoreError),
}

impl CeremonyError {
    /// Stable machine-readable code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            CeremonyError::AuthenticationRequired(_) => "unauthenticated",
            CeremonyError::PermissionDenied(_) => "permission_denied",
            CeremonyError::InvalidArgument(_) => "invalid_argument",
            CeremonyError::NotFound(_) => "not_found",
            CeremonyError::Internal(_) => "internal",
        }
    }

    pub(crate) fn not_found(kind: &str, id: &str) -> Self {
        CeremonyError::NotFound(format!("{kind} {id} not found"))
    }
}

impl From<AccessError> for CeremonyError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::AuthenticationRequired(msg) => CeremonyError::AuthenticationRequired(msg),
            AccessError::PermissionDenied(msg) => CeremonyError::PermissionDenied(msg),
            AccessError::InvalidArgument(msg) => CeremonyError::InvalidArgument(msg),
        }
    }
}

impl From<TemplateError> for CeremonyError {
    fn from(err: TemplateError) -> Self {
        CeremonyError::InvalidArgument(err.to_string())
    }
}

/// Result type alias for service operations
pub type CeremonyResult<T> = Result<T, CeremonyError>;

/// Document store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not serve the request
    #[error("store backend error: {0}")]
    Backend(String),

    /// Stored payload does not decode
    #[error("corrupt {collection} document {id}: {source}")]
    Corrupt {
        /// Collection name
        collection: &'static str,
        /// Document id
        id: String,
        /// Decode error
        #[source]
        source: serde_json::Error,
    },

    /// Entity does not encode
    #[error("cannot encode {collection} document: {source}")]
    Encode {
        /// Collection name
        collection: &'static str,
        /// Encode error
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Notification delivery failure reported by a dispatcher
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotificationError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_errors_keep_their_kind() {
        let err: CeremonyError = AccessError::PermissionDenied("nope".to_string()).into();
        assert_eq!(err.code(), "permission_denied");
        assert_eq!(err.to_string(), "permission denied: nope");
    }

    #[test]
    fn template_errors_are_invalid_arguments() {
        let err: CeremonyError = TemplateError::MissingField("id").into();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn store_errors_are_internal() {
        let err: CeremonyError = StoreError::Backend("down".to_string()).into();
        assert_eq!(err.code(), "internal");
    }
}
