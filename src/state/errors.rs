//! # State Repository Errors

use thiserror::Error;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures reported by a state repository implementation.
///
/// "Not found" is never an error: lookups return `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("State repository unavailable: {0}")]
    Unavailable(String),

    #[error("Entry already exists: {0}")]
    Duplicate(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Validation could not reach a verdict because a lookup failed.
///
/// Distinct from an invalid document: the caller may retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfrastructureError {
    #[error("{lookup} lookup timed out after {timeout_ms}ms")]
    LookupTimeout { lookup: &'static str, timeout_ms: u64 },

    #[error("{lookup} lookup failed: {source}")]
    Repository {
        lookup: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl InfrastructureError {
    /// Whether retrying the same validation may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            InfrastructureError::LookupTimeout { .. } => true,
            InfrastructureError::Repository { source, .. } => {
                matches!(source, RepositoryError::Unavailable(_))
            }
        }
    }

    /// Error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            InfrastructureError::LookupTimeout { .. } => "DPNS_LOOKUP_TIMEOUT",
            InfrastructureError::Repository { .. } => "DPNS_LOOKUP_FAILED",
        }
    }
}
