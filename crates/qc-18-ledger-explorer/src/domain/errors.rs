//! # Domain Errors
//!
//! Error types for the Ledger Explorer subsystem.
//!
//! Lookups that simply miss are not errors: primitives return `Ok(None)`.
//! `NotFound` is raised only where an assembler has no branch for a miss.

use thiserror::Error;

/// Explorer error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
    /// A keyed lookup found no record and the caller cannot continue.
    #[error("{resource} not found: {key}")]
    NotFound {
        /// Kind of record ("transaction", "balance", ...)
        resource: &'static str,
        /// Key that was looked up
        key: String,
    },

    /// Required configuration is absent or invalid.
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Repository, oracle or cache could not be reached.
    #[error("{collaborator} unavailable: {message}")]
    CollaboratorUnavailable {
        /// Which collaborator failed
        collaborator: &'static str,
        /// Underlying failure
        message: String,
    },

    /// The balance oracle answered with something that is not a hex quantity.
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),

    /// A composite could not be encoded for, or decoded from, the cache.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ExplorerError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(resource: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            key: key.into(),
        }
    }

    /// True for `NotFound`, so callers never confuse it with an outage.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Repository failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Connection to the ledger index failed.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Balance oracle failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// Transport-level failure (connect, timeout, bad body).
    #[error("transport error: {0}")]
    Transport(String),
    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },
}

/// Result cache failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Backing store failure.
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl From<RepositoryError> for ExplorerError {
    fn from(err: RepositoryError) -> Self {
        Self::CollaboratorUnavailable {
            collaborator: "repository",
            message: err.to_string(),
        }
    }
}

impl From<OracleError> for ExplorerError {
    fn from(err: OracleError) -> Self {
        Self::CollaboratorUnavailable {
            collaborator: "balance oracle",
            message: err.to_string(),
        }
    }
}

impl From<CacheError> for ExplorerError {
    fn from(err: CacheError) -> Self {
        Self::CollaboratorUnavailable {
            collaborator: "result cache",
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExplorerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ExplorerError::not_found("transaction", "0xabc");
        assert_eq!(err.to_string(), "transaction not found: 0xabc");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_oracle_error_is_unavailable_not_not_found() {
        let err: ExplorerError = OracleError::Transport("connection refused".into()).into();
        assert!(!err.is_not_found());
        assert!(matches!(
            err,
            ExplorerError::CollaboratorUnavailable {
                collaborator: "balance oracle",
                ..
            }
        ));
    }

    #[test]
    fn test_repository_error_conversion() {
        let err: ExplorerError = RepositoryError::Connection("refused".into()).into();
        assert!(err.to_string().contains("repository"));
        assert!(err.to_string().contains("refused"));
    }
}
