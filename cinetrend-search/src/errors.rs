//! Error types for catalog access.

use thiserror::Error;

/// Errors that can occur while reading from the movie catalog.
///
/// An empty result list is not an error; these variants describe requests
/// that produced no usable answer at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Transport failure, timeout, non-success HTTP status, or an upstream
    /// body that reports failure (`"Response": "False"`).
    #[error("Catalog unavailable: {reason}")]
    UpstreamUnavailable {
        /// The reason for the failure
        reason: String,
    },

    /// Response body did not have the expected structure.
    #[error("Malformed catalog response: {reason}")]
    UpstreamMalformed {
        /// The decoder error
        reason: String,
    },

    /// The catalog has no item with the requested id.
    #[error("Movie {id} not found")]
    NotFound {
        /// The id that was requested
        id: u64,
    },
}

impl CatalogError {
    /// Returns a message suitable for showing in place of a result list.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::UpstreamUnavailable { reason } if !reason.is_empty() => {
                format!("Failed to fetch movies: {reason}")
            }
            CatalogError::UpstreamUnavailable { .. } | CatalogError::UpstreamMalformed { .. } => {
                "Failed to fetch movies".to_string()
            }
            CatalogError::NotFound { id } => format!("Movie {id} was not found"),
        }
    }

    /// Checks if this error means the requested item does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}

/// Errors returned by a search session handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session task has stopped and no longer accepts input.
    #[error("Search session has shut down")]
    SessionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let unavailable = CatalogError::UpstreamUnavailable {
            reason: "Invalid API key".to_string(),
        };
        assert_eq!(
            unavailable.user_message(),
            "Failed to fetch movies: Invalid API key"
        );

        let malformed = CatalogError::UpstreamMalformed {
            reason: "missing field `results`".to_string(),
        };
        assert_eq!(malformed.user_message(), "Failed to fetch movies");

        let not_found = CatalogError::NotFound { id: 42 };
        assert!(not_found.is_not_found());
        assert!(!malformed.is_not_found());
    }
}
