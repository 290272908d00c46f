//! Error taxonomy shared by the resolver, protocol layer, and codec.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations. Every error carries a category from the closed
//! [`StatusCode`] set reported on the wire.
//!
//! # Categories
//!
//! | Category | Caller action |
//! |----------|---------------|
//! | `InvalidArgument` | Fix the request; never evicts an executor |
//! | `FailedPrecondition` | Re-resolve the executor, then retry |
//! | `NotFound` | Benign miss |
//! | `Unavailable` | Transient; retry later |
//! | `Internal` | Report a bug |

use serde::{Deserialize, Serialize};

/// Result type alias for Manifold operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the executor service and its collaborators.
///
/// The protocol layer never recodes an error; the category an executor
/// instance reports is the category the caller sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    /// Malformed request: bad value ref, bad shape, content size mismatch.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the request
        reason: String,
    },

    /// The referenced executor is unknown or no longer usable.
    ///
    /// Retryable: callers must re-resolve a fresh executor id first.
    #[error("failed precondition: {reason}")]
    FailedPrecondition {
        /// Why the precondition does not hold
        reason: String,
    },

    /// Entity does not exist.
    #[error("not found: {reason}")]
    NotFound {
        /// What was missing
        reason: String,
    },

    /// Transient failure in an underlying executor instance.
    #[error("unavailable: {reason}")]
    Unavailable {
        /// Why the operation could not be served
        reason: String,
    },

    /// Invariant violation (bug), e.g. resolver map inconsistency.
    #[error("internal error: {reason}")]
    Internal {
        /// Description of the violated invariant
        reason: String,
    },
}

impl Error {
    /// Build an [`Error::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Build an [`Error::FailedPrecondition`].
    pub fn failed_precondition(reason: impl Into<String>) -> Self {
        Error::FailedPrecondition {
            reason: reason.into(),
        }
    }

    /// Build an [`Error::NotFound`].
    pub fn not_found(reason: impl Into<String>) -> Self {
        Error::NotFound {
            reason: reason.into(),
        }
    }

    /// Build an [`Error::Unavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Error::Unavailable {
            reason: reason.into(),
        }
    }

    /// Build an [`Error::Internal`].
    pub fn internal(reason: impl Into<String>) -> Self {
        Error::Internal {
            reason: reason.into(),
        }
    }

    /// The wire status category of this error.
    pub fn code(&self) -> StatusCode {
        match self {
            Error::InvalidArgument { .. } => StatusCode::InvalidArgument,
            Error::FailedPrecondition { .. } => StatusCode::FailedPrecondition,
            Error::NotFound { .. } => StatusCode::NotFound,
            Error::Unavailable { .. } => StatusCode::Unavailable,
            Error::Internal { .. } => StatusCode::Internal,
        }
    }
}

/// Status categories reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// Success
    Ok,
    /// The request itself was malformed
    InvalidArgument,
    /// The executor is unknown or unusable; re-resolve and retry
    FailedPrecondition,
    /// Entity does not exist
    NotFound,
    /// Transient failure
    Unavailable,
    /// Bug or invariant violation
    Internal,
}
