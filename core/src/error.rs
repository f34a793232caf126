//! Error taxonomy for the lifecycle core.
//!
//! Every expected, user-facing outcome gets its own variant with a stable
//! machine code; dependency failures are separate so the web layer can
//! map them to 5xx responses. None of these are retried automatically.

use crate::status::ApplicationStatus;
use thiserror::Error;

/// Errors surfaced by lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Malformed or missing input.
    #[error("validation failed: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// Referenced service or application does not exist (or is inactive).
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource kind (for the message only).
        resource: &'static str,
        /// Identifier that failed to resolve.
        id: String,
    },

    /// Authenticated but not authorized for this resource or action.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Why the caller is not allowed.
        message: String,
    },

    /// Status transition not permitted from the current state.
    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition {
        /// Status the record is currently in.
        from: ApplicationStatus,
        /// Status the caller asked for.
        to: ApplicationStatus,
    },

    /// Lost a concurrency race on the same record.
    #[error("concurrent update conflict: {message}")]
    Conflict {
        /// Description of the conflicting update.
        message: String,
    },

    /// An underlying store is unavailable; the operation was aborted
    /// without partial effects.
    #[error("dependency unavailable: {message}")]
    Dependency {
        /// Which dependency failed and how.
        message: String,
    },
}

impl LifecycleError {
    /// Convenience constructor for validation failures.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Convenience constructor for not-found failures.
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Convenience constructor for authorization failures.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Convenience constructor for dependency failures.
    #[must_use]
    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            Self::Conflict { .. } => "CONFLICT",
            Self::Dependency { .. } => "DEPENDENCY_ERROR",
        }
    }
}
