//! Error types for the CRM engine.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! `NotFound`, `InvalidArgument` and `AnalyticsUnavailable` and present the
//! right retry affordance.

use thiserror::Error;

use crate::entity::{EntityId, EntityKind};

/// Validation errors raised before any state is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing or blank")]
    BlankField {
        field: &'static str,
    },

    #[error("Field '{field}' has an invalid format: {value:?}")]
    InvalidFormat {
        field: &'static str,
        value: String,
    },

    #[error("Field '{field}' value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Page size must be greater than zero")]
    ZeroPageSize,

    #[error("Page numbers start at 1")]
    ZeroPage,

    #[error("Unknown filter field '{field}' for {kind}")]
    UnknownFilterField {
        kind: EntityKind,
        field: String,
    },

    #[error("Malformed {kind} payload: {reason}")]
    MalformedPayload {
        kind: EntityKind,
        reason: String,
    },

    #[error("Duplicate {kind} id {id} in seed data")]
    DuplicateId {
        kind: EntityKind,
        id: EntityId,
    },

    #[error("Reserved {kind} id 0 in seed data")]
    ReservedId {
        kind: EntityKind,
    },

    #[error("Malformed seed data: {reason}")]
    MalformedSeed {
        reason: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Top-level error type for the CRM engine.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("{kind} {id} not found")]
    NotFound {
        kind: EntityKind,
        id: EntityId,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    #[error("Analytics unavailable: {reason}")]
    AnalyticsUnavailable {
        reason: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl CrmError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wraps any failure observed while gathering analytics inputs.
    #[must_use]
    pub fn analytics_unavailable(cause: &impl std::fmt::Display) -> Self {
        Self::AnalyticsUnavailable {
            reason: cause.to_string(),
        }
    }

    /// Returns true if this is a `NotFound` error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is an `InvalidArgument` error.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns true if this is an `AnalyticsUnavailable` error.
    #[must_use]
    pub const fn is_analytics_unavailable(&self) -> bool {
        matches!(self, Self::AnalyticsUnavailable { .. })
    }

    /// Returns true if retrying the same call could succeed.
    ///
    /// The engine never retries on its own; a retried call re-reads the
    /// current snapshot.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidArgument(_) => false,
            Self::NotFound { .. } => false,
            Self::AnalyticsUnavailable { .. } => true,
            Self::Internal { .. } => false,
        }
    }
}

/// Result type alias for CRM engine operations.
pub type CrmResult<T> = Result<T, CrmError>;
