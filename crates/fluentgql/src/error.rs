//! Error types for schema construction.
//!
//! Every builder precondition failure is reported as
//! [`SchemaError::Validation`] at the offending call. Nothing is deferred:
//! schema construction is a one-shot developer-time operation, so the
//! caller gets the failure at the point of misuse.

use thiserror::Error;

/// Errors that can occur while declaring or assembling a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A builder precondition was violated.
    #[error("{operation}(...): {message}")]
    Validation {
        /// The chained operation that was misused (e.g. `arg`).
        operation: &'static str,
        /// What went wrong.
        message: String,
    },

    /// A deferred type reference was resolved before it was filled.
    #[error("type reference '{0}' was never filled")]
    UnresolvedReference(String),

    /// The GraphQL engine rejected the assembled schema.
    #[error("schema assembly failed: {0}")]
    Engine(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SchemaError {
    /// Creates a new validation error for the given operation.
    pub fn validation(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            operation,
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` for builder precondition violations.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns a stable machine-readable code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::UnresolvedReference(_) => "UNRESOLVED_REFERENCE",
            Self::Engine(_) => "SCHEMA_BUILD_FAILED",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<async_graphql::dynamic::SchemaError> for SchemaError {
    fn from(err: async_graphql::dynamic::SchemaError) -> Self {
        Self::Engine(err.to_string())
    }
}
