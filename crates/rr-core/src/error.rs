//! # AppError
//!
//! Centralized error handling for the Rusty-Reddit ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all rr-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// Resource not found (e.g., Community, Post, Rule)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., missing field, malformed payload, bad page)
    #[error("{0}")]
    ValidationError(String),

    /// No or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to touch this object
    #[error("{0}")]
    Forbidden(String),

    /// Infrastructure failure (e.g., DB down, disk full)
    #[error("internal service error: {0}")]
    Internal(String),

    /// Resource already exists (e.g., duplicate username or subreddit name)
    #[error("{0}")]
    Conflict(String),
}

impl AppError {
    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        AppError::NotFound(kind.to_string(), id.to_string())
    }
}

/// A specialized Result type for Rusty-Reddit logic.
pub type Result<T> = std::result::Result<T, AppError>;
