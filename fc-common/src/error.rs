//! Common error types for the fit-and-competent API

use thiserror::Error;

/// Common result type for fit-and-competent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the store, allocator and updater
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown or non-numeric application number
    #[error("Not found: {0}")]
    NotFound(String),

    /// Application has already been filled in
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Every allocation attempt collided with an existing record
    #[error("Unable to generate new application number after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    /// A store call did not complete within the configured timeout
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
