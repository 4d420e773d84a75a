//! Error types for agro-core.

use thiserror::Error;

/// Result type alias for core primitive operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while building or parsing core primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid amount (overflow, bad format, or negative).
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid account address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid good identifier.
    #[error("invalid good id: {0}")]
    InvalidGood(String),
}
