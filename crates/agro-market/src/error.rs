//! Error types for agro-market.
//!
//! Every variant of [`MarketError`] is a permanent abort of the call that
//! produced it. Nothing is retried and no partial state is left behind.

use agro_core::{Address, Amount, GoodId};
use thiserror::Error;

use crate::codec::ListingKey;

/// Result type alias for marketplace operations.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Errors that abort a marketplace call.
#[derive(Debug, Error)]
pub enum MarketError {
    /// A listing already exists for the key.
    #[error("listing already exists: {0}")]
    ListingExists(ListingKey),

    /// No listing exists for the key.
    #[error("listing not found: {0}")]
    ListingNotFound(ListingKey),

    /// The ledger is already registered to hold the good.
    #[error("good {0} is already registered")]
    GoodAlreadyRegistered(GoodId),

    /// The ledger is not registered to hold the good.
    #[error("good {0} is not registered")]
    GoodNotRegistered(GoodId),

    /// A bundled action was sent by the wrong account.
    #[error("{action}: sender mismatch: expected {expected}, got {actual}")]
    SenderMismatch {
        /// Which bundled action was inspected.
        action: &'static str,
        /// Required sender.
        expected: Address,
        /// Actual sender.
        actual: Address,
    },

    /// A bundled action was sent to the wrong account.
    #[error("{action}: receiver mismatch: expected {expected}, got {actual}")]
    ReceiverMismatch {
        /// Which bundled action was inspected.
        action: &'static str,
        /// Required receiver.
        expected: Address,
        /// Actual receiver.
        actual: Address,
    },

    /// A bundled action moved an amount outside the accepted range.
    #[error("{action}: amount {actual} rejected, expected {requirement}")]
    AmountRejected {
        /// Which bundled action was inspected.
        action: &'static str,
        /// Human-readable requirement, e.g. `exactly 47300`.
        requirement: String,
        /// Amount actually moved.
        actual: u64,
    },

    /// A purchase asked for more units than the listing holds.
    #[error("insufficient quantity: requested {requested}, available {available}")]
    InsufficientQuantity {
        /// Units requested.
        requested: u64,
        /// Units deposited in the listing.
        available: u64,
    },

    /// An amount would leave the 64-bit value domain.
    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),

    /// The ledger's native balance cannot cover an outbound payment.
    #[error("ledger balance too low: required {required}, available {available}")]
    LedgerBalance {
        /// Amount that would be paid out.
        required: Amount,
        /// Native balance held by the ledger.
        available: Amount,
    },

    /// The custody book does not back the listings in the store.
    #[error("custody does not back stored listings: {0}")]
    CustodyMismatch(String),

    /// Rent or fee configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The underlying box store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A persisted box could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl MarketError {
    /// Create an amount rejection error.
    #[must_use]
    pub fn amount_rejected(action: &'static str, requirement: impl Into<String>, actual: u64) -> Self {
        Self::AmountRejected {
            action,
            requirement: requirement.into(),
            actual,
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Errors raised by a [`crate::BoxStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persisted state is malformed.
    #[error("corrupt store: {0}")]
    Corrupt(String),
}

/// Errors raised while decoding persisted listing boxes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A box name or value has the wrong size.
    #[error("{what} must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// What was being decoded.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
}
