//! Transfer actions bundled with a marketplace call.
//!
//! A caller submits these alongside a call. The surrounding network executes
//! them atomically with the call; the marketplace only inspects their fields
//! and decides whether to trust their effects.

use serde::{Deserialize, Serialize};

use crate::address::{Address, GoodId};
use crate::amount::Amount;

/// A native-value payment between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Paying account.
    pub sender: Address,
    /// Receiving account.
    pub receiver: Address,
    /// Amount paid.
    pub amount: Amount,
}

impl Payment {
    /// Creates a payment.
    #[must_use]
    pub const fn new(sender: Address, receiver: Address, amount: Amount) -> Self {
        Self {
            sender,
            receiver,
            amount,
        }
    }
}

/// A transfer of whole units of a good between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsTransfer {
    /// Sending account.
    pub sender: Address,
    /// Receiving account.
    pub receiver: Address,
    /// Good being moved.
    pub good: GoodId,
    /// Quantity moved.
    pub quantity: u64,
}

impl GoodsTransfer {
    /// Creates a goods transfer.
    #[must_use]
    pub const fn new(sender: Address, receiver: Address, good: GoodId, quantity: u64) -> Self {
        Self {
            sender,
            receiver,
            good,
            quantity,
        }
    }
}
