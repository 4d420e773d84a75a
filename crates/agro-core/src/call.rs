//! The call envelope submitted to the marketplace.
//!
//! A [`Call`] binds the authenticated sender to one [`Operation`]. The
//! operation carries its scalar arguments and the bundled transfer actions
//! that accompany it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::{GoodsTransfer, Payment};
use crate::address::{Address, GoodId};

/// One of the six marketplace operations with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Make the ledger able to custody `good`.
    RegisterGood {
        /// Payment covering the minimum balance for holding the good.
        rent_payment: Payment,
        /// Good to register.
        good: GoodId,
    },
    /// Open a new listing funded by `transfer`.
    CreateListing {
        /// Payment covering the listing's storage rent.
        rent_payment: Payment,
        /// Goods deposited into custody.
        transfer: GoodsTransfer,
        /// Distinguishes listings of the same good by the same seller.
        nonce: u64,
        /// Price per unit in native micro-units.
        unitary_price: u64,
    },
    /// Add inventory to an existing listing.
    TopUp {
        /// Goods deposited into custody.
        transfer: GoodsTransfer,
        /// Listing nonce.
        nonce: u64,
    },
    /// Replace the unit price of an existing listing.
    Reprice {
        /// Listed good.
        good: GoodId,
        /// Listing nonce.
        nonce: u64,
        /// New price per unit in native micro-units.
        unitary_price: u64,
    },
    /// Buy `quantity` units from someone's listing.
    Purchase {
        /// Seller whose listing is addressed.
        owner: Address,
        /// Listed good.
        good: GoodId,
        /// Listing nonce.
        nonce: u64,
        /// Payment from the buyer to the seller.
        payment: Payment,
        /// Units requested.
        quantity: u64,
    },
    /// Close a listing, reclaiming rent and remaining inventory.
    Withdraw {
        /// Listed good.
        good: GoodId,
        /// Listing nonce.
        nonce: u64,
    },
}

impl Operation {
    /// Returns the operation name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RegisterGood { .. } => "register_good",
            Self::CreateListing { .. } => "create_listing",
            Self::TopUp { .. } => "top_up",
            Self::Reprice { .. } => "reprice",
            Self::Purchase { .. } => "purchase",
            Self::Withdraw { .. } => "withdraw",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A call submitted by an authenticated sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Identity bound by the calling context.
    pub sender: Address,
    /// Requested operation.
    pub operation: Operation,
}

impl Call {
    /// Creates a call.
    #[must_use]
    pub const fn new(sender: Address, operation: Operation) -> Self {
        Self { sender, operation }
    }
}
