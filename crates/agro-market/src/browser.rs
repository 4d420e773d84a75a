//! Read-only decoding of persisted listings.
//!
//! External readers enumerate the raw boxes of a store and decode each one
//! with the fixed key and value layouts. Nothing here mutates the store.

use agro_core::{Address, Amount, GoodId};
use serde::{Deserialize, Serialize};

use crate::codec::{ListingKey, ListingRecord};
use crate::error::Result;
use crate::store::BoxStore;

/// One decoded listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingView {
    /// Seller who owns the listing.
    pub owner: Address,
    /// Good on offer.
    pub good: GoodId,
    /// Seller-chosen discriminator.
    pub nonce: u64,
    /// Units still available.
    pub deposited: u64,
    /// Price of one unit.
    pub unitary_price: Amount,
}

impl ListingView {
    /// Combines a decoded key and record.
    #[must_use]
    pub const fn new(key: ListingKey, record: ListingRecord) -> Self {
        Self {
            owner: key.owner,
            good: key.good,
            nonce: key.nonce,
            deposited: record.deposited,
            unitary_price: Amount::from_micro(record.unitary_price),
        }
    }

    /// Returns true if no units remain.
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.deposited == 0
    }
}

/// Narrows a listing scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingFilter {
    /// Only listings by this seller.
    pub owner: Option<Address>,
    /// Only listings of this good.
    pub good: Option<GoodId>,
}

impl ListingFilter {
    /// Accepts every listing.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            owner: None,
            good: None,
        }
    }

    /// Restricts to one seller.
    #[must_use]
    pub const fn owner(mut self, owner: Address) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Restricts to one good.
    #[must_use]
    pub const fn good(mut self, good: GoodId) -> Self {
        self.good = Some(good);
        self
    }

    /// Returns true if `key` passes the filter.
    #[must_use]
    pub fn matches(&self, key: &ListingKey) -> bool {
        self.owner.is_none_or(|owner| owner == key.owner) && self.good.is_none_or(|good| good == key.good)
    }
}

/// Decodes every box in `store` that passes `filter`, in key order.
///
/// # Errors
///
/// Returns `MarketError::Codec` if a box does not have the listing layout.
pub fn scan_listings<S: BoxStore>(store: &S, filter: &ListingFilter) -> Result<Vec<ListingView>> {
    let mut views = Vec::new();
    for (name, value) in store.entries()? {
        let key = ListingKey::from_bytes(&name)?;
        if !filter.matches(&key) {
            continue;
        }
        let record = ListingRecord::from_bytes(&value)?;
        views.push(ListingView::new(key, record));
    }
    views.sort_by_key(|view| (view.owner, view.good, view.nonce));
    Ok(views)
}
