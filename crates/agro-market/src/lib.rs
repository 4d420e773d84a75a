//! # agro-market
//!
//! Custodial marketplace ledger for the Agroshop network.
//!
//! A single trusted ledger holds fungible goods on behalf of sellers and
//! lists them at a per-listing unit price. Every call is all-or-nothing:
//! guards run first, then at most one store mutation is committed together
//! with the outbound transfers it implies.
//!
//! This crate provides:
//!
//! - [`ListingStore`] — typed listing records over a raw [`BoxStore`]
//! - [`RentSchedule`] — the flat storage rent charged per listing
//! - [`verify`] — checks on the transfer actions bundled with a call
//! - [`CustodyManager`] — goods the ledger is registered to hold, and its balances
//! - [`Marketplace`] — the six operations as atomic transitions
//! - [`SharedMarketplace`] — a handle applying submitted calls one at a time
//! - [`scan_listings`] — decoding of persisted listings for external readers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod browser;
pub mod codec;
pub mod config;
pub mod custody;
pub mod error;
pub mod marketplace;
pub mod persist;
pub mod receipt;
pub mod rent;
pub mod shared;
pub mod store;
pub mod verify;

pub use browser::{scan_listings, ListingFilter, ListingView};
pub use codec::{ListingKey, ListingRecord, KEY_LEN, VALUE_LEN};
pub use config::{MarketConfig, RentConfig};
pub use custody::CustodyManager;
pub use error::{CodecError, MarketError, Result, StoreError};
pub use marketplace::Marketplace;
pub use persist::JsonBoxStore;
pub use receipt::{Outbound, Receipt};
pub use rent::RentSchedule;
pub use shared::SharedMarketplace;
pub use store::{BoxStore, ListingStore, MemoryBoxStore};
