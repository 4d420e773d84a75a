//! # agro-core
//!
//! Primitives shared by the Agroshop custodial marketplace and its callers.
//!
//! This crate provides:
//!
//! - [`Address`] — 32-byte account identity with a base58 text form
//! - [`GoodId`] — handle of a fungible good the ledger can custody
//! - [`Amount`] — native value in micro-units with overflow-safe arithmetic
//! - [`Payment`] / [`GoodsTransfer`] — the transfer actions bundled with a call
//! - [`Call`] / [`Operation`] — one submitted marketplace call

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod address;
pub mod amount;
pub mod call;
pub mod error;

pub use action::{GoodsTransfer, Payment};
pub use address::{Address, GoodId};
pub use amount::Amount;
pub use call::{Call, Operation};
pub use error::{CoreError, Result};
