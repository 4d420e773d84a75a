//! Fixed-layout encoding of listing boxes.
//!
//! Box name: 32-byte owner ∥ 8-byte big-endian good ∥ 8-byte big-endian nonce.
//! Box value: 8-byte big-endian deposited ∥ 8-byte big-endian unit price.
//!
//! External readers decode persisted boxes with exactly this layout, so it
//! must never change shape.

use std::fmt;

use agro_core::address::ADDRESS_LEN;
use agro_core::{Address, GoodId};
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Encoded length of a [`ListingKey`].
pub const KEY_LEN: usize = ADDRESS_LEN + 8 + 8;

/// Encoded length of a [`ListingRecord`].
pub const VALUE_LEN: usize = 8 + 8;

/// Identifies one escrow slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListingKey {
    /// Seller owning the listing.
    pub owner: Address,
    /// Listed good.
    pub good: GoodId,
    /// Distinguishes listings of the same good by the same seller.
    pub nonce: u64,
}

impl ListingKey {
    /// Creates a listing key.
    #[must_use]
    pub const fn new(owner: Address, good: GoodId, nonce: u64) -> Self {
        Self { owner, good, nonce }
    }

    /// Encodes the key as a box name.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; KEY_LEN] {
        let mut out = [0u8; KEY_LEN];
        out[..ADDRESS_LEN].copy_from_slice(self.owner.as_bytes());
        out[ADDRESS_LEN..ADDRESS_LEN + 8].copy_from_slice(&self.good.get().to_be_bytes());
        out[ADDRESS_LEN + 8..].copy_from_slice(&self.nonce.to_be_bytes());
        out
    }

    /// Decodes a box name.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::InvalidLength` unless `bytes` is exactly 48 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let raw: &[u8; KEY_LEN] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
            what: "listing key",
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;

        let mut owner = [0u8; ADDRESS_LEN];
        owner.copy_from_slice(&raw[..ADDRESS_LEN]);
        let (good, nonce) = split_words(&raw[ADDRESS_LEN..]);

        Ok(Self {
            owner: Address::new(owner),
            good: GoodId::new(good),
            nonce,
        })
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.good, self.nonce)
    }
}

/// State of one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Units of the good currently custodied for this listing.
    pub deposited: u64,
    /// Price per unit in native micro-units.
    pub unitary_price: u64,
}

impl ListingRecord {
    /// Creates a listing record.
    #[must_use]
    pub const fn new(deposited: u64, unitary_price: u64) -> Self {
        Self {
            deposited,
            unitary_price,
        }
    }

    /// Encodes the record as a box value.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; VALUE_LEN] {
        let mut out = [0u8; VALUE_LEN];
        out[..8].copy_from_slice(&self.deposited.to_be_bytes());
        out[8..].copy_from_slice(&self.unitary_price.to_be_bytes());
        out
    }

    /// Decodes a box value.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::InvalidLength` unless `bytes` is exactly 16 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != VALUE_LEN {
            return Err(CodecError::InvalidLength {
                what: "listing record",
                expected: VALUE_LEN,
                actual: bytes.len(),
            });
        }
        let (deposited, unitary_price) = split_words(bytes);
        Ok(Self {
            deposited,
            unitary_price,
        })
    }
}

/// Splits 16 bytes into two big-endian words.
fn split_words(bytes: &[u8]) -> (u64, u64) {
    let mut hi = [0u8; 8];
    let mut lo = [0u8; 8];
    hi.copy_from_slice(&bytes[..8]);
    lo.copy_from_slice(&bytes[8..16]);
    (u64::from_be_bytes(hi), u64::from_be_bytes(lo))
}
