//! Box storage for listings.
//!
//! This module provides:
//! - [`BoxStore`]: the raw byte-keyed store the ledger owns
//! - [`MemoryBoxStore`]: an in-memory ordered implementation
//! - [`ListingStore`]: typed create/read/update/delete of listing records
//!
//! Deletion never happens implicitly: removing a listing is an explicit call
//! and the rent refund that must accompany it is the caller's job.

use std::collections::BTreeMap;

use agro_core::GoodId;

use crate::codec::{ListingKey, ListingRecord};
use crate::error::{MarketError, Result, StoreError};

/// A raw key-value store of named boxes.
///
/// Implementors must make each method atomic: on error, the store is left
/// exactly as it was before the call.
pub trait BoxStore {
    /// Reads a box by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, name: &[u8]) -> std::result::Result<Option<Vec<u8>>, StoreError>;

    /// Creates or overwrites a box.
    ///
    /// # Errors
    ///
    /// Returns an error if the write could not be made durable.
    fn put(&mut self, name: &[u8], value: &[u8]) -> std::result::Result<(), StoreError>;

    /// Deletes a box, returning its previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete could not be made durable.
    fn delete(&mut self, name: &[u8]) -> std::result::Result<Option<Vec<u8>>, StoreError>;

    /// Returns every box as `(name, value)` in name order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn entries(&self) -> std::result::Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;

    /// Returns true if a box with this name exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn contains(&self, name: &[u8]) -> std::result::Result<bool, StoreError> {
        Ok(self.get(name)?.is_some())
    }
}

/// In-memory box store ordered by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryBoxStore {
    boxes: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryBoxStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of boxes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns true if no boxes are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl BoxStore for MemoryBoxStore {
    fn get(&self, name: &[u8]) -> std::result::Result<Option<Vec<u8>>, StoreError> {
        Ok(self.boxes.get(name).cloned())
    }

    fn put(&mut self, name: &[u8], value: &[u8]) -> std::result::Result<(), StoreError> {
        self.boxes.insert(name.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, name: &[u8]) -> std::result::Result<Option<Vec<u8>>, StoreError> {
        Ok(self.boxes.remove(name))
    }

    fn entries(&self) -> std::result::Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        Ok(self
            .boxes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn contains(&self, name: &[u8]) -> std::result::Result<bool, StoreError> {
        Ok(self.boxes.contains_key(name))
    }
}

/// Typed view of listing records over a [`BoxStore`].
#[derive(Debug, Clone, Default)]
pub struct ListingStore<S> {
    boxes: S,
}

impl<S: BoxStore> ListingStore<S> {
    /// Wraps a box store.
    pub const fn new(boxes: S) -> Self {
        Self { boxes }
    }

    /// Returns the underlying box store.
    pub const fn boxes(&self) -> &S {
        &self.boxes
    }

    /// Consumes the listing store, returning the box store.
    pub fn into_inner(self) -> S {
        self.boxes
    }

    /// Returns true if a listing exists for the key.
    pub fn exists(&self, key: &ListingKey) -> Result<bool> {
        Ok(self.boxes.contains(&key.to_bytes())?)
    }

    /// Reads a listing if present.
    pub fn get(&self, key: &ListingKey) -> Result<Option<ListingRecord>> {
        self.boxes
            .get(&key.to_bytes())?
            .map(|raw| ListingRecord::from_bytes(&raw).map_err(MarketError::from))
            .transpose()
    }

    /// Reads a listing, failing if it does not exist.
    pub fn load(&self, key: &ListingKey) -> Result<ListingRecord> {
        self.get(key)?.ok_or(MarketError::ListingNotFound(*key))
    }

    /// Allocates a new listing.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::ListingExists` if the key is taken.
    pub fn create(&mut self, key: &ListingKey, record: ListingRecord) -> Result<()> {
        if self.exists(key)? {
            return Err(MarketError::ListingExists(*key));
        }
        self.boxes.put(&key.to_bytes(), &record.to_bytes())?;
        Ok(())
    }

    /// Replaces an existing listing.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::ListingNotFound` if the key is free.
    pub fn update(&mut self, key: &ListingKey, record: ListingRecord) -> Result<()> {
        if !self.exists(key)? {
            return Err(MarketError::ListingNotFound(*key));
        }
        self.boxes.put(&key.to_bytes(), &record.to_bytes())?;
        Ok(())
    }

    /// Deletes a listing, returning its last state.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::ListingNotFound` if the key is free.
    pub fn remove(&mut self, key: &ListingKey) -> Result<ListingRecord> {
        let raw = self
            .boxes
            .delete(&key.to_bytes())?
            .ok_or(MarketError::ListingNotFound(*key))?;
        Ok(ListingRecord::from_bytes(&raw)?)
    }

    /// Decodes every listing in key order.
    pub fn listings(&self) -> Result<Vec<(ListingKey, ListingRecord)>> {
        self.boxes
            .entries()?
            .iter()
            .map(|(name, value)| -> Result<(ListingKey, ListingRecord)> {
                Ok((ListingKey::from_bytes(name)?, ListingRecord::from_bytes(value)?))
            })
            .collect()
    }

    /// Sum of `deposited` across every listing of `good`.
    ///
    /// Returned as `u128` since independent listings may each hold up to
    /// `u64::MAX` units.
    pub fn total_deposited(&self, good: GoodId) -> Result<u128> {
        Ok(self
            .listings()?
            .iter()
            .filter(|(key, _)| key.good == good)
            .map(|(_, record)| u128::from(record.deposited))
            .sum())
    }
}
