//! Shared marketplace handle.
//!
//! Submitted calls are applied one at a time: every call observes the state
//! left by the call committed before it, never a partial one.

use std::sync::Arc;

use agro_core::Call;
use parking_lot::Mutex;

use crate::error::Result;
use crate::marketplace::Marketplace;
use crate::receipt::Receipt;
use crate::store::BoxStore;

/// Cloneable handle to a marketplace shared between submitters.
#[derive(Debug)]
pub struct SharedMarketplace<S> {
    inner: Arc<Mutex<Marketplace<S>>>,
}

impl<S> Clone for SharedMarketplace<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: BoxStore> SharedMarketplace<S> {
    /// Wraps a marketplace.
    #[must_use]
    pub fn new(marketplace: Marketplace<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(marketplace)),
        }
    }

    /// Applies `call` under the marketplace lock.
    ///
    /// # Errors
    ///
    /// Returns the error of the aborted call. The marketplace is unchanged.
    pub fn submit(&self, call: &Call) -> Result<Receipt> {
        self.inner.lock().apply(call)
    }

    /// Runs `f` with exclusive access, e.g. for consistent reads.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut Marketplace<S>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}
