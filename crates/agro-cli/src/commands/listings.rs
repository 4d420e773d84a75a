//! Listing browser command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use agro_market::{scan_listings, JsonBoxStore, ListingFilter, MarketError};
use tracing::{debug, info};

use crate::error::CliError;
use crate::output::{ListingTable, OutputFormat};

/// Listings command executor.
pub struct ListingsCommand {
    store: PathBuf,
}

impl ListingsCommand {
    /// Create a new listings command over the snapshot at `store`.
    #[must_use]
    pub fn new(store: &Path) -> Self {
        Self {
            store: store.to_path_buf(),
        }
    }

    /// Print the listings passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or holds a malformed box.
    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        filter: &ListingFilter,
        available_only: bool,
    ) -> Result<(), CliError> {
        let table = self.collect(filter, available_only)?;
        format.write(writer, &table)
    }

    /// Decode the listings passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or holds a malformed box.
    pub fn collect(&self, filter: &ListingFilter, available_only: bool) -> Result<ListingTable, CliError> {
        if !self.store.exists() {
            return Err(CliError::Config(format!(
                "box store not found: {}",
                self.store.display()
            )));
        }

        let store = JsonBoxStore::open(&self.store).map_err(MarketError::from)?;
        debug!(path = %self.store.display(), boxes = store.len(), "box store opened");

        let mut listings = scan_listings(&store, filter)?;
        if available_only {
            listings.retain(|listing| !listing.is_sold_out());
        }

        info!(count = listings.len(), "listings scanned");
        Ok(ListingTable { listings })
    }
}
