//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use agro_market::{ListingView, RentSchedule};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Listings for display.
#[derive(Debug, Clone, Serialize)]
pub struct ListingTable {
    /// Decoded listings, in key order.
    pub listings: Vec<ListingView>,
}

impl TableDisplay for ListingTable {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.listings.is_empty() {
            writeln!(writer, "No listings")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<16}  {:>12}  {:>8}  {:>12}  {:>20}",
            "OWNER", "GOOD", "NONCE", "AVAILABLE", "UNIT PRICE"
        )?;
        writeln!(writer, "{}", "─".repeat(76))?;

        for listing in &self.listings {
            writeln!(
                writer,
                "{:<16}  {:>12}  {:>8}  {:>12}  {:>20}",
                truncate(&listing.owner.to_base58(), 16),
                listing.good,
                listing.nonce,
                listing.deposited,
                listing.unitary_price.to_string()
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} listing(s)", self.listings.len())?;
        Ok(())
    }
}

/// Resolved rent fees.
#[derive(Debug, Clone, Serialize)]
pub struct RentSummary {
    /// Rent prepaid per listing.
    pub listing_fee: String,
    /// Rent refunded per withdrawn listing.
    pub listing_refund: String,
    /// Fee to register one more good.
    pub registration_fee: String,
}

impl From<&RentSchedule> for RentSummary {
    fn from(schedule: &RentSchedule) -> Self {
        Self {
            listing_fee: schedule.listing_fee().to_string(),
            listing_refund: schedule.listing_refund().to_string(),
            registration_fee: schedule.registration_fee().to_string(),
        }
    }
}

impl TableDisplay for RentSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Rent Schedule")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Listing fee:       {}", self.listing_fee)?;
        writeln!(writer, "Listing refund:    {}", self.listing_refund)?;
        writeln!(writer, "Registration fee:  {}", self.registration_fee)?;
        Ok(())
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        format!("{}...", &s[..max_len - 3])
    } else {
        s[..max_len].to_string()
    }
}
