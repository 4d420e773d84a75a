//! CLI command implementations.
//!
//! - [`listings`] - Browse the listings in a box store
//! - [`rent`] - Inspect the rent schedule

pub mod listings;
pub mod rent;

pub use listings::ListingsCommand;
pub use rent::RentCommand;
