//! # agro-cli
//!
//! Agroshop command-line interface.
//!
//! Provides commands for:
//! - Browsing the listings persisted in a JSON box store
//! - Inspecting the rent schedule a configuration resolves to
//!
//! The CLI only reads state. Calls are submitted to the marketplace ledger
//! itself, never through this tool.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, ListingsArgs, RentArgs};
pub use error::CliError;
pub use output::OutputFormat;
