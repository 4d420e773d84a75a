//! Command-line argument parsing with clap.

use std::path::PathBuf;

use agro_core::{Address, GoodId};
use clap::{Parser, Subcommand, ValueEnum};

/// Agroshop CLI - custodial marketplace inspection.
#[derive(Parser, Debug, Clone)]
#[command(name = "agroshop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the listings held in a box store.
    Listings(ListingsArgs),

    /// Show the rent schedule a configuration resolves to.
    Rent(RentArgs),
}

/// Arguments for the listings command.
#[derive(Parser, Debug, Clone)]
pub struct ListingsArgs {
    /// Path of the JSON box store snapshot.
    #[arg(short, long, env = "AGROSHOP_STORE", default_value = "agroshop-boxes.json")]
    pub store: PathBuf,

    /// Only show listings by this seller (base58 address).
    #[arg(short, long)]
    pub owner: Option<Address>,

    /// Only show listings of this good.
    #[arg(short, long)]
    pub good: Option<GoodId>,

    /// Hide listings with no units left.
    #[arg(long)]
    pub available: bool,
}

/// Arguments for the rent command.
#[derive(Parser, Debug, Clone)]
pub struct RentArgs {
    /// Marketplace configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "AGROSHOP_CONFIG")]
    pub config: Option<PathBuf>,
}
