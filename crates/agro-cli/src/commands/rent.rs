//! Rent schedule command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use agro_market::{MarketConfig, RentSchedule};
use tracing::debug;

use crate::error::CliError;
use crate::output::{OutputFormat, RentSummary};

/// Rent command executor.
pub struct RentCommand {
    config: Option<PathBuf>,
}

impl RentCommand {
    /// Create a new rent command reading `config`, or the defaults when `None`.
    #[must_use]
    pub fn new(config: Option<&Path>) -> Self {
        Self {
            config: config.map(Path::to_path_buf),
        }
    }

    /// Resolve and print the rent schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let schedule = self.schedule()?;
        format.write(writer, &RentSummary::from(&schedule))
    }

    /// Resolve the rent schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn schedule(&self) -> Result<RentSchedule, CliError> {
        let config = match &self.config {
            Some(path) => MarketConfig::from_json_file(path)?,
            None => {
                debug!("no configuration given, using defaults");
                MarketConfig::default()
            }
        };
        Ok(RentSchedule::from_config(&config.rent)?)
    }
}
