//! Marketplace configuration.
//!
//! The defaults reproduce the deployed economy: a listing box costs a flat
//! 2_500 micro-units plus 400 per byte over 112 bytes (47_300 in total), and
//! registering a good costs the platform's 100_000 minimum balance.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MarketError, Result};
use crate::rent::RentSchedule;

/// Storage rent parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentConfig {
    /// Flat cost of allocating one box.
    pub box_flat_fee: u64,
    /// Cost per byte of box name plus value.
    pub box_byte_fee: u64,
    /// Byte count charged per listing box.
    ///
    /// 112 is larger than the 64 bytes a listing actually encodes to. The
    /// marketplace's economics were set with 112, so it stays.
    pub listing_box_bytes: u64,
    /// Minimum-balance cost for the ledger to hold one more good.
    pub good_registration_fee: u64,
}

impl Default for RentConfig {
    fn default() -> Self {
        Self {
            box_flat_fee: 2_500,
            box_byte_fee: 400,
            listing_box_bytes: 112,
            good_registration_fee: 100_000,
        }
    }
}

/// Top-level marketplace configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Storage rent parameters.
    pub rent: RentConfig,
}

impl MarketConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Config` if the JSON is malformed or the rent
    /// schedule is unusable.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MarketError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Config` if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| MarketError::config(format!("{}: {e}", path.display())))?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), "loaded market config");
        Ok(config)
    }

    /// Checks that every fee fits the value domain.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Config` if the listing rent overflows.
    pub fn validate(&self) -> Result<()> {
        RentSchedule::from_config(&self.rent).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployed_economy() {
        let config = MarketConfig::default();
        assert_eq!(config.rent.box_flat_fee, 2_500);
        assert_eq!(config.rent.box_byte_fee, 400);
        assert_eq!(config.rent.listing_box_bytes, 112);
        assert_eq!(config.rent.good_registration_fee, 100_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            MarketConfig::from_json_str(r#"{"rent":{"listing_box_bytes":64}}"#).expect("parse");
        assert_eq!(config.rent.listing_box_bytes, 64);
        assert_eq!(config.rent.box_flat_fee, 2_500);

        let empty = MarketConfig::from_json_str("{}").expect("parse");
        assert_eq!(empty, MarketConfig::default());
    }

    #[test]
    fn rejects_overflowing_rent() {
        let err = MarketConfig::from_json_str(
            r#"{"rent":{"box_byte_fee":18446744073709551615,"listing_box_bytes":2}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, MarketError::Config(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(MarketConfig::from_json_str("{rent:").is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("market.json");
        std::fs::write(&path, r#"{"rent":{"good_registration_fee":200000}}"#).expect("write");

        let config = MarketConfig::from_json_file(&path).expect("load");
        assert_eq!(config.rent.good_registration_fee, 200_000);
        assert!(MarketConfig::from_json_file(&dir.path().join("missing.json")).is_err());
    }
}
