//! Nucleus configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! address = "0x00000000000000000000000000000000000a11ce"
//! fee_admin = "0x000000000000000000000000000000000000ad31"
//! default_swap_fee_ppm = 2000
//! default_flash_loan_fee_ppm = 900
//! ```

use std::path::Path;

use alloy_primitives::{address, Address};
use serde::Deserialize;
use thiserror::Error;

use crate::fees::PPM_DENOMINATOR;

/// Configuration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config field {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Static parameters of a Nucleus instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NucleusConfig {
    /// Address of the Nucleus itself
    pub address: Address,

    /// Only address allowed to change fee tables
    pub fee_admin: Address,

    /// Wildcard swap fee installed at construction
    #[serde(default)]
    pub default_swap_fee_ppm: u32,

    /// Wildcard flash loan fee installed at construction
    #[serde(default)]
    pub default_flash_loan_fee_ppm: u32,
}

impl Default for NucleusConfig {
    fn default() -> Self {
        Self {
            address: address!("00000000000000000000000000000000000a11ce"),
            fee_admin: address!("000000000000000000000000000000000000ad31"),
            default_swap_fee_ppm: 0,
            default_flash_loan_fee_ppm: 0,
        }
    }
}

impl NucleusConfig {
    pub fn new(address: Address, fee_admin: Address) -> Self {
        Self {
            address,
            fee_admin,
            default_swap_fee_ppm: 0,
            default_flash_loan_fee_ppm: 0,
        }
    }

    pub fn with_default_fees(mut self, swap_fee_ppm: u32, flash_loan_fee_ppm: u32) -> Self {
        self.default_swap_fee_ppm = swap_fee_ppm;
        self.default_flash_loan_fee_ppm = flash_loan_fee_ppm;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.is_zero() {
            return Err(ConfigError::Invalid {
                field: "address",
                message: "must not be the zero address".into(),
            });
        }
        if self.fee_admin.is_zero() || self.fee_admin == self.address {
            return Err(ConfigError::Invalid {
                field: "fee_admin",
                message: "must be a non-zero address distinct from the nucleus".into(),
            });
        }
        for (field, ppm) in [
            ("default_swap_fee_ppm", self.default_swap_fee_ppm),
            ("default_flash_loan_fee_ppm", self.default_flash_loan_fee_ppm),
        ] {
            if ppm > PPM_DENOMINATOR {
                return Err(ConfigError::Invalid {
                    field,
                    message: format!("{ppm} exceeds {PPM_DENOMINATOR}"),
                });
            }
        }
        Ok(())
    }
}
