//! Engine configuration loading and validation.
//!
//! Values are read from `CRYPTLIB_`-prefixed environment variables. Every field
//! has a default, so an empty environment yields a strict raw-key engine.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::key::{KeyDerivation, KEY_LENS};

/// Validated engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// How caller key bytes are turned into an AES key.
    #[serde(default)]
    pub key_derivation: KeyDerivation,

    /// Key length produced by [`KeyDerivation::Sha256Hex`].
    #[serde(default = "default_derived_key_len")]
    pub derived_key_len: usize,
}

fn default_derived_key_len() -> usize {
    32
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            key_derivation: KeyDerivation::default(),
            derived_key_len: default_derived_key_len(),
        }
    }
}

impl EngineConfig {
    /// Configuration compatible with the CryptLib text API: SHA-256 hex key
    /// derivation producing AES-256 keys.
    pub fn sha256_hex() -> Self {
        Self {
            key_derivation: KeyDerivation::Sha256Hex,
            ..Self::default()
        }
    }

    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("CRYPTLIB"))
            .build()
            .context("failed to build configuration from environment")?;
        Self::from_config(cfg)
    }

    fn from_config(cfg: config::Config) -> Result<Self> {
        let c: EngineConfig = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;
        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    pub fn validate(&self) -> Result<()> {
        if !KEY_LENS.contains(&self.derived_key_len) {
            anyhow::bail!(
                "CRYPTLIB_DERIVED_KEY_LEN must be one of 16, 24 or 32 (got {})",
                self.derived_key_len
            );
        }
        Ok(())
    }
}
