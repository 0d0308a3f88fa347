//! # Node Configuration
//!
//! Defaults overridden by environment variables:
//!
//! | Variable | Field | Format |
//! |----------|-------|--------|
//! | `CHAT_DATA_DIR` | `data_dir` | path |
//! | `CHAT_OWNER` | `ledger.owner` | `0x` + 40 hex digits |
//! | `CHAT_MESSAGE_FEE` | `ledger.message_fee` | decimal or `0x` hex |
//! | `CHAT_MAX_MESSAGE_LENGTH` | `ledger.max_message_length` | bytes |
//!
//! The ledger values only seed a new ledger; an existing ledger keeps its
//! persisted settings.

use crate::payloads::parse_amount;
use chat_ledger::domain::entities::LedgerConfig;
use chat_ledger::domain::value_objects::Identity;
use std::path::PathBuf;
use thiserror::Error;

/// File name of the ledger inside `data_dir`.
pub const LEDGER_FILE: &str = "ledger.db";

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Directory holding the ledger file and its lock.
    pub data_dir: PathBuf,
    /// Settings for a newly initialized ledger.
    pub ledger: LedgerConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            ledger: LedgerConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Path of the ledger file.
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE)
    }

    /// Checks that the ledger settings can initialize a new ledger.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.owner.is_zero() {
            return Err(ConfigError::MissingOwner);
        }
        if self.ledger.max_message_length == 0 {
            return Err(ConfigError::ZeroMaxMessageLength);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A new ledger needs an owner.
    #[error("no ledger owner configured; set CHAT_OWNER to a non-zero identity")]
    MissingOwner,

    /// The content bound must be positive.
    #[error("CHAT_MAX_MESSAGE_LENGTH must be greater than zero")]
    ZeroMaxMessageLength,

    /// An environment variable could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Loads the configuration from the process environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    load_config_from(|var| std::env::var(var).ok())
}

/// Loads the configuration from `lookup`, which maps variable names to values.
pub fn load_config_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<NodeConfig, ConfigError> {
    let mut config = NodeConfig::default();

    if let Some(dir) = lookup("CHAT_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(value) = lookup("CHAT_OWNER") {
        config.ledger.owner = parse_var("CHAT_OWNER", value, |v| v.parse::<Identity>().ok())?;
    }
    if let Some(value) = lookup("CHAT_MESSAGE_FEE") {
        config.ledger.message_fee =
            parse_var("CHAT_MESSAGE_FEE", value, |v| parse_amount(v).ok())?;
    }
    if let Some(value) = lookup("CHAT_MAX_MESSAGE_LENGTH") {
        config.ledger.max_message_length =
            parse_var("CHAT_MAX_MESSAGE_LENGTH", value, |v| v.parse().ok())?;
    }

    Ok(config)
}

fn parse_var<T>(
    var: &'static str,
    value: String,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    parse(value.trim()).ok_or(ConfigError::InvalidValue { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_ledger::domain::value_objects::Amount;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = load_config_from(env(&[])).unwrap();
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.ledger_path(), PathBuf::from("./data/ledger.db"));
        assert_eq!(config.validate(), Err(ConfigError::MissingOwner));
    }

    #[test]
    fn test_env_overrides() {
        let config = load_config_from(env(&[
            ("CHAT_DATA_DIR", "/var/lib/chat"),
            ("CHAT_OWNER", "0x00000000000000000000000000000000000000AA"),
            ("CHAT_MESSAGE_FEE", "2500"),
            ("CHAT_MAX_MESSAGE_LENGTH", " 280 "),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/chat"));
        assert_eq!(config.ledger.owner.as_bytes()[19], 0xAA);
        assert_eq!(config.ledger.message_fee, Amount::from(2500u64));
        assert_eq!(config.ledger.max_message_length, 280);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = load_config_from(env(&[("CHAT_OWNER", "alice")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: "CHAT_OWNER",
                value: "alice".to_string()
            }
        );
        assert!(load_config_from(env(&[("CHAT_MAX_MESSAGE_LENGTH", "-1")])).is_err());
        assert!(load_config_from(env(&[("CHAT_MESSAGE_FEE", "lots")])).is_err());
    }

    #[test]
    fn test_zero_length_rejected() {
        let config = load_config_from(env(&[
            ("CHAT_OWNER", "0x0000000000000000000000000000000000000001"),
            ("CHAT_MAX_MESSAGE_LENGTH", "0"),
        ]))
        .unwrap();
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxMessageLength));
    }
}
