//! # Node Configuration
//!
//! Unified configuration for the ledger node, the event bus and the client
//! session.
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `TD_CHAIN_ID` | `ledger.chain_id` |
//! | `TD_QUEUE_CAPACITY` | `ledger.queue_capacity` |
//! | `TD_RECEIPT_RETENTION` | `ledger.receipt_retention` |
//! | `TD_CONFIRMATION_TIMEOUT_MS` | `client.confirmation_timeout_ms` |
//! | `TD_BUS_CAPACITY` | `bus.capacity` |
//! | `TD_LOG_LEVEL` | `logging.level` |
//!
//! A variable that is set but does not parse is an error, not a silent
//! fallback to the default.

use std::str::FromStr;
use std::time::Duration;
use td_01_record_store::{LedgerConfig, DEFAULT_CHAIN_ID};
use td_02_record_accessor::AccessorConfig;
use td_04_view_sync::SyncConfig;
use thiserror::Error;

/// Chain id override.
pub const ENV_CHAIN_ID: &str = "TD_CHAIN_ID";
/// Confirmation timeout override, in milliseconds.
pub const ENV_CONFIRMATION_TIMEOUT_MS: &str = "TD_CONFIRMATION_TIMEOUT_MS";
/// Writer queue capacity override.
pub const ENV_QUEUE_CAPACITY: &str = "TD_QUEUE_CAPACITY";
/// Settled receipt retention override.
pub const ENV_RECEIPT_RETENTION: &str = "TD_RECEIPT_RETENTION";
/// Notification buffer override.
pub const ENV_BUS_CAPACITY: &str = "TD_BUS_CAPACITY";
/// Fallback log filter when `RUST_LOG` is unset.
pub const ENV_LOG_LEVEL: &str = "TD_LOG_LEVEL";

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Ledger node configuration.
    pub ledger: LedgerSection,
    /// Event bus configuration.
    pub bus: BusConfig,
    /// Client session configuration.
    pub client: ClientConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl NodeConfig {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, ENV_CHAIN_ID)? {
            self.ledger.chain_id = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_QUEUE_CAPACITY)? {
            self.ledger.queue_capacity = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_RECEIPT_RETENTION)? {
            self.ledger.receipt_retention = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_CONFIRMATION_TIMEOUT_MS)? {
            self.client.confirmation_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_BUS_CAPACITY)? {
            self.bus.capacity = v;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Reject values the runtime cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.queue_capacity == 0 {
            return Err(ConfigError::ZeroValue {
                field: "ledger.queue_capacity",
            });
        }
        if self.ledger.receipt_retention == 0 {
            return Err(ConfigError::ZeroValue {
                field: "ledger.receipt_retention",
            });
        }
        if self.bus.capacity == 0 {
            return Err(ConfigError::ZeroValue {
                field: "bus.capacity",
            });
        }
        if self.client.confirmation_timeout_ms == 0 {
            return Err(ConfigError::ZeroValue {
                field: "client.confirmation_timeout_ms",
            });
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::EmptyLogLevel);
        }
        Ok(())
    }

    /// Confirmation timeout shared by the node and the accessor.
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.client.confirmation_timeout_ms)
    }

    /// Configuration for the ledger node.
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            chain_id: self.ledger.chain_id,
            queue_capacity: self.ledger.queue_capacity,
            confirmation_timeout: self.confirmation_timeout(),
            block_time: Duration::from_millis(self.ledger.block_time_ms),
            receipt_retention: self.ledger.receipt_retention,
        }
    }

    /// Configuration for the record accessor.
    pub fn accessor_config(&self) -> AccessorConfig {
        AccessorConfig {
            confirmation_timeout: self.confirmation_timeout(),
        }
    }

    /// Configuration for the view synchronizer.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            reject_blank_content: self.client.reject_blank_content,
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { key, value: raw }),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable is set but does not parse.
    #[error("{key} has invalid value {value:?}")]
    InvalidVar {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// A capacity or timeout is zero.
    #[error("{field} must be greater than zero")]
    ZeroValue {
        /// Offending field.
        field: &'static str,
    },

    /// The log filter is blank.
    #[error("log level must not be empty")]
    EmptyLogLevel,
}

/// Ledger node section.
#[derive(Debug, Clone)]
pub struct LedgerSection {
    /// Chain id committed to by the genesis block.
    pub chain_id: u64,
    /// Writer queue capacity.
    pub queue_capacity: usize,
    /// Delay before each transaction is applied, in milliseconds.
    pub block_time_ms: u64,
    /// Settled receipts kept for late confirmation waits.
    pub receipt_retention: usize,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            queue_capacity: 256,
            block_time_ms: 0,
            receipt_retention: 4096,
        }
    }
}

/// Event bus section.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Notifications buffered per subscriber before it lags.
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Client session section.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long a submission waits for its receipt.
    pub confirmation_timeout_ms: u64,
    /// Refuse blank content before submitting.
    pub reject_blank_content: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_ms: 30_000,
            reject_blank_content: true,
        }
    }
}

/// Logging section.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
