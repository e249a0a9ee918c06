//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tool.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the identity used when none is selected.
pub const DEFAULT_IDENTITY: &str = "default";
/// Name of the built-in co-signing identity (`PRIVATE_KEY_1` / `ACCOUNT_1`).
pub const RECEIVER_IDENTITY: &str = "receiver";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OpsConfig {
    /// Node connection settings.
    pub ledger: LedgerConfig,

    /// Transaction parameters applied to every submission.
    pub submission: SubmissionConfig,

    /// Confirmation polling.
    pub polling: PollingConfig,

    /// Chunk sizes and delays for batched operations.
    pub batch: BatchConfig,

    /// Addresses of the deployed programs.
    pub contracts: ContractsConfig,

    /// Named signing identities.
    pub identities: BTreeMap<String, IdentityConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl OpsConfig {
    /// Look up an identity by name, falling back to the built-in profiles
    /// for [`DEFAULT_IDENTITY`] and [`RECEIVER_IDENTITY`].
    pub fn identity(&self, name: &str) -> Option<IdentityConfig> {
        match self.identities.get(name) {
            Some(identity) => Some(identity.clone()),
            None if name == DEFAULT_IDENTITY => Some(IdentityConfig::default()),
            None if name == RECEIVER_IDENTITY => Some(IdentityConfig::receiver()),
            None => None,
        }
    }
}

/// Node connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// REST endpoint, including the API version path (e.g. `.../v1`).
    pub node_url: String,

    /// Failover endpoints used for read requests.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            node_url: "http://127.0.0.1:8080/v1".to_string(),
            failover_urls: Vec::new(),
            request_timeout_secs: 10,
        }
    }
}

/// Transaction parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Default gas budget when a call does not set one.
    pub max_gas_amount: u64,

    /// Fixed gas unit price in octas. Uses the node's estimate when unset.
    pub gas_unit_price: Option<u64>,

    /// Seconds until a submitted transaction expires.
    pub expiration_secs: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            max_gas_amount: 200_000,
            gas_unit_price: None,
            expiration_secs: 600,
        }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Give up waiting for a transaction after this many seconds.
    pub timeout_secs: u64,

    /// First delay between status polls in milliseconds.
    pub initial_interval_ms: u64,

    /// Upper bound on the delay between status polls in milliseconds.
    pub max_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            initial_interval_ms: 200,
            max_interval_ms: 2_000,
        }
    }
}

/// Defaults for batched operations. Every value can be overridden per
/// invocation on the command line.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Keys minted per transaction.
    pub mint_chunk_size: u64,

    /// Token records (URIs or asset rows) added per transaction.
    pub token_chunk_size: u64,

    /// Pause after each successful item in milliseconds.
    pub delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            mint_chunk_size: 100,
            token_chunk_size: 1_000,
            delay_ms: 0,
        }
    }
}

/// Program addresses. Either may be set through the environment
/// (`RES_ACCOUNT`, `ACCOUNT_GEN2`).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractsConfig {
    /// Address publishing the key collection `minting` module.
    pub keys_address: Option<String>,

    /// Address publishing the gen2 `minting` module.
    pub gen2_address: Option<String>,
}

/// Where to find a signing identity in the environment.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdentityConfig {
    /// Variable holding the hex-encoded ed25519 private key.
    pub private_key_env: String,

    /// Variable holding the account address.
    pub account_env: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            private_key_env: "PRIVATE_KEY".to_string(),
            account_env: "ACCOUNT".to_string(),
        }
    }
}

impl IdentityConfig {
    /// The second local account, used as a co-signer.
    pub fn receiver() -> Self {
        Self {
            private_key_env: "PRIVATE_KEY_1".to_string(),
            account_env: "ACCOUNT_1".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    /// Prometheus scrape address; metrics are only recorded locally when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}
