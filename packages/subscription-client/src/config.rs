//! Client configuration.
//!
//! Contract addresses are configuration, never constants: deployments drift,
//! so `[contracts]` holds defaults and `[chains.<id>]` overrides them per
//! chain id.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::retry::{Backoff, RetryPolicy};
use crate::types::errors::{ClientError, Result};
use crate::types::{
    DEFAULT_COUNT_BOUND, DEFAULT_FALLBACK_IMAGE, DEFAULT_IPFS_GATEWAY, DEFAULT_PROBE_BOUND, DEFAULT_SUPPORTED_CHAINS,
};

pub const CONFIG_PATH_ENV: &str = "SUBSCRIPTION_CLIENT_CONFIG";
pub const RPC_URL_ENV: &str = "SUBSCRIPTION_CLIENT_RPC_URL";
pub const GATEWAY_ENV: &str = "SUBSCRIPTION_CLIENT_IPFS_GATEWAY";
const DEFAULT_CONFIG_FILE: &str = "subscription-client.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Chains the deployment is known to work on. Others only warn.
    #[serde(default = "default_supported_chains")]
    pub supported_chains: Vec<u64>,
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Default contract addresses.
    #[serde(default)]
    pub contracts: ContractAddresses,
    /// Per-chain overrides, keyed by decimal chain id.
    #[serde(default)]
    pub chains: BTreeMap<String, ContractAddresses>,
    #[serde(default)]
    pub calls: CallConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// How often the HTTP provider polls for account/chain drift.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    #[serde(default)]
    pub creator_registry: Option<Address>,
    #[serde(default)]
    pub content_nft: Option<Address>,
    #[serde(default)]
    pub subscription_manager: Option<Address>,
}

/// Fully resolved addresses for one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub creator_registry: Address,
    pub content_nft: Address,
    pub subscription_manager: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfig {
    /// Bound on a single read or submission round trip.
    #[serde(default = "default_call_timeout")]
    pub timeout_ms: u64,
    /// Bound on a whole write: the wallet prompt plus mining.
    #[serde(default = "default_tx_timeout")]
    pub tx_timeout_ms: u64,
    #[serde(default = "default_receipt_poll")]
    pub receipt_poll_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay")]
    pub delay_ms: u64,
    #[serde(default)]
    pub backoff: Backoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStrategyKind {
    #[default]
    Probe,
    Count,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default)]
    pub strategy: ListingStrategyKind,
    /// Upper bound on sequential id probes.
    #[serde(default = "default_max_probe")]
    pub max_probe: u64,
    /// Ceiling applied to contract-reported counts.
    #[serde(default = "default_max_count")]
    pub max_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_gateway")]
    pub gateway: String,
    #[serde(default = "default_metadata_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_fallback_image")]
    pub fallback_image: String,
}

fn default_supported_chains() -> Vec<u64> {
    DEFAULT_SUPPORTED_CHAINS.to_vec()
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_poll_interval() -> u64 {
    4000
}

fn default_call_timeout() -> u64 {
    30_000
}

fn default_tx_timeout() -> u64 {
    120_000
}

fn default_receipt_poll() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_max_probe() -> u64 {
    DEFAULT_PROBE_BOUND
}

fn default_max_count() -> u64 {
    DEFAULT_COUNT_BOUND
}

fn default_gateway() -> String {
    DEFAULT_IPFS_GATEWAY.to_string()
}

fn default_metadata_timeout() -> u64 {
    5000
}

fn default_fallback_image() -> String {
    DEFAULT_FALLBACK_IMAGE.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            supported_chains: default_supported_chains(),
            provider: ProviderConfig::default(),
            contracts: ContractAddresses::default(),
            chains: BTreeMap::new(),
            calls: CallConfig::default(),
            retry: RetryConfig::default(),
            listing: ListingConfig::default(),
            metadata: MetadataConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_call_timeout(),
            tx_timeout_ms: default_tx_timeout(),
            receipt_poll_ms: default_receipt_poll(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay(),
            backoff: Backoff::default(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            strategy: ListingStrategyKind::default(),
            max_probe: default_max_probe(),
            max_count: default_max_count(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            gateway: default_gateway(),
            timeout_ms: default_metadata_timeout(),
            fallback_image: default_fallback_image(),
        }
    }
}

impl ProviderConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.delay_ms),
            backoff: self.backoff,
        }
    }
}

impl MetadataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ClientConfig {
    /// Loads the config file (if present) and applies env overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))?;
            Self::from_toml_str(&content)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ClientError::Config(e.to_string()))
    }

    fn config_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            self.provider.rpc_url = url;
        }
        if let Ok(gateway) = std::env::var(GATEWAY_ENV) {
            self.metadata.gateway = gateway;
        }
    }

    pub fn is_supported(&self, chain_id: u64) -> bool {
        self.supported_chains.contains(&chain_id)
    }

    /// Addresses for `chain_id`: the chain's override where set, the
    /// defaults otherwise. Every contract must resolve.
    pub fn deployment_for(&self, chain_id: u64) -> Result<Deployment> {
        let overrides = self.chains.get(&chain_id.to_string());
        let pick = |select: fn(&ContractAddresses) -> Option<Address>, name: &str| {
            overrides
                .and_then(select)
                .or_else(|| select(&self.contracts))
                .ok_or_else(|| {
                    ClientError::Config(format!("no {name} address configured for chain {chain_id}"))
                })
        };
        Ok(Deployment {
            creator_registry: pick(|c| c.creator_registry, "creator_registry")?,
            content_nft: pick(|c| c.content_nft, "content_nft")?,
            subscription_manager: pick(|c| c.subscription_manager, "subscription_manager")?,
        })
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.calls.timeout_ms)
    }

    pub fn tx_timeout(&self) -> Duration {
        Duration::from_millis(self.calls.tx_timeout_ms)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.calls.receipt_poll_ms)
    }
}
