//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge
//! tools. All types derive Serde traits for deserialization from config files.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::config::networks::Network;

/// Root configuration for the bridge tools.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Which preset the endpoints and contract addresses derive from.
    pub network: Network,

    /// L1 (origin chain) endpoint.
    pub l1: ChainEndpoint,

    /// L2 (rollup chain) endpoint.
    pub l2: ChainEndpoint,

    /// L1 contract address overrides.
    pub contracts: ContractsConfig,

    /// Message polling and relay settings.
    pub messenger: MessengerConfig,

    /// Default ERC-20 pair for the token flows.
    pub tokens: TokenPairConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// JSON-RPC endpoint configuration for one layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainEndpoint {
    /// JSON-RPC endpoint URL. Empty means "derive from the network preset".
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Expected chain ID. Zero means "whatever the endpoint reports".
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations to wait for after submitting.
    pub confirmation_blocks: u64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for ChainEndpoint {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            failover_urls: Vec::new(),
            chain_id: 0,
            rpc_timeout_secs: 30,
            confirmation_blocks: 1,
            max_gas_price_gwei: 500,
        }
    }
}

/// L1 contract addresses. Unset fields fall back to the network preset.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractsConfig {
    pub l1_cross_domain_messenger: Option<Address>,
    pub l1_standard_bridge: Option<Address>,
    pub optimism_portal: Option<Address>,
    pub l2_output_oracle: Option<Address>,
}

/// Cross-domain message handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MessengerConfig {
    /// Interval between status polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Give up waiting for a status after this many seconds (None = forever).
    pub wait_timeout_secs: Option<u64>,

    /// Gas limit forwarded to L2 when depositing.
    pub deposit_min_gas_limit: u32,

    /// Gas limit forwarded to L1 when withdrawing.
    pub withdrawal_min_gas_limit: u32,

    /// First block scanned when looking up relay receipts and bridge history.
    pub from_block: u64,

    /// Consecutive RPC failures tolerated while polling.
    pub max_poll_failures: u32,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 4000,
            wait_timeout_secs: None,
            deposit_min_gas_limit: 200_000,
            withdrawal_min_gas_limit: 0,
            from_block: 0,
            max_poll_failures: 5,
        }
    }
}

/// An L1 token and its L2 representation.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TokenPairConfig {
    pub l1_token: Option<Address>,
    pub l2_token: Option<Address>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}
