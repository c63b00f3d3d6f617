//! Command-line arguments and their merge into the configuration.

use std::path::PathBuf;

use alloy::primitives::{Address, Bytes, TxHash};
use clap::{Args, Parser, Subcommand};

use crate::config::validation::{validate_infura_id, validate_tx_hash};
use crate::config::{load_config, BridgeConfig, ConfigError, Network, RpcProvider, ValidationError};

/// Move ETH and ERC-20 tokens between L1 and an OP Stack L2.
#[derive(Debug, Parser)]
#[command(name = "op-bridge", version, about, long_about = None)]
pub struct Cli {
    /// Network preset (chain ids, contract addresses, RPC templates).
    /// Mainnet and sepolia run fault proofs: deposits, status and trace work
    /// there, but withdrawals can only be proven on goerli or a custom
    /// network with an L2OutputOracle.
    #[arg(long, global = true, value_enum)]
    pub network: Option<Network>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// L1 JSON-RPC endpoint
    #[arg(long, global = true, env = "L1URL")]
    pub l1_url: Option<String>,

    /// L2 JSON-RPC endpoint
    #[arg(long, global = true, env = "L2URL")]
    pub l2_url: Option<String>,

    /// Alchemy API key, used to build both RPC URLs
    #[arg(long, global = true, env = "ALCHEMY_API_KEY", hide_env_values = true)]
    pub alchemy_key: Option<String>,

    /// Infura project id (32 hex digits), used when no Alchemy key is set
    #[arg(long, global = true, env = "INFURA_ID", hide_env_values = true, value_parser = parse_infura_id)]
    pub infura_id: Option<String>,

    /// BIP-39 mnemonic of the signing account
    #[arg(long, global = true, env = "MNEMONIC", hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// Hex private key, used when no mnemonic is set
    #[arg(long, global = true, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Account index on the mnemonic's derivation path
    #[arg(long, global = true, default_value_t = 0)]
    pub account_index: u32,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the signer's ETH (and demo token) balances on both layers
    Balances,

    /// Deposit ETH and wait for it to arrive on L2
    DepositEth(TransferArgs),

    /// Withdraw ETH: prove, wait out the challenge period, finalize
    WithdrawEth(WithdrawArgs),

    /// Approve and deposit an ERC-20, wait for it to arrive on L2
    DepositErc20(TokenArgs),

    /// Withdraw an ERC-20: prove, wait out the challenge period, finalize
    WithdrawErc20(TokenArgs),

    /// Resume a withdrawal from whatever state it is in
    Finalize {
        /// L2 transaction that started the withdrawal
        #[arg(long, value_parser = parse_tx_hash)]
        hash: TxHash,
    },

    /// Show the status of a cross-domain message
    Status {
        /// Transaction that sent the message (L1 or L2)
        #[arg(long, value_parser = parse_tx_hash)]
        hash: TxHash,

        /// Which message of the transaction
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Print the message and status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a message's hash and the transaction that relays it
    Watch {
        /// Transaction that sent the message
        #[arg(long, value_parser = parse_tx_hash)]
        hash: TxHash,

        /// Layer the transaction was sent on
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
        layer: u8,
    },

    /// List the deposits and withdrawals of an address
    Trace {
        /// Address to trace (defaults to the signer)
        #[arg(long)]
        address: Option<Address>,
    },

    /// Estimate the L1 and L2 cost of an L2 transaction
    EstimateGas {
        /// Also send the transaction and compare
        #[arg(long)]
        verify: bool,

        /// Target contract (defaults to the network's Greeter)
        #[arg(long, requires = "data")]
        to: Option<Address>,

        /// Calldata for --to
        #[arg(long, requires = "to")]
        data: Option<Bytes>,
    },
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    /// Amount in ETH
    #[arg(long, default_value = "0.000001")]
    pub amount: String,

    /// Receive on the other layer at this address instead of the signer's
    #[arg(long)]
    pub recipient: Option<Address>,
}

#[derive(Debug, Args)]
pub struct WithdrawArgs {
    /// Amount in ETH
    #[arg(long, default_value = "0.01")]
    pub amount: String,

    /// Receive on L1 at this address instead of the signer's
    #[arg(long)]
    pub recipient: Option<Address>,
}

#[derive(Debug, Args)]
pub struct TokenArgs {
    /// L1 token (defaults to the network's demo token)
    #[arg(long, requires = "l2_token")]
    pub l1_token: Option<Address>,

    /// L2 token paired with --l1-token
    #[arg(long, requires = "l1_token")]
    pub l2_token: Option<Address>,

    /// Amount in whole tokens (decimals allowed)
    #[arg(long, default_value = "1")]
    pub amount: String,

    /// Receive on the other layer at this address instead of the signer's
    #[arg(long)]
    pub recipient: Option<Address>,

    /// Call the L1 token's faucet when the L1 balance is zero
    #[arg(long)]
    pub faucet: bool,
}

fn parse_tx_hash(s: &str) -> Result<TxHash, ValidationError> {
    validate_tx_hash(s)?;
    s.parse().map_err(|_| ValidationError::InvalidTxHash)
}

fn parse_infura_id(s: &str) -> Result<String, ValidationError> {
    validate_infura_id(s)?;
    Ok(s.to_string())
}

impl Cli {
    /// Defaults, then the config file, then flags and environment.
    pub fn build_config(&self) -> Result<BridgeConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => BridgeConfig::default(),
        };

        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(url) = &self.l1_url {
            config.l1.rpc_url = url.clone();
        }
        if let Some(url) = &self.l2_url {
            config.l2.rpc_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }

        let rpc_key = match (&self.alchemy_key, &self.infura_id) {
            (Some(key), _) => Some((RpcProvider::Alchemy, key.as_str())),
            (None, Some(id)) => Some((RpcProvider::Infura, id.as_str())),
            (None, None) => None,
        };
        config.apply_preset(rpc_key);

        crate::config::validation::validate_config(&config)?;
        Ok(config)
    }
}
