//! Per-invocation state shared by the command handlers.

use alloy::primitives::{Address, TxHash};

use crate::blockchain::{BlockchainClient, BlockchainError, Layer, Wallet};
use crate::bridge::CrossChainMessenger;
use crate::cli::args::Cli;
use crate::cli::CliError;
use crate::config::{BridgeConfig, ValidationError};
use crate::lifecycle::shutdown::Shutdown;

/// Resolved configuration plus the optional signer.
pub struct Context {
    pub config: BridgeConfig,
    pub wallet: Option<Wallet>,
    pub shutdown: Shutdown,
}

impl Context {
    pub fn new(cli: &Cli, config: BridgeConfig, shutdown: Shutdown) -> Result<Self, CliError> {
        let wallet = match (&cli.mnemonic, &cli.private_key) {
            (Some(phrase), _) => Some(Wallet::from_mnemonic(phrase, cli.account_index)?),
            (None, Some(key)) => Some(Wallet::from_private_key(key)?),
            (None, None) => None,
        };
        Ok(Self {
            config,
            wallet,
            shutdown,
        })
    }

    /// Signer address, required by every command that sends a transaction.
    pub fn signer(&self) -> Result<Address, CliError> {
        self.wallet.as_ref().map(Wallet::address).ok_or_else(|| {
            BlockchainError::Wallet("Set MNEMONIC or PRIVATE_KEY (or pass --mnemonic / --private-key)".into())
                .into()
        })
    }

    /// Messenger over both layers, chain ids verified.
    pub async fn messenger(&self) -> Result<CrossChainMessenger, CliError> {
        self.config.require_endpoints()?;
        let messenger = CrossChainMessenger::connect(&self.config, self.wallet.as_ref()).await?;
        Ok(messenger.with_shutdown(self.shutdown.clone()))
    }

    /// L2 client alone, for commands that never touch L1.
    pub async fn l2_client(&self) -> Result<BlockchainClient, CliError> {
        if self.config.l2.rpc_url.is_empty() {
            return Err(ValidationError::MissingUrl {
                layer: "l2",
                network: self.config.network,
            }
            .into());
        }
        let client = BlockchainClient::new(Layer::L2, self.config.l2.clone(), self.wallet.as_ref())?;
        client.verify_chain_id().await?;
        Ok(client)
    }

    /// Explorer line for a transaction, when the network has an explorer.
    pub fn explorer_line(&self, layer: Layer, hash: TxHash) -> Option<String> {
        let preset = self.config.network.preset()?;
        let url = match layer {
            Layer::L1 => preset.l1_tx_url(hash),
            Layer::L2 => preset.l2_tx_url(hash),
        };
        Some(format!("\tMore info: {}", url))
    }

    pub fn print_explorer_link(&self, layer: Layer, hash: TxHash) {
        if let Some(line) = self.explorer_line(layer, hash) {
            println!("{}", line);
        }
    }
}
