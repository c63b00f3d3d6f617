//! Command-line front end.
//!
//! # Data Flow
//! ```text
//! argv + environment
//!     → args.rs (clap parsing, config file + flag merge)
//!     → context.rs (wallet, clients, messenger)
//!     → commands.rs (one handler per subcommand, progress on stdout)
//! ```

pub mod args;
pub mod commands;
pub mod context;

use alloy::primitives::TxHash;
use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::bridge::BridgeError;
use crate::config::{BridgeConfig, ConfigError, Network, ValidationError};
use crate::gas::GasError;
use crate::lifecycle::shutdown::Shutdown;

pub use args::{Cli, Command};
pub use context::Context;

/// Anything a command can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Gas(#[from] GasError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Invalid amount '{0}': {1}")]
    Amount(String, String),

    #[error("No token pair configured for {0}; pass --l1-token and --l2-token")]
    MissingTokenPair(Network),

    #[error("No cross-domain message found in transaction {0}")]
    NoMessages(TxHash),

    #[error("{0} proves withdrawals with fault proofs, which are not supported; use goerli or a custom network")]
    FaultProofNetwork(Network),
}

/// Run the parsed command against a resolved configuration.
pub async fn run(cli: Cli, config: BridgeConfig, shutdown: Shutdown) -> Result<(), CliError> {
    let ctx = Context::new(&cli, config, shutdown)?;

    match &cli.command {
        Command::Balances => commands::balances(&ctx).await,
        Command::DepositEth(args) => commands::deposit_eth(&ctx, args).await,
        Command::WithdrawEth(args) => commands::withdraw_eth(&ctx, args).await,
        Command::DepositErc20(args) => commands::deposit_erc20(&ctx, args).await,
        Command::WithdrawErc20(args) => commands::withdraw_erc20(&ctx, args).await,
        Command::Finalize { hash } => commands::finalize(&ctx, *hash).await,
        Command::Status { hash, index, json } => commands::status(&ctx, *hash, *index, *json).await,
        Command::Watch { hash, layer } => commands::watch(&ctx, *hash, *layer).await,
        Command::Trace { address } => commands::trace(&ctx, *address).await,
        Command::EstimateGas { verify, to, data } => {
            commands::estimate_gas(&ctx, *verify, *to, data.clone()).await
        }
    }
}
