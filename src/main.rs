//! op-bridge: move ETH and ERC-20 tokens between L1 and an OP Stack L2.
//!
//! # Architecture Overview
//!
//! ```text
//!   argv / env / TOML ──▶ cli::args ──▶ config (presets, validation)
//!                                          │
//!                                          ▼
//!                               ┌─────────────────────┐
//!                               │  CrossChainMessenger │
//!                               │  (bridge::messenger) │
//!                               └──────┬───────┬──────┘
//!                                      │       │
//!                     L1 client ◀──────┘       └──────▶ L2 client
//!                  (blockchain::client)             (blockchain::client)
//!                  bridge, messenger,               bridge, messenger,
//!                  portal, output oracle            message passer, gas oracle
//!
//!   watcher: poll status ──▶ resilience::backoff on RPC errors
//!                        ──▶ lifecycle::shutdown on Ctrl-C
//! ```

use std::process::ExitCode;

use clap::Parser;

use op_bridge::bridge::BridgeError;
use op_bridge::cli::{self, Cli};
use op_bridge::lifecycle::{shutdown::Shutdown, signals::spawn_ctrl_c_listener};
use op_bridge::observability::logging::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.build_config()?;

    init_tracing(&config.observability.log_level);
    tracing::info!(
        network = %config.network,
        l1_chain_id = config.l1.chain_id,
        l2_chain_id = config.l2.chain_id,
        "op-bridge v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let shutdown = Shutdown::new();
    spawn_ctrl_c_listener(shutdown.clone());

    match shutdown.cancellable(cli::run(cli, config, shutdown.clone())).await {
        Some(result) => Ok(result?),
        None => Err(BridgeError::Interrupted.into()),
    }
}
