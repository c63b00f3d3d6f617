//! L2 transaction cost estimation.
//!
//! # Data Flow
//! ```text
//! TransactionRequest (demo Greeter call or --to/--data)
//!     → estimator.rs: eth_estimateGas × gas price (L2 part)
//!                   + GasPriceOracle over the unsigned encoding (L1 part)
//!     → verify.rs (optional): send it, read l1Fee / l1GasUsed / gasUsed
//!                             from the receipt, total from the balance delta
//! ```
//!
//! A rollup transaction pays for L2 execution and for posting its data to L1.
//! The second part depends on the serialized transaction, which is why the
//! estimate needs a fully populated (but unsigned) EIP-1559 transaction.

pub mod estimator;
pub mod verify;

use alloy::primitives::{TxHash, U256};
use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::config::Network;

pub use estimator::{default_transaction, estimate};
pub use verify::verify;

/// Estimated costs, all amounts in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    pub l1_gas: U256,
    pub l2_gas: u64,
    pub l1_cost: U256,
    pub l2_cost: U256,
    pub total_cost: U256,
}

/// Costs actually paid by a sent transaction, in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasUsage {
    pub tx_hash: TxHash,
    pub l1_gas: U256,
    pub l2_gas: u64,
    pub l1_cost: U256,
    pub l2_cost: U256,
    pub total_cost: U256,
}

/// Errors raised while estimating or measuring costs.
#[derive(Debug, Error)]
pub enum GasError {
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error("Transaction needs a 'to' address")]
    MissingTarget,

    #[error("No demo contract known on {0}; pass --to and --data")]
    NoDefaultTarget(Network),

    #[error("Sending transaction failed: {0}")]
    Send(String),

    #[error("Receipt of {0} has no L1 fee fields; is this an OP Stack chain?")]
    MissingL1Fee(TxHash),

    #[error("Balance did not change after {0} was mined")]
    BalanceUnchanged(TxHash),
}

/// Result type for gas operations.
pub type GasResult<T> = Result<T, GasError>;
