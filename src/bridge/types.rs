//! Bridge message types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::{BlockchainError, Layer};
use crate::config::ValidationError;
use crate::bridge::contracts::WithdrawalTransaction;
use crate::bridge::status::MessageStatus;

/// Which way a message travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageDirection {
    /// Deposit.
    L1ToL2,
    /// Withdrawal.
    L2ToL1,
}

impl MessageDirection {
    /// Layer the message is sent from.
    pub fn source(self) -> Layer {
        match self {
            MessageDirection::L1ToL2 => Layer::L1,
            MessageDirection::L2ToL1 => Layer::L2,
        }
    }

    /// Layer the message is relayed on.
    pub fn destination(self) -> Layer {
        match self {
            MessageDirection::L1ToL2 => Layer::L2,
            MessageDirection::L2ToL1 => Layer::L1,
        }
    }
}

impl std::fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageDirection::L1ToL2 => f.write_str("L1 -> L2"),
            MessageDirection::L2ToL1 => f.write_str("L2 -> L1"),
        }
    }
}

/// Withdrawal as committed to by the L2ToL1MessagePasser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowLevelWithdrawal {
    pub nonce: U256,
    pub sender: Address,
    pub target: Address,
    pub value: U256,
    pub gas_limit: U256,
    pub data: Bytes,
    /// Hash stored in the message passer and the portal.
    pub hash: B256,
}

impl LowLevelWithdrawal {
    /// ABI struct passed to the portal.
    pub fn to_sol(&self) -> WithdrawalTransaction {
        WithdrawalTransaction {
            nonce: self.nonce,
            sender: self.sender,
            target: self.target,
            value: self.value,
            gasLimit: self.gas_limit,
            data: self.data.clone(),
        }
    }
}

/// One relayable message sent by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainMessage {
    pub direction: MessageDirection,
    /// Source transaction.
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub log_index: u64,
    pub sender: Address,
    pub target: Address,
    pub value: U256,
    pub min_gas_limit: U256,
    /// Versioned nonce, version in the top two bytes.
    pub message_nonce: U256,
    pub message: Bytes,
    /// Hash the destination messenger records on relay.
    pub hash: B256,
    /// Set for withdrawals only.
    pub withdrawal: Option<LowLevelWithdrawal>,
}

/// Outcome of a relay attempt on the destination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageReceiptStatus {
    Relayed,
    Failed,
}

/// Destination-side relay transaction for a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub status: MessageReceiptStatus,
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
}

/// A standard-bridge transfer found in event history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBridgeMessage {
    pub transaction_hash: TxHash,
    pub direction: MessageDirection,
    pub from: Address,
    pub to: Address,
    /// Zero for ETH.
    pub l1_token: Address,
    pub l2_token: Address,
    pub amount: U256,
    pub extra_data: Bytes,
    pub block_number: u64,
    pub log_index: u64,
}

/// Errors raised by bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error(transparent)]
    Config(#[from] ValidationError),

    /// A contract call or transaction submission failed.
    #[error("{call} failed: {source}")]
    Contract {
        call: &'static str,
        #[source]
        source: alloy::contract::Error,
    },

    #[error("Transaction {0} not found on L1 or L2")]
    TransactionNotFound(TxHash),

    #[error("Transaction {tx_hash} has {count} cross-domain messages, index {index} is out of range")]
    MessageIndexOutOfBounds {
        tx_hash: TxHash,
        index: usize,
        count: usize,
    },

    #[error("Unsupported cross-domain message version {0}")]
    UnsupportedVersion(u16),

    #[error("No MessagePassed event matches message {0}")]
    MissingWithdrawal(B256),

    #[error("Withdrawal hash mismatch: event has {event}, computed {computed}")]
    WithdrawalHashMismatch { event: B256, computed: B256 },

    #[error("Message {hash} is {actual}, expected {expected}")]
    UnexpectedStatus {
        hash: B256,
        expected: MessageStatus,
        actual: MessageStatus,
    },

    #[error("L2 block {0} not found")]
    BlockNotFound(u64),

    #[error("Output root mismatch for L2 output {index}: oracle has {expected}, computed {computed}")]
    OutputRootMismatch {
        index: U256,
        expected: B256,
        computed: B256,
    },

    #[error("Storage proof for withdrawal {0} is empty")]
    EmptyStorageProof(B256),

    #[error("Timed out after {secs} seconds waiting for {what}")]
    WaitTimeout { what: String, secs: u64 },

    #[error("Interrupted")]
    Interrupted,
}

impl BridgeError {
    /// Errors worth retrying while polling.
    pub fn is_transient(&self) -> bool {
        match self {
            BridgeError::Blockchain(BlockchainError::Rpc(_) | BlockchainError::Timeout(_)) => true,
            BridgeError::Contract { source, .. } => {
                matches!(source, alloy::contract::Error::TransportError(_))
            }
            _ => false,
        }
    }
}

/// Build a mapper from a contract error to [`BridgeError::Contract`].
pub(crate) fn contract_error(call: &'static str) -> impl FnOnce(alloy::contract::Error) -> BridgeError {
    move |source| BridgeError::Contract { call, source }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
