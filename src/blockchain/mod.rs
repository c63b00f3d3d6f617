//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags / environment (mnemonic or private key, RPC URLs)
//!     → wallet.rs (key loading, derivation)
//!     → client.rs (one client per layer, timeouts + failover)
//!     → transaction.rs (gas ceiling, confirmation, revert detection)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from flags or environment variables
//! - Never log private keys or mnemonics
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use types::{BlockchainError, BlockchainResult, ChainEndpoint, ChainId, Layer};
pub use wallet::Wallet;
