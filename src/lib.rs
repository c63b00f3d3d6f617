//! L1/L2 bridge toolkit for OP Stack networks.

// Core subsystems
pub mod blockchain;
pub mod bridge;
pub mod config;
pub mod gas;

// Front end
pub mod cli;
pub mod report;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use blockchain::{BlockchainClient, Layer, Wallet};
pub use bridge::{CrossChainMessage, CrossChainMessenger, MessageDirection, MessageStatus};
pub use config::BridgeConfig;
pub use lifecycle::shutdown::Shutdown;
