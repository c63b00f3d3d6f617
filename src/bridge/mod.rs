//! Cross-domain bridge subsystem.
//!
//! # Data Flow
//! ```text
//! Transfers (messenger.rs):
//!     deposit / withdraw → standard bridge → SentMessage on the source messenger
//!
//! Tracking:
//!     source receipt → message.rs (decode + hash) → CrossChainMessage
//!     → messenger.rs (status from messenger, oracle and portal state)
//!     → watcher.rs (poll until a target status / relay receipt)
//!
//! Withdrawals:
//!     READY_TO_PROVE → prove_message → IN_CHALLENGE_PERIOD
//!     → READY_FOR_RELAY → finalize_message → RELAYED
//!
//! History (history.rs):
//!     standard bridge events filtered by sender
//! ```

pub mod contracts;
pub mod history;
pub mod message;
pub mod messenger;
pub mod status;
pub mod types;
pub mod watcher;

pub use messenger::{CrossChainMessenger, PendingTx};
pub use status::MessageStatus;
pub use types::{
    BridgeError, BridgeResult, CrossChainMessage, LowLevelWithdrawal, MessageDirection, MessageReceipt,
    MessageReceiptStatus, TokenBridgeMessage,
};
