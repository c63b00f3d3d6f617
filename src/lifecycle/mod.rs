//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     Ctrl-C → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every polling loop subscribed → BridgeError::Interrupted
//! ```

pub mod shutdown;
pub mod signals;
