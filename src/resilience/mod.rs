//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Status poll fails with a transport error:
//!     → backoff.rs (exponential delay with jitter before the next poll)
//!     → after `max_poll_failures` in a row the error propagates
//! ```
//!
//! Per-call timeouts and provider failover live in `blockchain::client`.

pub mod backoff;
