//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (tx hashes, message hashes, statuses)
//!     → logging.rs subscriber (EnvFilter + fmt layer on stderr)
//! ```

pub mod logging;
