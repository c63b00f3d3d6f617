//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI flags / environment override individual fields
//!     → networks.rs fills the rest from the network preset
//!     → BridgeConfig (validated, immutable for the rest of the run)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - User input (mnemonic, hashes, API ids) is validated with the same error type

pub mod loader;
pub mod networks;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use networks::{L1Contracts, Network, NetworkPreset, RpcProvider};
pub use schema::{BridgeConfig, ChainEndpoint, MessengerConfig, ObservabilityConfig};
pub use validation::ValidationError;
