//! Configuration and input validation.
//!
//! Semantic checks serde cannot express. `validate_config` returns every
//! problem at once so a bad config file is fixed in one pass.

use thiserror::Error;

use crate::config::networks::Network;
use crate::config::schema::{BridgeConfig, ChainEndpoint};

/// Mnemonic lengths accepted by BIP-39.
pub const VALID_MNEMONIC_LENGTHS: [usize; 4] = [12, 15, 18, 24];

/// A single semantic problem in the configuration or user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{layer}: invalid RPC URL '{url}'")]
    InvalidUrl { layer: &'static str, url: String },

    #[error("{layer}: no RPC URL and network '{network}' has no preset")]
    MissingUrl { layer: &'static str, network: Network },

    #[error("{0}: rpc_timeout_secs must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("messenger.poll_interval_ms must be greater than zero")]
    ZeroPollInterval,

    #[error("contracts.{0} is required for a custom network")]
    MissingContract(&'static str),

    #[error("The mnemonic has {0} words, expected 12, 15, 18 or 24")]
    MnemonicLength(usize),

    #[error("hash should be \"0x\" followed by 64 hex digits")]
    InvalidTxHash,

    #[error("infuraID should be 32 hex digits")]
    InvalidInfuraId,
}

/// Validate a loaded configuration.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_endpoint("l1", &config.l1, config.network, &mut errors);
    validate_endpoint("l2", &config.l2, config.network, &mut errors);

    if config.messenger.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    if config.network == Network::Custom {
        let contracts = &config.contracts;
        let required = [
            ("l1_cross_domain_messenger", contracts.l1_cross_domain_messenger.is_some()),
            ("l1_standard_bridge", contracts.l1_standard_bridge.is_some()),
            ("optimism_portal", contracts.optimism_portal.is_some()),
            ("l2_output_oracle", contracts.l2_output_oracle.is_some()),
        ];
        for (name, present) in required {
            if !present {
                errors.push(ValidationError::MissingContract(name));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_endpoint(
    layer: &'static str,
    endpoint: &ChainEndpoint,
    network: Network,
    errors: &mut Vec<ValidationError>,
) {
    if endpoint.rpc_url.is_empty() {
        // Filled in from the preset once an API key is known.
        if network.preset().is_none() {
            errors.push(ValidationError::MissingUrl { layer, network });
        }
    } else if url::Url::parse(&endpoint.rpc_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            layer,
            url: endpoint.rpc_url.clone(),
        });
    }

    for url in &endpoint.failover_urls {
        if url::Url::parse(url).is_err() {
            errors.push(ValidationError::InvalidUrl {
                layer,
                url: url.clone(),
            });
        }
    }

    if endpoint.rpc_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout(layer));
    }
}

/// Check that a mnemonic has a BIP-39 word count.
///
/// Words are runs of ASCII letters, so stray punctuation or extra spaces
/// don't change the count.
pub fn validate_mnemonic(phrase: &str) -> Result<(), ValidationError> {
    let words = phrase
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .count();
    if VALID_MNEMONIC_LENGTHS.contains(&words) {
        Ok(())
    } else {
        Err(ValidationError::MnemonicLength(words))
    }
}

/// Check the textual form of a transaction hash.
pub fn validate_tx_hash(hash: &str) -> Result<(), ValidationError> {
    let digits = hash.strip_prefix("0x").ok_or(ValidationError::InvalidTxHash)?;
    if digits.len() == 64 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTxHash)
    }
}

/// Check an Infura project id (32 lowercase hex digits).
pub fn validate_infura_id(id: &str) -> Result<(), ValidationError> {
    let ok = id.len() == 32 && id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidInfuraId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&BridgeConfig::default()).is_ok());
    }

    #[test]
    fn test_custom_network_collects_all_errors() {
        let mut config = BridgeConfig::default();
        config.network = Network::Custom;
        config.messenger.poll_interval_ms = 0;
        config.l2.rpc_url = "not a url".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroPollInterval));
        assert!(errors.contains(&ValidationError::MissingUrl {
            layer: "l1",
            network: Network::Custom
        }));
        assert!(errors.contains(&ValidationError::InvalidUrl {
            layer: "l2",
            url: "not a url".to_string()
        }));
        assert!(errors.contains(&ValidationError::MissingContract("optimism_portal")));
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, ValidationError::MissingContract(_)))
                .count(),
            4
        );
    }

    #[test]
    fn test_custom_network_with_contracts() {
        let mut config = BridgeConfig::default();
        config.network = Network::Custom;
        config.l1.rpc_url = "http://localhost:8545".to_string();
        config.l2.rpc_url = "http://localhost:9545".to_string();
        config.contracts.l1_cross_domain_messenger = Some(Address::repeat_byte(1));
        config.contracts.l1_standard_bridge = Some(Address::repeat_byte(2));
        config.contracts.optimism_portal = Some(Address::repeat_byte(3));
        config.contracts.l2_output_oracle = Some(Address::repeat_byte(4));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = BridgeConfig::default();
        config.l1.rpc_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ZeroTimeout("l1")]);
    }

    #[test]
    fn test_mnemonic_lengths() {
        let twelve = "test test test test test test test test test test test junk";
        assert!(validate_mnemonic(twelve).is_ok());
        assert!(validate_mnemonic(&format!("  {twelve}  ")).is_ok());
        assert_eq!(
            validate_mnemonic("test test test"),
            Err(ValidationError::MnemonicLength(3))
        );
        let thirteen = format!("{twelve} extra");
        assert_eq!(
            validate_mnemonic(&thirteen),
            Err(ValidationError::MnemonicLength(13))
        );
    }

    #[test]
    fn test_tx_hash_format() {
        let good = format!("0x{}", "ab".repeat(32));
        assert!(validate_tx_hash(&good).is_ok());
        assert!(validate_tx_hash(&"ab".repeat(32)).is_err());
        assert!(validate_tx_hash("0x1234").is_err());
        assert!(validate_tx_hash(&format!("0x{}", "zz".repeat(32))).is_err());
    }

    #[test]
    fn test_infura_id_format() {
        assert!(validate_infura_id("0123456789abcdef0123456789abcdef").is_ok());
        assert!(validate_infura_id("0123456789ABCDEF0123456789ABCDEF").is_err());
        assert!(validate_infura_id("0123").is_err());
    }
}
