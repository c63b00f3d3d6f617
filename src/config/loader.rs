//! Configuration loading from disk and preset resolution.

use std::fs;
use std::path::Path;

use crate::config::networks::{L1Contracts, RpcProvider};
use crate::config::schema::BridgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<Vec<ValidationError>> for ConfigError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ConfigError::Validation(errors)
    }
}

impl From<ValidationError> for ConfigError {
    fn from(error: ValidationError) -> Self {
        ConfigError::Validation(vec![error])
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: BridgeConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

impl BridgeConfig {
    /// Fill endpoints left empty from the network preset.
    ///
    /// RPC URLs are only derived when an API key is supplied; chain ids are
    /// always taken from the preset when unset.
    pub fn apply_preset(&mut self, rpc_key: Option<(RpcProvider, &str)>) {
        let Some(preset) = self.network.preset() else {
            return;
        };

        if self.l1.chain_id == 0 {
            self.l1.chain_id = preset.l1_chain_id;
        }
        if self.l2.chain_id == 0 {
            self.l2.chain_id = preset.l2_chain_id;
        }

        if let Some((provider, key)) = rpc_key {
            let (l1_url, l2_url) = preset.rpc_urls(provider, key);
            if self.l1.rpc_url.is_empty() {
                self.l1.rpc_url = l1_url;
            }
            if self.l2.rpc_url.is_empty() {
                self.l2.rpc_url = l2_url;
            }
        }

        if self.tokens.l1_token.is_none() && self.tokens.l2_token.is_none() {
            if let Some((l1, l2)) = preset.demo_token {
                self.tokens.l1_token = Some(l1);
                self.tokens.l2_token = Some(l2);
            }
        }
    }

    /// L1 contract addresses: explicit overrides first, then the preset.
    pub fn l1_contracts(&self) -> Result<L1Contracts, ValidationError> {
        let preset = self.network.preset().map(|p| p.contracts);
        let overrides = &self.contracts;

        let pick = |value: Option<alloy::primitives::Address>,
                    from_preset: fn(&L1Contracts) -> alloy::primitives::Address,
                    name: &'static str| {
            value
                .or_else(|| preset.as_ref().map(from_preset))
                .ok_or(ValidationError::MissingContract(name))
        };

        Ok(L1Contracts {
            l1_cross_domain_messenger: pick(
                overrides.l1_cross_domain_messenger,
                |c| c.l1_cross_domain_messenger,
                "l1_cross_domain_messenger",
            )?,
            l1_standard_bridge: pick(
                overrides.l1_standard_bridge,
                |c| c.l1_standard_bridge,
                "l1_standard_bridge",
            )?,
            optimism_portal: pick(
                overrides.optimism_portal,
                |c| c.optimism_portal,
                "optimism_portal",
            )?,
            l2_output_oracle: pick(
                overrides.l2_output_oracle,
                |c| c.l2_output_oracle,
                "l2_output_oracle",
            )?,
        })
    }

    /// Check that both layers ended up with an RPC URL.
    pub fn require_endpoints(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        for (layer, endpoint) in [("l1", &self.l1), ("l2", &self.l2)] {
            if endpoint.rpc_url.is_empty() {
                errors.push(ValidationError::MissingUrl {
                    layer,
                    network: self.network,
                });
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}
