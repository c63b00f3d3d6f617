//! Wallet management.
//!
//! # Security
//! - Keys come from the command line or environment variables only
//! - Keys are never logged or serialized
//!
//! The same signer is used on both layers, so deposits and withdrawals move
//! funds between the same address on L1 and L2.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::validation::validate_mnemonic;

/// Signing identity shared by the L1 and L2 clients.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Wallet initialized from private key");

        Ok(Self { signer })
    }

    /// Derive a wallet from a BIP-39 mnemonic.
    ///
    /// Uses the standard Ethereum path `m/44'/60'/0'/0/{index}`.
    pub fn from_mnemonic(phrase: &str, index: u32) -> BlockchainResult<Self> {
        validate_mnemonic(phrase).map_err(|e| BlockchainError::Wallet(e.to_string()))?;
        let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ");

        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .index(index)
            .and_then(|builder| builder.build())
            .map_err(|e| BlockchainError::Wallet(format!("Mnemonic derivation failed: {}", e)))?;

        tracing::info!(address = %signer.address(), index, "Wallet derived from mnemonic");

        Ok(Self { signer })
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Network wallet for attaching to a provider.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}
