//! Transaction submission checks and confirmation.
//!
//! # Responsibilities
//! - Refuse to submit while gas prices spike above the configured ceiling
//! - Wait for receipts with the configured confirmation depth
//! - Turn reverted receipts into errors

use alloy::network::Ethereum;
use alloy::providers::PendingTransactionBuilder;
use alloy::rpc::types::TransactionReceipt;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

const WEI_PER_GWEI: u128 = 1_000_000_000;

impl BlockchainClient {
    /// Fail if the current gas price exceeds the configured maximum.
    pub async fn check_gas_price(&self) -> BlockchainResult<u128> {
        let gas_price = self.get_gas_price().await?;
        let gas_price_gwei = gas_price / WEI_PER_GWEI;
        let max_gwei = self.config().max_gas_price_gwei;

        if gas_price_gwei > max_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei,
            });
        }
        Ok(gas_price)
    }

    /// Wait for a submitted transaction to be mined and confirmed.
    ///
    /// # Arguments
    /// * `pending` - Handle returned by `send()`
    /// * `what` - Short label for logs and errors ("deposit", "approve", ...)
    pub async fn confirm(
        &self,
        pending: PendingTransactionBuilder<Ethereum>,
        what: &str,
    ) -> BlockchainResult<TransactionReceipt> {
        let tx_hash = *pending.tx_hash();
        let confirmations = self.config().confirmation_blocks.max(1);
        tracing::info!(layer = %self.layer(), %tx_hash, what, confirmations, "Waiting for receipt");

        let receipt = pending
            .with_required_confirmations(confirmations)
            .get_receipt()
            .await
            .map_err(|e| BlockchainError::Rpc(format!("{} {}: {}", what, tx_hash, e)))?;

        if !receipt.status() {
            return Err(BlockchainError::Reverted(format!("{} {}", what, tx_hash)));
        }

        tracing::info!(
            layer = %self.layer(),
            %tx_hash,
            block_number = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "Transaction confirmed"
        );
        Ok(receipt)
    }
}
