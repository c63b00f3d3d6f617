//! Cross-domain messenger: bridge transactions, message lookup, status, proof.
//!
//! # Responsibilities
//! - Submit deposits and withdrawals through the standard bridges
//! - Find the messages a transaction sent and resolve their status
//! - Find the relay transaction of a message on the destination chain
//! - Prove and finalize withdrawals through the portal

use alloy::eips::BlockNumberOrTag;
use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::providers::PendingTransactionBuilder;
use alloy::rpc::types::{Filter, TransactionReceipt};
use alloy::sol_types::SolEvent;

use crate::blockchain::{BlockchainClient, Layer, Wallet};
use crate::bridge::contracts::{
    ICrossDomainMessenger::{self, FailedRelayedMessage, RelayedMessage},
    IERC20, IL1StandardBridge, IL2OutputOracle, IL2StandardBridge, IOptimismPortal, OutputRootProof,
    L2_CROSS_DOMAIN_MESSENGER, L2_ETH_TOKEN, L2_STANDARD_BRIDGE, L2_TO_L1_MESSAGE_PASSER,
};
use crate::bridge::message::{compute_output_root, extract_messages, withdrawal_storage_slot};
use crate::bridge::status::{deposit_status, proven_withdrawal_status, MessageStatus};
use crate::bridge::types::{
    contract_error, BridgeError, BridgeResult, CrossChainMessage, MessageDirection, MessageReceipt,
    MessageReceiptStatus,
};
use crate::config::{BridgeConfig, L1Contracts, MessengerConfig};
use crate::lifecycle::shutdown::Shutdown;

/// Submitted transaction awaiting confirmation.
pub type PendingTx = PendingTransactionBuilder<Ethereum>;

/// Pair of L1/L2 clients plus the L1 contract addresses of one network.
#[derive(Debug, Clone)]
pub struct CrossChainMessenger {
    l1: BlockchainClient,
    l2: BlockchainClient,
    contracts: L1Contracts,
    pub(crate) config: MessengerConfig,
    pub(crate) shutdown: Shutdown,
}

impl CrossChainMessenger {
    /// Assemble a messenger from already-built clients.
    pub fn new(
        l1: BlockchainClient,
        l2: BlockchainClient,
        contracts: L1Contracts,
        config: MessengerConfig,
    ) -> Self {
        Self {
            l1,
            l2,
            contracts,
            config,
            shutdown: Shutdown::new(),
        }
    }

    /// Build both clients from configuration and check they point at the
    /// expected chains.
    pub async fn connect(config: &BridgeConfig, wallet: Option<&Wallet>) -> BridgeResult<Self> {
        let contracts = config.l1_contracts()?;
        let l1 = BlockchainClient::new(Layer::L1, config.l1.clone(), wallet)?;
        let l2 = BlockchainClient::new(Layer::L2, config.l2.clone(), wallet)?;

        let l1_chain = l1.verify_chain_id().await?;
        let l2_chain = l2.verify_chain_id().await?;
        tracing::info!(
            network = %config.network,
            l1_chain_id = l1_chain.0,
            l2_chain_id = l2_chain.0,
            "Messenger connected"
        );

        Ok(Self::new(l1, l2, contracts, config.messenger.clone()))
    }

    /// Cancel in-flight waits when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn l1(&self) -> &BlockchainClient {
        &self.l1
    }

    pub fn l2(&self) -> &BlockchainClient {
        &self.l2
    }

    pub fn client(&self, layer: Layer) -> &BlockchainClient {
        match layer {
            Layer::L1 => &self.l1,
            Layer::L2 => &self.l2,
        }
    }

    pub fn contracts(&self) -> &L1Contracts {
        &self.contracts
    }

    /// Wait for a transaction submitted on `layer`.
    pub async fn confirm(&self, layer: Layer, pending: PendingTx, what: &str) -> BridgeResult<TransactionReceipt> {
        Ok(self.client(layer).confirm(pending, what).await?)
    }

    // --- Transfers ---

    /// Deposit ETH to the signer's (or `recipient`'s) L2 address.
    pub async fn deposit_eth(&self, amount: U256, recipient: Option<Address>) -> BridgeResult<PendingTx> {
        self.l1.require_signer()?;
        self.l1.check_gas_price().await?;
        let bridge = IL1StandardBridge::new(self.contracts.l1_standard_bridge, self.l1.provider().clone());
        let gas = self.config.deposit_min_gas_limit;

        tracing::info!(%amount, ?recipient, "Depositing ETH");
        let sent = match recipient {
            Some(to) => bridge.depositETHTo(to, gas, Bytes::new()).value(amount).send().await,
            None => bridge.depositETH(gas, Bytes::new()).value(amount).send().await,
        };
        sent.map_err(contract_error("depositETH"))
    }

    /// Withdraw ETH to the signer's (or `recipient`'s) L1 address.
    pub async fn withdraw_eth(&self, amount: U256, recipient: Option<Address>) -> BridgeResult<PendingTx> {
        self.withdraw_token(L2_ETH_TOKEN, amount, recipient, amount).await
    }

    /// Let the L1 standard bridge pull `amount` of `l1_token`.
    pub async fn approve_erc20(&self, l1_token: Address, amount: U256) -> BridgeResult<PendingTx> {
        self.l1.require_signer()?;
        self.l1.check_gas_price().await?;
        let token = IERC20::new(l1_token, self.l1.provider().clone());

        tracing::info!(%l1_token, %amount, spender = %self.contracts.l1_standard_bridge, "Approving ERC-20");
        token
            .approve(self.contracts.l1_standard_bridge, amount)
            .send()
            .await
            .map_err(contract_error("approve"))
    }

    /// Deposit an approved ERC-20 amount.
    pub async fn deposit_erc20(
        &self,
        l1_token: Address,
        l2_token: Address,
        amount: U256,
        recipient: Option<Address>,
    ) -> BridgeResult<PendingTx> {
        self.l1.require_signer()?;
        self.l1.check_gas_price().await?;
        let bridge = IL1StandardBridge::new(self.contracts.l1_standard_bridge, self.l1.provider().clone());
        let gas = self.config.deposit_min_gas_limit;

        tracing::info!(%l1_token, %l2_token, %amount, ?recipient, "Depositing ERC-20");
        let sent = match recipient {
            Some(to) => {
                bridge
                    .depositERC20To(l1_token, l2_token, to, amount, gas, Bytes::new())
                    .send()
                    .await
            }
            None => {
                bridge
                    .depositERC20(l1_token, l2_token, amount, gas, Bytes::new())
                    .send()
                    .await
            }
        };
        sent.map_err(contract_error("depositERC20"))
    }

    /// Withdraw an ERC-20 amount back to L1.
    pub async fn withdraw_erc20(
        &self,
        l2_token: Address,
        amount: U256,
        recipient: Option<Address>,
    ) -> BridgeResult<PendingTx> {
        self.withdraw_token(l2_token, amount, recipient, U256::ZERO).await
    }

    async fn withdraw_token(
        &self,
        l2_token: Address,
        amount: U256,
        recipient: Option<Address>,
        value: U256,
    ) -> BridgeResult<PendingTx> {
        self.l2.require_signer()?;
        self.l2.check_gas_price().await?;
        let bridge = IL2StandardBridge::new(L2_STANDARD_BRIDGE, self.l2.provider().clone());
        let gas = self.config.withdrawal_min_gas_limit;

        tracing::info!(%l2_token, %amount, ?recipient, "Withdrawing");
        let sent = match recipient {
            Some(to) => {
                bridge
                    .withdrawTo(l2_token, to, amount, gas, Bytes::new())
                    .value(value)
                    .send()
                    .await
            }
            None => {
                bridge
                    .withdraw(l2_token, amount, gas, Bytes::new())
                    .value(value)
                    .send()
                    .await
            }
        };
        sent.map_err(contract_error("withdraw"))
    }

    // --- Tokens ---

    /// ERC-20 balance of `owner` on `layer`.
    pub async fn erc20_balance(&self, layer: Layer, token: Address, owner: Address) -> BridgeResult<U256> {
        Ok(self
            .client(layer)
            .call("balanceOf", |p| async move { IERC20::new(token, p).balanceOf(owner).call().await })
            .await?)
    }

    /// Token symbol on `layer`; the zero address is ETH.
    pub async fn token_symbol(&self, layer: Layer, token: Address) -> BridgeResult<String> {
        if token.is_zero() || token == L2_ETH_TOKEN {
            return Ok("ETH".to_string());
        }
        Ok(self
            .client(layer)
            .call("symbol", |p| async move { IERC20::new(token, p).symbol().call().await })
            .await?)
    }

    /// Token decimals on `layer`.
    pub async fn erc20_decimals(&self, layer: Layer, token: Address) -> BridgeResult<u8> {
        Ok(self
            .client(layer)
            .call("decimals", |p| async move { IERC20::new(token, p).decimals().call().await })
            .await?)
    }

    /// Mint test tokens from an L1 demo token's faucet.
    pub async fn erc20_faucet(&self, l1_token: Address) -> BridgeResult<PendingTx> {
        self.l1.require_signer()?;
        IERC20::new(l1_token, self.l1.provider().clone())
            .faucet()
            .send()
            .await
            .map_err(contract_error("faucet"))
    }

    // --- Messages ---

    /// Messages sent by a transaction.
    ///
    /// Without a direction the receipt is looked up on L1 first, then L2.
    pub async fn get_messages_by_transaction(
        &self,
        tx_hash: TxHash,
        direction: Option<MessageDirection>,
    ) -> BridgeResult<Vec<CrossChainMessage>> {
        let (direction, receipt) = match direction {
            Some(direction) => {
                let receipt = self
                    .client(direction.source())
                    .get_transaction_receipt(tx_hash)
                    .await?
                    .ok_or(BridgeError::TransactionNotFound(tx_hash))?;
                (direction, receipt)
            }
            None => {
                if let Some(receipt) = self.l1.get_transaction_receipt(tx_hash).await? {
                    (MessageDirection::L1ToL2, receipt)
                } else if let Some(receipt) = self.l2.get_transaction_receipt(tx_hash).await? {
                    (MessageDirection::L2ToL1, receipt)
                } else {
                    return Err(BridgeError::TransactionNotFound(tx_hash));
                }
            }
        };

        let messenger = self.source_messenger(direction);
        extract_messages(
            direction,
            tx_hash,
            receipt.block_number.unwrap_or_default(),
            receipt.inner.logs(),
            messenger,
        )
    }

    /// The `index`-th message sent by a transaction.
    pub async fn to_cross_chain_message(&self, tx_hash: TxHash, index: usize) -> BridgeResult<CrossChainMessage> {
        let messages = self.get_messages_by_transaction(tx_hash, None).await?;
        let count = messages.len();
        messages
            .into_iter()
            .nth(index)
            .ok_or(BridgeError::MessageIndexOutOfBounds { tx_hash, index, count })
    }

    /// Current status of a message.
    pub async fn get_message_status(&self, message: &CrossChainMessage) -> BridgeResult<MessageStatus> {
        let client = self.client(message.direction.destination());
        let messenger = self.destination_messenger(message.direction);
        let hash = message.hash;

        let successful = client
            .call("successfulMessages", |p| async move {
                ICrossDomainMessenger::new(messenger, p).successfulMessages(hash).call().await
            })
            .await?;
        if successful {
            return Ok(MessageStatus::Relayed);
        }

        let failed = client
            .call("failedMessages", |p| async move {
                ICrossDomainMessenger::new(messenger, p).failedMessages(hash).call().await
            })
            .await?;

        match message.direction {
            MessageDirection::L1ToL2 => Ok(deposit_status(successful, failed)),
            MessageDirection::L2ToL1 if failed => Ok(MessageStatus::ReadyForRelay),
            MessageDirection::L2ToL1 => self.get_withdrawal_status(message).await,
        }
    }

    async fn get_withdrawal_status(&self, message: &CrossChainMessage) -> BridgeResult<MessageStatus> {
        let oracle = self.contracts.l2_output_oracle;
        let portal = self.contracts.optimism_portal;
        let latest = self
            .l1
            .call("latestBlockNumber", |p| async move {
                IL2OutputOracle::new(oracle, p).latestBlockNumber().call().await
            })
            .await?;
        if latest < U256::from(message.block_number) {
            return Ok(MessageStatus::StateRootNotPublished);
        }

        let withdrawal = message
            .withdrawal
            .as_ref()
            .ok_or(BridgeError::MissingWithdrawal(message.hash))?;
        let withdrawal_hash = withdrawal.hash;
        let proven = self
            .l1
            .call("provenWithdrawals", |p| async move {
                IOptimismPortal::new(portal, p).provenWithdrawals(withdrawal_hash).call().await
            })
            .await?;
        let proven_at = u64::try_from(proven.timestamp).unwrap_or(u64::MAX);
        if proven_at == 0 {
            return Ok(MessageStatus::ReadyToProve);
        }

        let period = self
            .l1
            .call("FINALIZATION_PERIOD_SECONDS", |p| async move {
                IL2OutputOracle::new(oracle, p).FINALIZATION_PERIOD_SECONDS().call().await
            })
            .await?
            .saturating_to::<u64>();
        let now = self.l1.latest_block_timestamp().await?;

        tracing::debug!(message_hash = %message.hash, proven_at, period, now, "Withdrawal proven");
        Ok(proven_withdrawal_status(proven_at, period, now))
    }

    /// Relay transaction of a message on the destination chain, if any.
    ///
    /// A successful relay wins over earlier failed attempts.
    pub async fn get_message_receipt(&self, message: &CrossChainMessage) -> BridgeResult<Option<MessageReceipt>> {
        let destination = message.direction.destination();
        let filter = Filter::new()
            .address(self.destination_messenger(message.direction))
            .event_signature(vec![RelayedMessage::SIGNATURE_HASH, FailedRelayedMessage::SIGNATURE_HASH])
            .topic1(message.hash)
            .from_block(self.config.from_block);
        let logs = self.client(destination).get_logs(&filter).await?;

        let relayed = logs
            .iter()
            .find(|log| log.topic0() == Some(&RelayedMessage::SIGNATURE_HASH))
            .map(|log| (log, MessageReceiptStatus::Relayed));
        let failed = logs
            .iter()
            .rev()
            .find(|log| log.topic0() == Some(&FailedRelayedMessage::SIGNATURE_HASH))
            .map(|log| (log, MessageReceiptStatus::Failed));

        Ok(relayed.or(failed).and_then(|(log, status)| {
            log.transaction_hash.map(|transaction_hash| MessageReceipt {
                status,
                transaction_hash,
                block_number: log.block_number,
            })
        }))
    }

    // --- Withdrawal proof and finalization ---

    /// Prove a withdrawal against the first L2 output that covers it.
    pub async fn prove_message(&self, message: &CrossChainMessage) -> BridgeResult<PendingTx> {
        self.l1.require_signer()?;
        self.expect_status(message, MessageStatus::ReadyToProve).await?;
        let withdrawal = message
            .withdrawal
            .as_ref()
            .ok_or(BridgeError::MissingWithdrawal(message.hash))?;

        let oracle = self.contracts.l2_output_oracle;
        let message_block = U256::from(message.block_number);
        let output_index = self
            .l1
            .call("getL2OutputIndexAfter", |p| async move {
                IL2OutputOracle::new(oracle, p).getL2OutputIndexAfter(message_block).call().await
            })
            .await?;
        let output = self
            .l1
            .call("getL2Output", |p| async move {
                IL2OutputOracle::new(oracle, p).getL2Output(output_index).call().await
            })
            .await?;
        let l2_block = u64::try_from(output.l2BlockNumber).unwrap_or(u64::MAX);

        let block = self
            .l2
            .get_block(BlockNumberOrTag::Number(l2_block))
            .await?
            .ok_or(BridgeError::BlockNotFound(l2_block))?;
        let proof = self
            .l2
            .get_proof(L2_TO_L1_MESSAGE_PASSER, withdrawal_storage_slot(withdrawal.hash), l2_block)
            .await?;
        let storage_proof = proof
            .storage_proof
            .first()
            .map(|p| p.proof.clone())
            .ok_or(BridgeError::EmptyStorageProof(withdrawal.hash))?;

        let output_root_proof = OutputRootProof {
            version: B256::ZERO,
            stateRoot: block.header.state_root,
            messagePasserStorageRoot: proof.storage_hash,
            latestBlockhash: block.header.hash,
        };
        let computed = compute_output_root(&output_root_proof);
        if computed != output.outputRoot {
            return Err(BridgeError::OutputRootMismatch {
                index: output_index,
                expected: output.outputRoot,
                computed,
            });
        }

        self.l1.check_gas_price().await?;
        tracing::info!(
            withdrawal_hash = %withdrawal.hash,
            %output_index,
            l2_block,
            "Proving withdrawal"
        );
        self.portal()
            .proveWithdrawalTransaction(withdrawal.to_sol(), output_index, output_root_proof, storage_proof)
            .send()
            .await
            .map_err(contract_error("proveWithdrawalTransaction"))
    }

    /// Finalize a proven withdrawal once its challenge period is over.
    pub async fn finalize_message(&self, message: &CrossChainMessage) -> BridgeResult<PendingTx> {
        self.l1.require_signer()?;
        self.expect_status(message, MessageStatus::ReadyForRelay).await?;
        let withdrawal = message
            .withdrawal
            .as_ref()
            .ok_or(BridgeError::MissingWithdrawal(message.hash))?;

        self.l1.check_gas_price().await?;
        tracing::info!(withdrawal_hash = %withdrawal.hash, "Finalizing withdrawal");
        self.portal()
            .finalizeWithdrawalTransaction(withdrawal.to_sol())
            .send()
            .await
            .map_err(contract_error("finalizeWithdrawalTransaction"))
    }

    async fn expect_status(&self, message: &CrossChainMessage, expected: MessageStatus) -> BridgeResult<()> {
        let actual = self.get_message_status(message).await?;
        if actual != expected {
            return Err(BridgeError::UnexpectedStatus {
                hash: message.hash,
                expected,
                actual,
            });
        }
        Ok(())
    }

    // --- Contract handles ---

    fn source_messenger(&self, direction: MessageDirection) -> Address {
        match direction {
            MessageDirection::L1ToL2 => self.contracts.l1_cross_domain_messenger,
            MessageDirection::L2ToL1 => L2_CROSS_DOMAIN_MESSENGER,
        }
    }

    fn destination_messenger(&self, direction: MessageDirection) -> Address {
        match direction {
            MessageDirection::L1ToL2 => L2_CROSS_DOMAIN_MESSENGER,
            MessageDirection::L2ToL1 => self.contracts.l1_cross_domain_messenger,
        }
    }

    fn portal(&self) -> IOptimismPortal::IOptimismPortalInstance<alloy::providers::DynProvider> {
        IOptimismPortal::new(self.contracts.optimism_portal, self.l1.provider().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainEndpoint;

    fn offline_messenger() -> CrossChainMessenger {
        let endpoint = ChainEndpoint {
            rpc_url: "http://127.0.0.1:1".to_string(),
            rpc_timeout_secs: 1,
            ..Default::default()
        };
        let l1 = BlockchainClient::new(Layer::L1, endpoint.clone(), None).unwrap();
        let l2 = BlockchainClient::new(Layer::L2, endpoint, None).unwrap();
        let contracts = L1Contracts {
            l1_cross_domain_messenger: Address::repeat_byte(1),
            l1_standard_bridge: Address::repeat_byte(2),
            optimism_portal: Address::repeat_byte(3),
            l2_output_oracle: Address::repeat_byte(4),
        };
        CrossChainMessenger::new(l1, l2, contracts, MessengerConfig::default())
    }

    #[test]
    fn test_messenger_addresses() {
        let messenger = offline_messenger();
        assert_eq!(
            messenger.source_messenger(MessageDirection::L1ToL2),
            Address::repeat_byte(1)
        );
        assert_eq!(
            messenger.source_messenger(MessageDirection::L2ToL1),
            L2_CROSS_DOMAIN_MESSENGER
        );
        assert_eq!(
            messenger.destination_messenger(MessageDirection::L1ToL2),
            L2_CROSS_DOMAIN_MESSENGER
        );
        assert_eq!(messenger.client(Layer::L2).layer(), Layer::L2);
    }

    #[tokio::test]
    async fn test_transfers_need_signer() {
        let messenger = offline_messenger();
        let err = messenger.deposit_eth(U256::from(1), None).await.unwrap_err();
        assert!(matches!(err, BridgeError::Blockchain(_)));
        assert!(err.to_string().contains("no wallet"));
    }

    #[tokio::test]
    async fn test_eth_symbol_is_local() {
        let messenger = offline_messenger();
        assert_eq!(messenger.token_symbol(Layer::L1, Address::ZERO).await.unwrap(), "ETH");
        assert_eq!(messenger.token_symbol(Layer::L2, L2_ETH_TOKEN).await.unwrap(), "ETH");
    }
}
