//! Blockchain RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoints of one layer (primary + failovers)
//! - Query chain state (block number, balances, receipts, logs, proofs)
//! - Bound every call with the configured timeout
//! - Attach the wallet so contract calls can be signed and sent

use std::future::Future;
use std::time::Duration;

use alloy::eips::{BlockId, BlockNumberOrTag};
use alloy::primitives::{Address, TxHash, B256, U256};
use alloy::providers::utils::Eip1559Estimation;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::json_rpc::{RpcRecv, RpcSend};
use alloy::rpc::types::{
    Block, EIP1186AccountProofResponse, Filter, Log, TransactionReceipt, TransactionRequest,
};
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainEndpoint, ChainId, Layer};
use crate::blockchain::wallet::Wallet;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Which side of the bridge this client talks to.
    layer: Layer,
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Configuration.
    config: ChainEndpoint,
    /// Request timeout duration.
    timeout_duration: Duration,
    /// Address of the attached signer, if any.
    signer: Option<Address>,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// No request is made here; an unreachable endpoint only shows up on the
    /// first call. Invalid failover URLs are skipped with a warning.
    pub fn new(layer: Layer, config: ChainEndpoint, wallet: Option<&Wallet>) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid {} RPC URL '{}': {}", layer, config.rpc_url, e))
        })?;
        providers.push(connect(primary_url, wallet));

        // 2. Add failover providers
        for url_str in &config.failover_urls {
            match url_str.parse() {
                Ok(url) => providers.push(connect(url, wallet)),
                Err(_) => tracing::warn!(%layer, url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        tracing::debug!(
            %layer,
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            signer = ?wallet.map(Wallet::address),
            "Blockchain client created"
        );

        Ok(Self {
            layer,
            providers,
            timeout_duration,
            signer: wallet.map(Wallet::address),
            config,
        })
    }

    /// Run one request against each provider in turn until one answers.
    ///
    /// Fails with `Timeout` when every provider timed out, otherwise with the
    /// last provider's error.
    async fn with_failover<T, E, F, Fut>(&self, op: &'static str, f: F) -> BlockchainResult<T>
    where
        E: std::fmt::Display,
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut last_error = None;
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, f(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(layer = %self.layer, provider_idx = i, op, error = %e, "RPC error, trying next provider");
                    last_error = Some(e.to_string());
                }
                Err(_) => {
                    tracing::warn!(layer = %self.layer, provider_idx = i, op, "RPC timeout, trying next provider");
                }
            }
        }
        match last_error {
            Some(e) => Err(BlockchainError::Rpc(format!(
                "All {} RPC providers failed: {}: {}",
                self.layer, op, e
            ))),
            None => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    /// Read-only contract call, bounded and failed over like any other request.
    ///
    /// `f` builds the contract instance on the provider it is handed.
    pub async fn call<T, F, Fut>(&self, op: &'static str, f: F) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = Result<T, alloy::contract::Error>>,
    {
        self.with_failover(op, f).await
    }

    /// Verify the connected chain ID matches configuration.
    ///
    /// A configured chain id of zero accepts whatever the endpoint reports.
    pub async fn verify_chain_id(&self) -> BlockchainResult<ChainId> {
        let chain_id = self.get_chain_id().await?;
        if self.config.chain_id != 0 && chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                layer: self.layer,
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        tracing::debug!(layer = %self.layer, chain_id = chain_id.0, "Chain ID verified");
        Ok(chain_id)
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.with_failover("eth_chainId", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.with_failover("eth_blockNumber", |p| async move { p.get_block_number().await })
            .await
    }

    /// Get the balance of an address.
    pub async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.with_failover("eth_getBalance", |p| async move { p.get_balance(address).await })
            .await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.with_failover("eth_getTransactionReceipt", |p| async move {
            p.get_transaction_receipt(tx_hash).await
        })
        .await
    }

    /// Get logs matching a filter.
    pub async fn get_logs(&self, filter: &Filter) -> BlockchainResult<Vec<Log>> {
        self.with_failover("eth_getLogs", |p| {
            let filter = filter.clone();
            async move { p.get_logs(&filter).await }
        })
        .await
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.with_failover("eth_gasPrice", |p| async move { p.get_gas_price().await })
            .await
    }

    /// Get a block (header and transaction hashes) by number.
    pub async fn get_block(&self, number: BlockNumberOrTag) -> BlockchainResult<Option<Block>> {
        self.with_failover("eth_getBlockByNumber", |p| async move {
            p.get_block_by_number(number).await
        })
        .await
    }

    /// Timestamp of the latest block.
    pub async fn latest_block_timestamp(&self) -> BlockchainResult<u64> {
        let block = self
            .get_block(BlockNumberOrTag::Latest)
            .await?
            .ok_or_else(|| BlockchainError::Rpc(format!("{} returned no latest block", self.layer)))?;
        Ok(block.header.timestamp)
    }

    /// Account and storage proof for one slot at a block.
    pub async fn get_proof(
        &self,
        address: Address,
        slot: B256,
        block_number: u64,
    ) -> BlockchainResult<EIP1186AccountProofResponse> {
        self.with_failover("eth_getProof", |p| async move {
            p.get_proof(address, vec![slot])
                .block_id(BlockId::number(block_number))
                .await
        })
        .await
    }

    /// Account nonce at the latest block.
    pub async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.with_failover("eth_getTransactionCount", |p| async move {
            p.get_transaction_count(address).await
        })
        .await
    }

    /// Gas a transaction would use if sent now.
    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> BlockchainResult<u64> {
        self.with_failover("eth_estimateGas", |p| {
            let tx = tx.clone();
            async move { p.estimate_gas(tx).await }
        })
        .await
    }

    /// Suggested EIP-1559 fee caps.
    pub async fn estimate_eip1559_fees(&self) -> BlockchainResult<Eip1559Estimation> {
        self.with_failover("eth_feeHistory", |p| async move { p.estimate_eip1559_fees().await })
            .await
    }

    /// Untyped request, for methods and fields alloy does not model.
    pub async fn raw_request<P, R>(&self, method: &'static str, params: P) -> BlockchainResult<R>
    where
        P: RpcSend + Clone,
        R: RpcRecv,
    {
        self.with_failover(method, |p| {
            let params = params.clone();
            async move { p.raw_request(method.into(), params).await }
        })
        .await
    }

    /// Primary provider, used to sign and send transactions.
    pub fn provider(&self) -> &DynProvider {
        &self.providers[0]
    }

    /// Which layer this client talks to.
    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainEndpoint {
        &self.config
    }

    /// Address of the attached signer, if any.
    pub fn signer(&self) -> Option<Address> {
        self.signer
    }

    /// Address of the attached signer, or an error for read-only clients.
    pub fn require_signer(&self) -> BlockchainResult<Address> {
        self.signer.ok_or_else(|| {
            BlockchainError::NotAvailable(format!(
                "{} client has no wallet; set MNEMONIC or PRIVATE_KEY",
                self.layer
            ))
        })
    }
}

fn connect(url: url::Url, wallet: Option<&Wallet>) -> DynProvider {
    match wallet {
        Some(wallet) => ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url)
            .erased(),
        None => ProviderBuilder::new().connect_http(url).erased(),
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("layer", &self.layer)
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .field("signer", &self.signer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ChainEndpoint {
        ChainEndpoint {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337, // Anvil default
            rpc_timeout_secs: 5,
            confirmation_blocks: 1,
            max_gas_price_gwei: 100,
        }
    }

    #[test]
    fn test_client_creation() {
        // Creation never touches the network.
        let result = BlockchainClient::new(Layer::L1, test_config(), None);
        assert!(result.is_ok());
        let client = result.unwrap();
        assert_eq!(client.layer(), Layer::L1);
        assert!(client.signer().is_none());
        assert!(client.require_signer().is_err());
    }

    #[test]
    fn test_invalid_primary_url() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        let err = BlockchainClient::new(Layer::L2, config, None).unwrap_err();
        assert!(err.to_string().contains("Invalid L2 RPC URL"));
    }

    #[test]
    fn test_client_with_wallet() {
        let wallet = Wallet::from_private_key(
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        let client = BlockchainClient::new(Layer::L2, test_config(), Some(&wallet)).unwrap();
        assert_eq!(client.require_signer().unwrap(), wallet.address());
    }

    #[tokio::test]
    async fn test_rpc_failover() {
        let mut config = test_config();
        config.rpc_url = "http://127.0.0.1:1".to_string();
        config.failover_urls.push("http://invalid:8545".to_string());

        let client = BlockchainClient::new(Layer::L1, config, None).unwrap();

        // Both endpoints are unreachable, so every provider is tried and the
        // aggregated error comes back.
        let result = client.get_chain_id().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("All L1 RPC providers failed"));
    }
}
