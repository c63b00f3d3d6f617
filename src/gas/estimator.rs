//! Gas estimation for L2 transactions.

use alloy::consensus::{SignableTransaction, TxEip1559};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;

use crate::blockchain::BlockchainClient;
use crate::bridge::contracts::{IGasPriceOracle, IGreeter, GAS_PRICE_ORACLE};
use crate::config::{Network, NetworkPreset};
use crate::gas::{GasError, GasEstimate, GasResult};

/// Greeting used by the demo transaction.
pub const DEMO_GREETING: &str = "Hello!";

/// `Greeter.setGreeting("Hello!")` on the network's demo contract.
pub fn default_transaction(network: Network, preset: Option<&NetworkPreset>) -> GasResult<TransactionRequest> {
    let greeter = preset
        .and_then(|p| p.greeter)
        .ok_or(GasError::NoDefaultTarget(network))?;
    let data = IGreeter::setGreetingCall {
        _greeting: DEMO_GREETING.to_string(),
    }
    .abi_encode();
    Ok(TransactionRequest::default()
        .with_to(greeter)
        .with_input(Bytes::from(data)))
}

/// Estimate what `tx` would cost on L2, signed by the client's wallet.
pub async fn estimate(client: &BlockchainClient, tx: &TransactionRequest) -> GasResult<GasEstimate> {
    let from = client.require_signer()?;
    let to = match tx.to {
        Some(TxKind::Call(to)) => to,
        _ => return Err(GasError::MissingTarget),
    };
    let tx = tx.clone().with_from(from);

    let l2_gas = client.estimate_gas(&tx).await?;
    let gas_price = client.get_gas_price().await?;
    let l2_cost = U256::from(l2_gas) * U256::from(gas_price);

    let unsigned = unsigned_encoding(client, &tx, from, to, l2_gas).await?;
    let l1_cost = client
        .call("getL1Fee", |p| {
            let unsigned = unsigned.clone();
            async move { IGasPriceOracle::new(GAS_PRICE_ORACLE, p).getL1Fee(unsigned).call().await }
        })
        .await?;
    let l1_gas = client
        .call("getL1GasUsed", |p| {
            let unsigned = unsigned.clone();
            async move { IGasPriceOracle::new(GAS_PRICE_ORACLE, p).getL1GasUsed(unsigned).call().await }
        })
        .await?;

    let estimate = GasEstimate {
        l1_gas,
        l2_gas,
        l1_cost,
        l2_cost,
        total_cost: l1_cost + l2_cost,
    };
    tracing::debug!(?estimate, "Gas estimated");
    Ok(estimate)
}

/// Serialized unsigned EIP-1559 form of `tx`, as the oracle prices it.
async fn unsigned_encoding(
    client: &BlockchainClient,
    tx: &TransactionRequest,
    from: Address,
    to: Address,
    gas_limit: u64,
) -> GasResult<Bytes> {
    let chain_id = client.get_chain_id().await?.0;
    let nonce = client.get_transaction_count(from).await?;
    let fees = client.estimate_eip1559_fees().await?;

    let unsigned = TxEip1559 {
        chain_id,
        nonce,
        gas_limit,
        max_fee_per_gas: fees.max_fee_per_gas,
        max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
        to: TxKind::Call(to),
        value: tx.value.unwrap_or_default(),
        access_list: Default::default(),
        input: tx.input.input().cloned().unwrap_or_default(),
    };
    Ok(unsigned.encoded_for_signing().into())
}
