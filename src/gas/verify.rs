//! Send a transaction and measure what it really cost.

use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{TxHash, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use serde::Deserialize;

use crate::blockchain::BlockchainClient;
use crate::gas::{GasError, GasResult, GasUsage};

/// Delay between balance reads while waiting for the node to catch up.
const BALANCE_POLL: Duration = Duration::from_millis(100);

/// Balance reads before giving up.
const BALANCE_POLL_ATTEMPTS: u32 = 100;

/// OP Stack receipt fields absent from the Ethereum receipt type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct L1FeeFields {
    l1_fee: Option<U256>,
    l1_gas_used: Option<U256>,
}

/// Send `tx` from the client's wallet and report the costs it incurred.
pub async fn verify(client: &BlockchainClient, tx: &TransactionRequest) -> GasResult<GasUsage> {
    let from = client.require_signer()?;
    let balance_before = client.get_balance(from).await?;

    let pending = client
        .provider()
        .send_transaction(tx.clone().with_from(from))
        .await
        .map_err(|e| GasError::Send(e.to_string()))?;
    let tx_hash = *pending.tx_hash();
    tracing::info!(%tx_hash, "Transaction submitted");

    let receipt = client.confirm(pending, "gas verification").await?;

    let fields: Option<L1FeeFields> = client
        .raw_request("eth_getTransactionReceipt", (tx_hash,))
        .await?;
    let (l1_cost, l1_gas) = match fields {
        Some(L1FeeFields {
            l1_fee: Some(fee),
            l1_gas_used: Some(gas),
        }) => (fee, gas),
        _ => return Err(GasError::MissingL1Fee(tx_hash)),
    };

    let total_cost = wait_for_balance_change(client, tx_hash, balance_before).await?;

    let usage = GasUsage {
        tx_hash,
        l1_gas,
        l2_gas: receipt.gas_used,
        l1_cost,
        l2_cost: total_cost.saturating_sub(l1_cost),
        total_cost,
    };
    tracing::debug!(?usage, "Gas measured");
    Ok(usage)
}

/// The node may report the old balance briefly after the receipt appears.
async fn wait_for_balance_change(
    client: &BlockchainClient,
    tx_hash: TxHash,
    before: U256,
) -> GasResult<U256> {
    let from = client.require_signer()?;
    for _ in 0..BALANCE_POLL_ATTEMPTS {
        let after = client.get_balance(from).await?;
        if after != before {
            return Ok(before.saturating_sub(after));
        }
        tokio::time::sleep(BALANCE_POLL).await;
    }
    Err(GasError::BalanceUnchanged(tx_hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_l1_fee_fields() {
        let json = r#"{
            "transactionHash": "0x01",
            "gasUsed": "0x5208",
            "l1Fee": "0x2386f26fc10000",
            "l1GasUsed": "0x640"
        }"#;
        let fields: L1FeeFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.l1_fee, Some(U256::from(10_000_000_000_000_000u64)));
        assert_eq!(fields.l1_gas_used, Some(U256::from(1600u64)));
    }

    #[test]
    fn test_parse_plain_receipt() {
        let fields: L1FeeFields = serde_json::from_str(r#"{"gasUsed": "0x5208"}"#).unwrap();
        assert!(fields.l1_fee.is_none());
    }
}
