//! Shared utilities for integration tests: an in-process JSON-RPC mock.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Bytes, LogData, B256, U256};
use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use op_bridge::blockchain::{BlockchainClient, Layer};
use op_bridge::config::{ChainEndpoint, L1Contracts, MessengerConfig};
use op_bridge::bridge::contracts::L2_CROSS_DOMAIN_MESSENGER;
use op_bridge::bridge::message::{
    encode_versioned_nonce, hash_cross_domain_message, hash_withdrawal, relay_message_calldata,
};
use op_bridge::bridge::LowLevelWithdrawal;
use op_bridge::{CrossChainMessage, CrossChainMessenger, MessageDirection, Wallet};

/// Anvil's first development key.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Hash the mocks return for `eth_sendRawTransaction`.
pub const SENT_TX_HASH: B256 = B256::repeat_byte(0x5e);

/// Answers one JSON-RPC call; `None` becomes a "method not found" error.
pub type RpcHandler = Arc<dyn Fn(&str, &Value) -> Option<Value> + Send + Sync>;

/// Start a mock JSON-RPC endpoint on a random local port and return its URL.
pub async fn start_rpc_mock<F>(handler: F) -> String
where
    F: Fn(&str, &Value) -> Option<Value> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler: RpcHandler = Arc::new(handler);

    let app = Router::new().route(
        "/",
        post(move |Json(request): Json<Value>| {
            let handler = handler.clone();
            async move { Json(respond(&handler, request)) }
        }),
    );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}

fn respond(handler: &RpcHandler, request: Value) -> Value {
    match request {
        Value::Array(batch) => Value::Array(batch.into_iter().map(|r| respond_one(handler, r)).collect()),
        single => respond_one(handler, single),
    }
}

fn respond_one(handler: &RpcHandler, request: Value) -> Value {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    match handler(&method, &request["params"]) {
        Some(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        None => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": format!("{} not mocked", method) }
        }),
    }
}

/// Endpoint that accepts connections and never answers.
pub async fn start_hanging_rpc() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{}", addr)
}

/// Calldata of every transaction a signing client estimated before sending.
#[derive(Clone, Default)]
pub struct SentCalls(Arc<Mutex<Vec<Bytes>>>);

impl SentCalls {
    pub fn all(&self) -> Vec<Bytes> {
        self.0.lock().unwrap().clone()
    }
}

/// Answers the requests a signing provider makes to fill and send a
/// transaction, recording its calldata.
pub fn send_flow(method: &str, params: &Value, sent: &SentCalls) -> Option<Value> {
    match method {
        "eth_chainId" => Some(quantity(1337)),
        "eth_gasPrice" => Some(json!("0x3b9aca00")),
        "eth_getTransactionCount" => Some(quantity(0)),
        "eth_maxPriorityFeePerGas" => Some(json!("0x3b9aca00")),
        "eth_feeHistory" => Some(json!({
            "oldestBlock": "0x1",
            "baseFeePerGas": ["0x7", "0x7"],
            "gasUsedRatio": [0.5],
            "reward": [["0x3b9aca00"]]
        })),
        "eth_estimateGas" => {
            let call = &params[0];
            let input = call["input"].as_str().or_else(|| call["data"].as_str()).unwrap_or("0x");
            sent.0.lock().unwrap().push(alloy::hex::decode(input).unwrap().into());
            Some(quantity(250_000))
        }
        "eth_sendRawTransaction" => Some(json!(SENT_TX_HASH)),
        _ => None,
    }
}

/// Whether a filter topic (single value or OR-list) matches `expected`.
pub fn topic_matches(topic: &Value, expected: B256) -> bool {
    let matches = |v: &Value| v.as_str().and_then(|s| s.parse::<B256>().ok()) == Some(expected);
    match topic {
        Value::Array(options) => options.iter().any(matches),
        single => matches(single),
    }
}

/// Target and selector of an `eth_call`.
pub fn eth_call_target(params: &Value) -> (Address, [u8; 4]) {
    let call = &params[0];
    let to: Address = call["to"].as_str().unwrap().parse().unwrap();
    let input = call["input"]
        .as_str()
        .or_else(|| call["data"].as_str())
        .unwrap_or("0x");
    let bytes = alloy::hex::decode(input).unwrap();
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&bytes[..4]);
    (to, selector)
}

/// ABI-encoded return data as a JSON hex string.
pub fn returns(encoded: Vec<u8>) -> Value {
    json!(alloy::hex::encode_prefixed(encoded))
}

/// Quantity as a JSON hex string.
pub fn quantity(value: u64) -> Value {
    json!(format!("{:#x}", value))
}

/// RPC log object.
pub fn log_json(address: Address, data: &LogData, log_index: u64, block_number: u64, tx_hash: B256) -> Value {
    json!({
        "address": address,
        "topics": data.topics(),
        "data": data.data,
        "blockHash": B256::repeat_byte(0xbb),
        "blockNumber": quantity(block_number),
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "logIndex": quantity(log_index),
        "removed": false
    })
}

/// Successful EIP-1559 receipt carrying `logs`.
pub fn receipt_json(tx_hash: B256, block_number: u64, logs: Vec<Value>) -> Value {
    json!({
        "type": "0x2",
        "status": "0x1",
        "cumulativeGasUsed": "0x5208",
        "logs": logs,
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0xbb),
        "blockNumber": quantity(block_number),
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "from": Address::repeat_byte(0x11),
        "to": Address::repeat_byte(0x22),
        "contractAddress": null
    })
}

/// Block header with the given number, timestamp and state root.
pub fn block_json(number: u64, timestamp: u64, state_root: B256) -> Value {
    json!({
        "hash": B256::repeat_byte(0xcc),
        "parentHash": B256::ZERO,
        "sha3Uncles": B256::ZERO,
        "miner": Address::ZERO,
        "stateRoot": state_root,
        "transactionsRoot": B256::ZERO,
        "receiptsRoot": B256::ZERO,
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "difficulty": "0x0",
        "number": quantity(number),
        "gasLimit": "0x1c9c380",
        "gasUsed": "0x0",
        "timestamp": quantity(timestamp),
        "extraData": "0x",
        "mixHash": B256::ZERO,
        "nonce": "0x0000000000000000",
        "baseFeePerGas": "0x7",
        "uncles": [],
        "transactions": []
    })
}

/// Message sent at `block_number`; withdrawals carry a matching low-level withdrawal.
pub fn sample_message(direction: MessageDirection, block_number: u64) -> CrossChainMessage {
    let mut message = CrossChainMessage {
        direction,
        transaction_hash: B256::repeat_byte(0x77),
        block_number,
        log_index: 0,
        sender: Address::repeat_byte(0x11),
        target: Address::repeat_byte(0x22),
        value: U256::from(1_000u64),
        min_gas_limit: U256::ZERO,
        message_nonce: encode_versioned_nonce(U256::from(4), 1),
        message: Bytes::from_static(b"payload"),
        hash: B256::ZERO,
        withdrawal: None,
    };
    message.hash = hash_cross_domain_message(&message).unwrap();
    if direction == MessageDirection::L2ToL1 {
        let mut withdrawal = LowLevelWithdrawal {
            nonce: encode_versioned_nonce(U256::from(12), 1),
            sender: L2_CROSS_DOMAIN_MESSENGER,
            target: test_contracts().l1_cross_domain_messenger,
            value: message.value,
            gas_limit: U256::from(300_000u64),
            data: relay_message_calldata(&message).unwrap(),
            hash: B256::ZERO,
        };
        withdrawal.hash = hash_withdrawal(&withdrawal);
        message.withdrawal = Some(withdrawal);
    }
    message
}

/// Fixed L1 contract addresses used by the mocks.
pub fn test_contracts() -> L1Contracts {
    L1Contracts {
        l1_cross_domain_messenger: Address::repeat_byte(0xa1),
        l1_standard_bridge: Address::repeat_byte(0xa2),
        optimism_portal: Address::repeat_byte(0xa3),
        l2_output_oracle: Address::repeat_byte(0xa4),
    }
}

pub fn endpoint(url: &str) -> ChainEndpoint {
    ChainEndpoint {
        rpc_url: url.to_string(),
        rpc_timeout_secs: 5,
        ..Default::default()
    }
}

/// Read-only messenger over two mock endpoints with a fast poll interval.
pub fn messenger(l1_url: &str, l2_url: &str) -> CrossChainMessenger {
    messenger_with(
        l1_url,
        l2_url,
        MessengerConfig {
            poll_interval_ms: 10,
            wait_timeout_secs: Some(5),
            ..Default::default()
        },
    )
}

pub fn messenger_with(l1_url: &str, l2_url: &str, config: MessengerConfig) -> CrossChainMessenger {
    messenger_from(endpoint(l1_url), endpoint(l2_url), None, config)
}

/// Messenger whose clients sign with [`TEST_PRIVATE_KEY`].
pub fn signing_messenger(l1_url: &str, l2_url: &str) -> CrossChainMessenger {
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
    messenger_from(
        endpoint(l1_url),
        endpoint(l2_url),
        Some(&wallet),
        MessengerConfig {
            poll_interval_ms: 10,
            wait_timeout_secs: Some(5),
            ..Default::default()
        },
    )
}

pub fn messenger_from(
    l1: ChainEndpoint,
    l2: ChainEndpoint,
    wallet: Option<&Wallet>,
    config: MessengerConfig,
) -> CrossChainMessenger {
    let l1 = BlockchainClient::new(Layer::L1, l1, wallet).unwrap();
    let l2 = BlockchainClient::new(Layer::L2, l2, wallet).unwrap();
    CrossChainMessenger::new(l1, l2, test_contracts(), config)
}
