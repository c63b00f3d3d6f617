//! Proving and finalizing withdrawals against mock L1/L2 chains.

mod common;

use std::sync::{Arc, Mutex};

use alloy::primitives::{Bytes, B256, U256};
use alloy::sol_types::{SolCall, SolValue};
use serde_json::{json, Value};

use common::{
    block_json, eth_call_target, messenger, returns, sample_message, send_flow, signing_messenger,
    start_rpc_mock, test_contracts, SentCalls, SENT_TX_HASH,
};
use op_bridge::blockchain::BlockchainError;
use op_bridge::bridge::contracts::{
    ICrossDomainMessenger, IL2OutputOracle, IOptimismPortal, OutputRootProof, L2_TO_L1_MESSAGE_PASSER,
};
use op_bridge::bridge::message::{compute_output_root, withdrawal_storage_slot};
use op_bridge::bridge::BridgeError;
use op_bridge::{CrossChainMessage, MessageDirection, MessageStatus};

const WITHDRAWAL_BLOCK: u64 = 500;
const OUTPUT_INDEX: u64 = 3;
const OUTPUT_L2_BLOCK: u64 = 600;
const FINALIZATION_PERIOD: u64 = 604_800;
const STATE_ROOT: B256 = B256::repeat_byte(0x51);
const STORAGE_ROOT: B256 = B256::repeat_byte(0x52);

/// Hash of the L2 block returned by `block_json`.
const L2_BLOCK_HASH: B256 = B256::repeat_byte(0xcc);

fn withdrawal_message() -> CrossChainMessage {
    sample_message(MessageDirection::L2ToL1, WITHDRAWAL_BLOCK)
}

fn expected_output_proof() -> OutputRootProof {
    OutputRootProof {
        version: B256::ZERO,
        stateRoot: STATE_ROOT,
        messagePasserStorageRoot: STORAGE_ROOT,
        latestBlockhash: L2_BLOCK_HASH,
    }
}

fn proof_nodes() -> Vec<Bytes> {
    vec![Bytes::from_static(&[0xde, 0xad]), Bytes::from_static(&[0xbe, 0xef])]
}

/// L1 state for one withdrawal plus everything a signer needs to send.
struct L1State {
    latest_output_block: u64,
    output_root: B256,
    proven_at: u128,
    now: u64,
}

impl L1State {
    fn ready_to_prove() -> Self {
        Self {
            latest_output_block: OUTPUT_L2_BLOCK,
            output_root: compute_output_root(&expected_output_proof()),
            proven_at: 0,
            now: 1_000,
        }
    }

    fn proven(now_offset: u64) -> Self {
        let proven_at = 1_700_000_000u64;
        Self {
            proven_at: proven_at as u128,
            now: proven_at + now_offset,
            ..Self::ready_to_prove()
        }
    }
}

async fn start_l1(state: L1State, sent: SentCalls) -> String {
    let contracts = test_contracts();
    start_rpc_mock(move |method, params| match method {
        "eth_call" => {
            let (to, selector) = eth_call_target(params);
            if to == contracts.l1_cross_domain_messenger {
                let answer = selector == ICrossDomainMessenger::successfulMessagesCall::SELECTOR
                    || selector == ICrossDomainMessenger::failedMessagesCall::SELECTOR;
                answer.then(|| returns(false.abi_encode()))
            } else if to == contracts.l2_output_oracle {
                if selector == IL2OutputOracle::latestBlockNumberCall::SELECTOR {
                    Some(returns(U256::from(state.latest_output_block).abi_encode()))
                } else if selector == IL2OutputOracle::getL2OutputIndexAfterCall::SELECTOR {
                    Some(returns(U256::from(OUTPUT_INDEX).abi_encode()))
                } else if selector == IL2OutputOracle::getL2OutputCall::SELECTOR {
                    let output = (state.output_root, 1_234u128, OUTPUT_L2_BLOCK as u128);
                    Some(returns(output.abi_encode_params()))
                } else if selector == IL2OutputOracle::FINALIZATION_PERIOD_SECONDSCall::SELECTOR {
                    Some(returns(U256::from(FINALIZATION_PERIOD).abi_encode()))
                } else {
                    None
                }
            } else if to == contracts.optimism_portal
                && selector == IOptimismPortal::provenWithdrawalsCall::SELECTOR
            {
                let proven = (B256::ZERO, state.proven_at, 0u128);
                Some(returns(proven.abi_encode_params()))
            } else {
                None
            }
        }
        "eth_getBlockByNumber" => Some(block_json(9_000, state.now, B256::ZERO)),
        other => send_flow(other, params, &sent),
    })
    .await
}

/// L2 serving the output block and a storage proof; records `eth_getProof` params.
async fn start_l2(storage_proof: Vec<Bytes>) -> (String, Arc<Mutex<Option<Value>>>) {
    let requested = Arc::new(Mutex::new(None));
    let record = requested.clone();
    let url = start_rpc_mock(move |method, params| match method {
        "eth_getBlockByNumber" => Some(block_json(OUTPUT_L2_BLOCK, 1_234, STATE_ROOT)),
        "eth_getProof" => {
            *record.lock().unwrap() = Some(params.clone());
            let slot = params[1][0].clone();
            let entries: Vec<Value> = if storage_proof.is_empty() {
                Vec::new()
            } else {
                vec![json!({ "key": slot, "value": "0x1", "proof": storage_proof })]
            };
            Some(json!({
                "address": L2_TO_L1_MESSAGE_PASSER,
                "balance": "0x0",
                "codeHash": B256::ZERO,
                "nonce": "0x0",
                "storageHash": STORAGE_ROOT,
                "accountProof": [],
                "storageProof": entries
            }))
        }
        _ => None,
    })
    .await;
    (url, requested)
}

#[tokio::test]
async fn test_prove_submits_output_and_storage_proof() {
    let sent = SentCalls::default();
    let l1 = start_l1(L1State::ready_to_prove(), sent.clone()).await;
    let (l2, requested) = start_l2(proof_nodes()).await;
    let message = withdrawal_message();
    let withdrawal = message.withdrawal.clone().unwrap();

    let pending = signing_messenger(&l1, &l2).prove_message(&message).await.unwrap();
    assert_eq!(*pending.tx_hash(), SENT_TX_HASH);

    // The proof is requested for the withdrawal's slot in the message passer.
    let params = requested.lock().unwrap().clone().unwrap();
    let account: alloy::primitives::Address = params[0].as_str().unwrap().parse().unwrap();
    assert_eq!(account, L2_TO_L1_MESSAGE_PASSER);
    let slot: U256 = params[1][0].as_str().unwrap().parse().unwrap();
    assert_eq!(slot, U256::from_be_bytes(withdrawal_storage_slot(withdrawal.hash).0));

    let calls = sent.all();
    let call = IOptimismPortal::proveWithdrawalTransactionCall::abi_decode(calls.last().unwrap()).unwrap();
    assert_eq!(call._l2OutputIndex, U256::from(OUTPUT_INDEX));
    assert_eq!(call._outputRootProof, expected_output_proof());
    assert_eq!(call._withdrawalProof, proof_nodes());
    assert_eq!(call._tx.nonce, withdrawal.nonce);
    assert_eq!(call._tx.sender, withdrawal.sender);
    assert_eq!(call._tx.target, withdrawal.target);
    assert_eq!(call._tx.gasLimit, withdrawal.gas_limit);
    assert_eq!(call._tx.data, withdrawal.data);
}

#[tokio::test]
async fn test_prove_rejects_mismatched_output_root() {
    let sent = SentCalls::default();
    let state = L1State {
        output_root: B256::repeat_byte(0xee),
        ..L1State::ready_to_prove()
    };
    let l1 = start_l1(state, sent.clone()).await;
    let (l2, _) = start_l2(proof_nodes()).await;

    let err = signing_messenger(&l1, &l2)
        .prove_message(&withdrawal_message())
        .await
        .unwrap_err();
    match err {
        BridgeError::OutputRootMismatch { index, expected, computed } => {
            assert_eq!(index, U256::from(OUTPUT_INDEX));
            assert_eq!(expected, B256::repeat_byte(0xee));
            assert_eq!(computed, compute_output_root(&expected_output_proof()));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(sent.all().is_empty());
}

#[tokio::test]
async fn test_prove_rejects_empty_storage_proof() {
    let sent = SentCalls::default();
    let l1 = start_l1(L1State::ready_to_prove(), sent.clone()).await;
    let (l2, _) = start_l2(Vec::new()).await;
    let message = withdrawal_message();
    let withdrawal_hash = message.withdrawal.as_ref().unwrap().hash;

    let err = signing_messenger(&l1, &l2).prove_message(&message).await.unwrap_err();
    assert!(matches!(err, BridgeError::EmptyStorageProof(hash) if hash == withdrawal_hash));
    assert!(sent.all().is_empty());
}

#[tokio::test]
async fn test_prove_requires_ready_to_prove() {
    let sent = SentCalls::default();
    let state = L1State {
        latest_output_block: WITHDRAWAL_BLOCK - 1,
        ..L1State::ready_to_prove()
    };
    let l1 = start_l1(state, sent.clone()).await;
    let (l2, requested) = start_l2(proof_nodes()).await;

    let err = signing_messenger(&l1, &l2)
        .prove_message(&withdrawal_message())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BridgeError::UnexpectedStatus {
            expected: MessageStatus::ReadyToProve,
            actual: MessageStatus::StateRootNotPublished,
            ..
        }
    ));
    assert!(requested.lock().unwrap().is_none());
    assert!(sent.all().is_empty());
}

#[tokio::test]
async fn test_finalize_after_challenge_period() {
    let sent = SentCalls::default();
    let l1 = start_l1(L1State::proven(FINALIZATION_PERIOD + 1), sent.clone()).await;
    let (l2, _) = start_l2(proof_nodes()).await;
    let message = withdrawal_message();
    let withdrawal = message.withdrawal.clone().unwrap();

    let pending = signing_messenger(&l1, &l2).finalize_message(&message).await.unwrap();
    assert_eq!(*pending.tx_hash(), SENT_TX_HASH);

    let calls = sent.all();
    let call =
        IOptimismPortal::finalizeWithdrawalTransactionCall::abi_decode(calls.last().unwrap()).unwrap();
    assert_eq!(call._tx.nonce, withdrawal.nonce);
    assert_eq!(call._tx.value, withdrawal.value);
    assert_eq!(call._tx.data, withdrawal.data);
}

#[tokio::test]
async fn test_finalize_during_challenge_period() {
    let sent = SentCalls::default();
    let l1 = start_l1(L1State::proven(60), sent.clone()).await;
    let (l2, _) = start_l2(proof_nodes()).await;

    let err = signing_messenger(&l1, &l2)
        .finalize_message(&withdrawal_message())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BridgeError::UnexpectedStatus {
            expected: MessageStatus::ReadyForRelay,
            actual: MessageStatus::InChallengePeriod,
            ..
        }
    ));
    assert!(sent.all().is_empty());
}

#[tokio::test]
async fn test_finalize_needs_a_wallet() {
    let l1 = start_l1(L1State::proven(FINALIZATION_PERIOD + 1), SentCalls::default()).await;
    let (l2, _) = start_l2(proof_nodes()).await;

    let err = messenger(&l1, &l2)
        .finalize_message(&withdrawal_message())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Blockchain(BlockchainError::NotAvailable(_))));
}
