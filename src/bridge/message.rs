//! Cross-domain message hashing and extraction from receipts.
//!
//! # Responsibilities
//! - Split the message version out of a versioned nonce
//! - Derive the hash the destination messenger records on relay
//! - Derive the withdrawal hash and its storage slot in the message passer
//! - Decode the messages a transaction sent from its logs

use alloy::primitives::{keccak256, Address, Bytes, TxHash, B256, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::{SolCall, SolValue};

use crate::bridge::contracts::{
    relay_v0, relay_v1, ICrossDomainMessenger::SentMessage, ICrossDomainMessenger::SentMessageExtension1,
    IL2ToL1MessagePasser::MessagePassed, OutputRootProof, L2_TO_L1_MESSAGE_PASSER,
};
use crate::bridge::types::{BridgeError, BridgeResult, CrossChainMessage, LowLevelWithdrawal, MessageDirection};

/// Bit offset of the version inside a versioned nonce.
const VERSION_SHIFT: usize = 240;

/// Version encoded in the top two bytes of a message nonce.
pub fn message_version(nonce: U256) -> u16 {
    (nonce >> VERSION_SHIFT).saturating_to::<u16>()
}

/// Attach a version to a raw nonce.
pub fn encode_versioned_nonce(nonce: U256, version: u16) -> U256 {
    (U256::from(version) << VERSION_SHIFT) | nonce
}

/// Calldata of the `relayMessage` call that delivers `message`.
pub fn relay_message_calldata(message: &CrossChainMessage) -> BridgeResult<Bytes> {
    let encoded = match message_version(message.message_nonce) {
        0 => relay_v0::relayMessageCall {
            _target: message.target,
            _sender: message.sender,
            _message: message.message.clone(),
            _messageNonce: message.message_nonce,
        }
        .abi_encode(),
        1 => relay_v1::relayMessageCall {
            _nonce: message.message_nonce,
            _sender: message.sender,
            _target: message.target,
            _value: message.value,
            _minGasLimit: message.min_gas_limit,
            _message: message.message.clone(),
        }
        .abi_encode(),
        version => return Err(BridgeError::UnsupportedVersion(version)),
    };
    Ok(encoded.into())
}

/// Hash recorded in `successfulMessages` / `failedMessages`.
pub fn hash_cross_domain_message(message: &CrossChainMessage) -> BridgeResult<B256> {
    Ok(keccak256(relay_message_calldata(message)?))
}

/// `keccak256(abi.encode(nonce, sender, target, value, gasLimit, data))`.
pub fn hash_withdrawal(withdrawal: &LowLevelWithdrawal) -> B256 {
    let encoded = (
        withdrawal.nonce,
        withdrawal.sender,
        withdrawal.target,
        withdrawal.value,
        withdrawal.gas_limit,
        withdrawal.data.clone(),
    )
        .abi_encode_params();
    keccak256(encoded)
}

/// Slot of `sentMessages[withdrawalHash]` in the message passer.
pub fn withdrawal_storage_slot(withdrawal_hash: B256) -> B256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(withdrawal_hash.as_slice());
    keccak256(preimage)
}

/// Output root committed by the oracle for a proof's fields.
pub fn compute_output_root(proof: &OutputRootProof) -> B256 {
    let mut preimage = Vec::with_capacity(128);
    preimage.extend_from_slice(proof.version.as_slice());
    preimage.extend_from_slice(proof.stateRoot.as_slice());
    preimage.extend_from_slice(proof.messagePasserStorageRoot.as_slice());
    preimage.extend_from_slice(proof.latestBlockhash.as_slice());
    keccak256(preimage)
}

/// Decode every message `messenger` sent in a transaction.
///
/// The value comes from the `SentMessageExtension1` log that directly follows
/// each `SentMessage`. Withdrawals are paired with the `MessagePassed` log
/// whose data is the message's relay calldata.
pub fn extract_messages(
    direction: MessageDirection,
    transaction_hash: TxHash,
    block_number: u64,
    logs: &[Log],
    messenger: Address,
) -> BridgeResult<Vec<CrossChainMessage>> {
    let mut messages = Vec::new();

    for (i, log) in logs.iter().enumerate() {
        if log.address() != messenger {
            continue;
        }
        let Ok(sent) = log.log_decode::<SentMessage>() else {
            continue;
        };
        let sent = sent.inner.data;

        let value = logs
            .get(i + 1)
            .filter(|next| next.address() == messenger)
            .and_then(|next| next.log_decode::<SentMessageExtension1>().ok())
            .map(|ext| ext.inner.data.value)
            .unwrap_or_default();

        let mut message = CrossChainMessage {
            direction,
            transaction_hash,
            block_number,
            log_index: log.log_index.unwrap_or(i as u64),
            sender: sent.sender,
            target: sent.target,
            value,
            min_gas_limit: sent.gasLimit,
            message_nonce: sent.messageNonce,
            message: sent.message,
            hash: B256::ZERO,
            withdrawal: None,
        };
        message.hash = hash_cross_domain_message(&message)?;

        if direction == MessageDirection::L2ToL1 {
            message.withdrawal = Some(find_withdrawal(logs, &message)?);
        }

        tracing::debug!(
            %transaction_hash,
            message_hash = %message.hash,
            nonce = %message.message_nonce,
            "Decoded cross-domain message"
        );
        messages.push(message);
    }

    Ok(messages)
}

fn find_withdrawal(logs: &[Log], message: &CrossChainMessage) -> BridgeResult<LowLevelWithdrawal> {
    let calldata = relay_message_calldata(message)?;

    let passed = logs
        .iter()
        .filter(|log| log.address() == L2_TO_L1_MESSAGE_PASSER)
        .filter_map(|log| log.log_decode::<MessagePassed>().ok())
        .map(|log| log.inner.data)
        .find(|passed| passed.data == calldata)
        .ok_or(BridgeError::MissingWithdrawal(message.hash))?;

    let withdrawal = LowLevelWithdrawal {
        nonce: passed.nonce,
        sender: passed.sender,
        target: passed.target,
        value: passed.value,
        gas_limit: passed.gasLimit,
        data: passed.data,
        hash: passed.withdrawalHash,
    };

    let computed = hash_withdrawal(&withdrawal);
    if computed != withdrawal.hash {
        return Err(BridgeError::WithdrawalHashMismatch {
            event: withdrawal.hash,
            computed,
        });
    }
    Ok(withdrawal)
}
