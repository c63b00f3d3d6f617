//! Message status and its resolution rules.
//!
//! The RPC lookups live in the messenger; the decisions are kept here as plain
//! functions so they can be tested without a chain.

use serde::{Deserialize, Serialize};

use crate::bridge::types::MessageDirection;

/// Progress of a cross-domain message, in lifecycle order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum MessageStatus {
    /// Deposit not yet relayed on L2.
    UnconfirmedL1ToL2Message,
    /// Deposit relay was attempted on L2 and reverted.
    FailedL1ToL2Message,
    /// No L2 output covering the withdrawal block has been posted to L1.
    StateRootNotPublished,
    ReadyToProve,
    /// Proven, waiting out the finalization period.
    InChallengePeriod,
    ReadyForRelay,
    Relayed,
}

impl MessageStatus {
    /// Whether polling for `target` can stop at `self`.
    ///
    /// Deposits can fail and be retried, so only an exact match counts, except
    /// that any status beyond "unconfirmed" satisfies a wait for it.
    /// Withdrawals only move forward, so anything at or past the target counts.
    pub fn has_reached(self, target: MessageStatus, direction: MessageDirection) -> bool {
        match direction {
            MessageDirection::L1ToL2 => {
                self == target
                    || (target == MessageStatus::UnconfirmedL1ToL2Message && self > target)
            }
            MessageDirection::L2ToL1 => self >= target,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::UnconfirmedL1ToL2Message => "UNCONFIRMED_L1_TO_L2_MESSAGE",
            MessageStatus::FailedL1ToL2Message => "FAILED_L1_TO_L2_MESSAGE",
            MessageStatus::StateRootNotPublished => "STATE_ROOT_NOT_PUBLISHED",
            MessageStatus::ReadyToProve => "READY_TO_PROVE",
            MessageStatus::InChallengePeriod => "IN_CHALLENGE_PERIOD",
            MessageStatus::ReadyForRelay => "READY_FOR_RELAY",
            MessageStatus::Relayed => "RELAYED",
        }
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deposit status from the L2 messenger's bookkeeping.
pub fn deposit_status(successful: bool, failed: bool) -> MessageStatus {
    if successful {
        MessageStatus::Relayed
    } else if failed {
        MessageStatus::FailedL1ToL2Message
    } else {
        MessageStatus::UnconfirmedL1ToL2Message
    }
}

/// Status of a withdrawal whose output has been published.
///
/// `proven_at` is the portal's proof timestamp, zero when unproven.
pub fn proven_withdrawal_status(proven_at: u64, finalization_period: u64, l1_timestamp: u64) -> MessageStatus {
    if proven_at == 0 {
        MessageStatus::ReadyToProve
    } else if l1_timestamp < proven_at.saturating_add(finalization_period) {
        MessageStatus::InChallengePeriod
    } else {
        MessageStatus::ReadyForRelay
    }
}
