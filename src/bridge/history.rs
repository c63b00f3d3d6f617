//! Deposit and withdrawal history of an address.

use alloy::primitives::{Address, B256};
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;

use crate::bridge::contracts::{
    IL1StandardBridge::{ERC20DepositInitiated, ETHDepositInitiated},
    IL2StandardBridge::WithdrawalInitiated,
    L2_ETH_TOKEN, L2_STANDARD_BRIDGE,
};
use crate::bridge::messenger::CrossChainMessenger;
use crate::bridge::types::{BridgeResult, MessageDirection, TokenBridgeMessage};

impl CrossChainMessenger {
    /// Deposits sent by `address` through the L1 standard bridge, newest first.
    pub async fn get_deposits_by_address(&self, address: Address) -> BridgeResult<Vec<TokenBridgeMessage>> {
        let bridge = self.contracts().l1_standard_bridge;
        let sender = address.into_word();

        let eth_filter = self
            .history_filter(bridge)
            .event_signature(ETHDepositInitiated::SIGNATURE_HASH)
            .topic1(sender);
        let erc20_filter = self
            .history_filter(bridge)
            .event_signature(ERC20DepositInitiated::SIGNATURE_HASH)
            .topic3(sender);

        let mut transfers: Vec<_> = self
            .l1()
            .get_logs(&eth_filter)
            .await?
            .iter()
            .filter_map(eth_deposit)
            .collect();
        transfers.extend(
            self.l1()
                .get_logs(&erc20_filter)
                .await?
                .iter()
                .filter_map(erc20_deposit),
        );

        sort_newest_first(&mut transfers);
        tracing::debug!(%address, count = transfers.len(), "Deposits found");
        Ok(transfers)
    }

    /// Withdrawals sent by `address` through the L2 standard bridge, newest first.
    pub async fn get_withdrawals_by_address(&self, address: Address) -> BridgeResult<Vec<TokenBridgeMessage>> {
        let filter = self
            .history_filter(L2_STANDARD_BRIDGE)
            .event_signature(WithdrawalInitiated::SIGNATURE_HASH)
            .topic3(address.into_word());

        let mut transfers: Vec<_> = self
            .l2()
            .get_logs(&filter)
            .await?
            .iter()
            .filter_map(withdrawal)
            .collect();

        sort_newest_first(&mut transfers);
        tracing::debug!(%address, count = transfers.len(), "Withdrawals found");
        Ok(transfers)
    }

    fn history_filter(&self, bridge: Address) -> Filter {
        Filter::new().address(bridge).from_block(self.config.from_block)
    }
}

fn eth_deposit(log: &Log) -> Option<TokenBridgeMessage> {
    let event = log.log_decode::<ETHDepositInitiated>().ok()?.inner.data;
    Some(TokenBridgeMessage {
        transaction_hash: log.transaction_hash.unwrap_or(B256::ZERO),
        direction: MessageDirection::L1ToL2,
        from: event.from,
        to: event.to,
        l1_token: Address::ZERO,
        l2_token: L2_ETH_TOKEN,
        amount: event.amount,
        extra_data: event.extraData,
        block_number: log.block_number.unwrap_or_default(),
        log_index: log.log_index.unwrap_or_default(),
    })
}

fn erc20_deposit(log: &Log) -> Option<TokenBridgeMessage> {
    let event = log.log_decode::<ERC20DepositInitiated>().ok()?.inner.data;
    Some(TokenBridgeMessage {
        transaction_hash: log.transaction_hash.unwrap_or(B256::ZERO),
        direction: MessageDirection::L1ToL2,
        from: event.from,
        to: event.to,
        l1_token: event.l1Token,
        l2_token: event.l2Token,
        amount: event.amount,
        extra_data: event.extraData,
        block_number: log.block_number.unwrap_or_default(),
        log_index: log.log_index.unwrap_or_default(),
    })
}

fn withdrawal(log: &Log) -> Option<TokenBridgeMessage> {
    let event = log.log_decode::<WithdrawalInitiated>().ok()?.inner.data;
    Some(TokenBridgeMessage {
        transaction_hash: log.transaction_hash.unwrap_or(B256::ZERO),
        direction: MessageDirection::L2ToL1,
        from: event.from,
        to: event.to,
        l1_token: event.l1Token,
        l2_token: event.l2Token,
        amount: event.amount,
        extra_data: event.extraData,
        block_number: log.block_number.unwrap_or_default(),
        log_index: log.log_index.unwrap_or_default(),
    })
}

fn sort_newest_first(transfers: &mut [TokenBridgeMessage]) {
    transfers.sort_by(|a, b| {
        b.block_number
            .cmp(&a.block_number)
            .then(b.log_index.cmp(&a.log_index))
    });
}
