//! Command handlers.
//!
//! Progress goes to stdout the way the flows are meant to be followed by a
//! person; diagnostics go through `tracing`.

use std::time::Instant;

use alloy::network::TransactionBuilder;
use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use serde::Serialize;

use crate::blockchain::Layer;
use crate::bridge::{
    CrossChainMessage, CrossChainMessenger, MessageDirection, MessageReceiptStatus, MessageStatus,
    TokenBridgeMessage,
};
use crate::cli::args::{TokenArgs, TransferArgs, WithdrawArgs};
use crate::cli::context::Context;
use crate::cli::CliError;
use crate::config::Network;
use crate::gas;
use crate::report;

/// `balances`
pub async fn balances(ctx: &Context) -> Result<(), CliError> {
    let messenger = ctx.messenger().await?;
    let owner = ctx.signer()?;
    report_eth_balances(&messenger, owner).await?;

    if let (Some(l1_token), Some(l2_token)) = (ctx.config.tokens.l1_token, ctx.config.tokens.l2_token) {
        let token = TokenInfo::load(&messenger, l1_token, l2_token).await?;
        report_token_balances(&messenger, &token, owner).await?;
    }
    Ok(())
}

/// `deposit-eth`
pub async fn deposit_eth(ctx: &Context, args: &TransferArgs) -> Result<(), CliError> {
    let amount = parse_eth_amount(&args.amount)?;
    let messenger = ctx.messenger().await?;
    let owner = ctx.signer()?;

    println!("Deposit ETH");
    report_eth_balances(&messenger, owner).await?;
    let start = Instant::now();

    let pending = messenger.deposit_eth(amount, args.recipient).await?;
    let hash = *pending.tx_hash();
    println!("Transaction hash (on L1): {}", hash);
    ctx.print_explorer_link(Layer::L1, hash);
    messenger.confirm(Layer::L1, pending, "depositETH").await?;

    println!("Waiting for status to change to RELAYED");
    println!("{}", report::time_so_far(start.elapsed()));
    let message = first_message(&messenger, hash, MessageDirection::L1ToL2).await?;
    messenger
        .wait_for_message_status(&message, MessageStatus::Relayed)
        .await?;

    report_eth_balances(&messenger, owner).await?;
    println!("depositETH took {} seconds\n\n", report::format_elapsed(start.elapsed()));
    Ok(())
}

/// `withdraw-eth`
pub async fn withdraw_eth(ctx: &Context, args: &WithdrawArgs) -> Result<(), CliError> {
    require_output_oracle(ctx.config.network)?;
    let amount = parse_eth_amount(&args.amount)?;
    let messenger = ctx.messenger().await?;
    let owner = ctx.signer()?;

    println!("Withdraw ETH");
    let start = Instant::now();
    report_eth_balances(&messenger, owner).await?;

    let pending = messenger.withdraw_eth(amount, args.recipient).await?;
    let hash = *pending.tx_hash();
    println!("Transaction hash (on L2): {}", hash);
    ctx.print_explorer_link(Layer::L2, hash);
    messenger.confirm(Layer::L2, pending, "withdrawETH").await?;

    let message = first_message(&messenger, hash, MessageDirection::L2ToL1).await?;
    complete_withdrawal(ctx, &messenger, &message, start).await?;

    report_eth_balances(&messenger, owner).await?;
    println!("withdrawETH took {} seconds\n\n\n", report::format_elapsed(start.elapsed()));
    Ok(())
}

/// `deposit-erc20`
pub async fn deposit_erc20(ctx: &Context, args: &TokenArgs) -> Result<(), CliError> {
    let messenger = ctx.messenger().await?;
    let owner = ctx.signer()?;
    let (l1_token, l2_token) = token_pair(ctx, args)?;
    let token = TokenInfo::load(&messenger, l1_token, l2_token).await?;
    let amount = parse_token_amount(&args.amount, token.decimals)?;

    println!("Deposit ERC20");
    report_token_balances(&messenger, &token, owner).await?;
    if args.faucet {
        top_up_from_faucet(ctx, &messenger, &token, owner).await?;
    }
    let start = Instant::now();

    let pending = messenger.approve_erc20(l1_token, amount).await?;
    let approve_hash = *pending.tx_hash();
    messenger.confirm(Layer::L1, pending, "approve").await?;
    println!("Allowance given by tx {}", approve_hash);
    ctx.print_explorer_link(Layer::L1, approve_hash);
    println!("{}", report::time_so_far(start.elapsed()));

    let pending = messenger
        .deposit_erc20(l1_token, l2_token, amount, args.recipient)
        .await?;
    let hash = *pending.tx_hash();
    println!("Deposit transaction hash (on L1): {}", hash);
    ctx.print_explorer_link(Layer::L1, hash);
    messenger.confirm(Layer::L1, pending, "depositERC20").await?;

    println!("Waiting for status to change to RELAYED");
    println!("{}", report::time_so_far(start.elapsed()));
    let message = first_message(&messenger, hash, MessageDirection::L1ToL2).await?;
    messenger
        .wait_for_message_status(&message, MessageStatus::Relayed)
        .await?;

    report_token_balances(&messenger, &token, owner).await?;
    println!("depositERC20 took {} seconds\n\n", report::format_elapsed(start.elapsed()));
    Ok(())
}

/// `withdraw-erc20`
pub async fn withdraw_erc20(ctx: &Context, args: &TokenArgs) -> Result<(), CliError> {
    require_output_oracle(ctx.config.network)?;
    let messenger = ctx.messenger().await?;
    let owner = ctx.signer()?;
    let (l1_token, l2_token) = token_pair(ctx, args)?;
    let token = TokenInfo::load(&messenger, l1_token, l2_token).await?;
    let amount = parse_token_amount(&args.amount, token.decimals)?;

    println!("Withdraw ERC20");
    let start = Instant::now();
    report_token_balances(&messenger, &token, owner).await?;

    let pending = messenger.withdraw_erc20(l2_token, amount, args.recipient).await?;
    let hash = *pending.tx_hash();
    println!("Transaction hash (on L2): {}", hash);
    ctx.print_explorer_link(Layer::L2, hash);
    messenger.confirm(Layer::L2, pending, "withdrawERC20").await?;

    let message = first_message(&messenger, hash, MessageDirection::L2ToL1).await?;
    complete_withdrawal(ctx, &messenger, &message, start).await?;

    report_token_balances(&messenger, &token, owner).await?;
    println!("withdrawERC20 took {} seconds\n\n\n", report::format_elapsed(start.elapsed()));
    Ok(())
}

/// `finalize --hash`
pub async fn finalize(ctx: &Context, hash: TxHash) -> Result<(), CliError> {
    require_output_oracle(ctx.config.network)?;
    let messenger = ctx.messenger().await?;
    let message = first_message(&messenger, hash, MessageDirection::L2ToL1).await?;
    let status = messenger.get_message_status(&message).await?;
    println!("Withdrawal {} is {}", hash, status);

    let start = Instant::now();
    complete_withdrawal(ctx, &messenger, &message, start).await?;
    println!("Finalization took {} seconds", report::format_elapsed(start.elapsed()));
    Ok(())
}

/// `status --hash [--index]`
pub async fn status(ctx: &Context, hash: TxHash, index: usize, json: bool) -> Result<(), CliError> {
    #[derive(Serialize)]
    struct StatusReport<'a> {
        message: &'a CrossChainMessage,
        status: MessageStatus,
    }

    let messenger = ctx.messenger().await?;
    let message = messenger.to_cross_chain_message(hash, index).await?;
    let status = messenger.get_message_status(&message).await?;

    if json {
        let report = StatusReport {
            message: &message,
            status,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Direction: {}", message.direction);
        println!("Message hash: {}", message.hash);
        if let Some(withdrawal) = &message.withdrawal {
            println!("Withdrawal hash: {}", withdrawal.hash);
        }
        println!("Status: {}", status);
    }
    Ok(())
}

/// `watch --hash --layer`
pub async fn watch(ctx: &Context, hash: TxHash, layer: u8) -> Result<(), CliError> {
    let messenger = ctx.messenger().await?;
    let direction = if layer == 1 {
        MessageDirection::L1ToL2
    } else {
        MessageDirection::L2ToL1
    };
    let source = direction.source();
    let destination = direction.destination();

    println!("{} to {} message", source, destination);
    println!("{} TX hash: {}", source, hash);
    let message = first_message(&messenger, hash, direction).await?;
    println!("Message hash: {}", message.hash);

    let receipt = messenger.wait_for_message_receipt(&message).await?;
    println!("{} TX hash: {}", destination, receipt.transaction_hash);
    if receipt.status == MessageReceiptStatus::Failed {
        println!("\tThe relay failed; it can be retried on {}", destination);
    }
    Ok(())
}

/// `trace [--address]`
pub async fn trace(ctx: &Context, address: Option<Address>) -> Result<(), CliError> {
    let messenger = ctx.messenger().await?;
    let address = match address {
        Some(address) => address,
        None => ctx.signer()?,
    };

    let deposits = messenger.get_deposits_by_address(address).await?;
    println!("Deposits by address {}", address);
    for transfer in &deposits {
        describe_transfer(&messenger, transfer).await?;
    }

    let withdrawals = messenger.get_withdrawals_by_address(address).await?;
    println!("\n\n\nWithdrawals by address {}", address);
    for transfer in &withdrawals {
        describe_transfer(&messenger, transfer).await?;
    }
    Ok(())
}

/// `estimate-gas [--verify] [--to --data]`
pub async fn estimate_gas(
    ctx: &Context,
    verify: bool,
    to: Option<Address>,
    data: Option<Bytes>,
) -> Result<(), CliError> {
    let tx = match to {
        Some(to) => TransactionRequest::default()
            .with_to(to)
            .with_input(data.unwrap_or_default()),
        None => gas::default_transaction(ctx.config.network, ctx.config.network.preset())?,
    };
    ctx.signer()?;
    let client = ctx.l2_client().await?;

    println!("About to get estimates");
    let estimate = gas::estimate(&client, &tx).await?;

    let real = if verify {
        println!("About to create the transaction");
        let usage = gas::verify(&client, &tx).await?;
        println!("Transaction processed");
        ctx.print_explorer_link(Layer::L2, usage.tx_hash);
        Some(usage)
    } else {
        None
    };

    println!("{}", report::gas_report(&estimate, real.as_ref()));
    Ok(())
}

// --- Shared steps ---

/// Drive a withdrawal from its current status to relayed.
async fn complete_withdrawal(
    ctx: &Context,
    messenger: &CrossChainMessenger,
    message: &CrossChainMessage,
    start: Instant,
) -> Result<(), CliError> {
    println!("Waiting for status to be READY_TO_PROVE");
    println!("{}", report::time_so_far(start.elapsed()));
    let status = messenger
        .wait_for_message_status(message, MessageStatus::ReadyToProve)
        .await?;
    println!("{}", report::time_so_far(start.elapsed()));
    if status == MessageStatus::ReadyToProve {
        let pending = messenger.prove_message(message).await?;
        let hash = *pending.tx_hash();
        messenger.confirm(Layer::L1, pending, "proveWithdrawalTransaction").await?;
        println!("Proved by tx {}", hash);
        ctx.print_explorer_link(Layer::L1, hash);
    }

    println!("In the challenge period, waiting for status READY_FOR_RELAY");
    println!("{}", report::time_so_far(start.elapsed()));
    let status = messenger
        .wait_for_message_status(message, MessageStatus::ReadyForRelay)
        .await?;
    if status == MessageStatus::ReadyForRelay {
        println!("Ready for relay, finalizing message now");
        println!("{}", report::time_so_far(start.elapsed()));
        let pending = messenger.finalize_message(message).await?;
        let hash = *pending.tx_hash();
        messenger
            .confirm(Layer::L1, pending, "finalizeWithdrawalTransaction")
            .await?;
        println!("Finalized by tx {}", hash);
        ctx.print_explorer_link(Layer::L1, hash);
    }

    println!("Waiting for status to change to RELAYED");
    println!("{}", report::time_so_far(start.elapsed()));
    messenger
        .wait_for_message_status(message, MessageStatus::Relayed)
        .await?;
    Ok(())
}

async fn first_message(
    messenger: &CrossChainMessenger,
    hash: TxHash,
    direction: MessageDirection,
) -> Result<CrossChainMessage, CliError> {
    messenger
        .get_messages_by_transaction(hash, Some(direction))
        .await?
        .into_iter()
        .next()
        .ok_or(CliError::NoMessages(hash))
}

async fn report_eth_balances(messenger: &CrossChainMessenger, owner: Address) -> Result<(), CliError> {
    let l1 = messenger.l1().get_balance(owner).await?;
    let l2 = messenger.l2().get_balance(owner).await?;
    println!("{}", report::eth_balances_line(l1, l2));
    Ok(())
}

/// An ERC-20 pair with its L1 metadata.
struct TokenInfo {
    l1: Address,
    l2: Address,
    symbol: String,
    decimals: u8,
}

impl TokenInfo {
    async fn load(messenger: &CrossChainMessenger, l1: Address, l2: Address) -> Result<Self, CliError> {
        Ok(Self {
            l1,
            l2,
            symbol: messenger.token_symbol(Layer::L1, l1).await?,
            decimals: messenger.erc20_decimals(Layer::L1, l1).await?,
        })
    }
}

async fn report_token_balances(
    messenger: &CrossChainMessenger,
    token: &TokenInfo,
    owner: Address,
) -> Result<(), CliError> {
    let l1 = messenger.erc20_balance(Layer::L1, token.l1, owner).await?;
    let l2 = messenger.erc20_balance(Layer::L2, token.l2, owner).await?;
    println!("{}", report::token_balances_line(&token.symbol, l1, l2, token.decimals));
    Ok(())
}

async fn top_up_from_faucet(
    ctx: &Context,
    messenger: &CrossChainMessenger,
    token: &TokenInfo,
    owner: Address,
) -> Result<(), CliError> {
    let balance = messenger.erc20_balance(Layer::L1, token.l1, owner).await?;
    if !report::to_whole_tokens(balance, token.decimals).is_zero() {
        return Ok(());
    }

    println!(
        "You don't have enough {} on L1. Let's call the faucet to fix that",
        token.symbol
    );
    let pending = messenger.erc20_faucet(token.l1).await?;
    let hash = *pending.tx_hash();
    println!("Faucet tx: {}", hash);
    ctx.print_explorer_link(Layer::L1, hash);
    messenger.confirm(Layer::L1, pending, "faucet").await?;

    let balance = messenger.erc20_balance(Layer::L1, token.l1, owner).await?;
    println!(
        "New L1 {} balance: {}",
        token.symbol,
        report::to_whole_tokens(balance, token.decimals)
    );
    Ok(())
}

async fn describe_transfer(messenger: &CrossChainMessenger, transfer: &TokenBridgeMessage) -> Result<(), CliError> {
    let symbol = messenger.token_symbol(Layer::L1, transfer.l1_token).await?;
    let message = first_message(messenger, transfer.transaction_hash, transfer.direction).await?;
    let relayed = messenger.get_message_status(&message).await? == MessageStatus::Relayed;
    println!("{}", report::describe_transfer(transfer, &symbol, relayed));
    println!();
    Ok(())
}

fn token_pair(ctx: &Context, args: &TokenArgs) -> Result<(Address, Address), CliError> {
    let l1 = args.l1_token.or(ctx.config.tokens.l1_token);
    let l2 = args.l2_token.or(ctx.config.tokens.l2_token);
    match (l1, l2) {
        (Some(l1), Some(l2)) => Ok((l1, l2)),
        _ => Err(CliError::MissingTokenPair(ctx.config.network)),
    }
}

/// Refuse withdrawal flows before anything is sent on networks they cannot prove on.
fn require_output_oracle(network: Network) -> Result<(), CliError> {
    if network.uses_fault_proofs() {
        return Err(CliError::FaultProofNetwork(network));
    }
    Ok(())
}

fn parse_eth_amount(amount: &str) -> Result<U256, CliError> {
    parse_token_amount(amount, 18)
}

/// Non-negative decimal amount in the token's smallest unit.
fn parse_token_amount(amount: &str, decimals: u8) -> Result<U256, CliError> {
    let invalid = |reason: String| CliError::Amount(amount.to_string(), reason);
    match parse_units(amount, decimals).map_err(|e| invalid(e.to_string()))? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(value) if !value.is_negative() => Ok(value.into_raw()),
        ParseUnits::I256(_) => Err(invalid("amount must not be negative".to_string())),
    }
}
