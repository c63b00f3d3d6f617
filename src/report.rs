//! Human-readable output for the command-line tools.

use std::fmt::Display;
use std::time::Duration;

use alloy::primitives::utils::format_units;
use alloy::primitives::U256;

use crate::bridge::TokenBridgeMessage;
use crate::gas::{GasEstimate, GasUsage};

const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Whole Gwei in a wei amount, rounded down.
pub fn to_gwei(wei: U256) -> U256 {
    wei / U256::from(WEI_PER_GWEI)
}

/// Whole tokens in a base-unit amount, rounded down.
pub fn to_whole_tokens(amount: U256, decimals: u8) -> U256 {
    amount / U256::from(10u64).pow(U256::from(decimals))
}

/// `On L1:<n> Gwei    On L2:<n> Gwei`
pub fn eth_balances_line(l1: U256, l2: U256) -> String {
    format!("On L1:{} Gwei    On L2:{} Gwei", to_gwei(l1), to_gwei(l2))
}

/// `<SYM> on L1:<n>     <SYM> on L2:<n>`, in whole tokens.
pub fn token_balances_line(symbol: &str, l1: U256, l2: U256, decimals: u8) -> String {
    format!(
        "{symbol} on L1:{}     {symbol} on L2:{}",
        to_whole_tokens(l1, decimals),
        to_whole_tokens(l2, decimals)
    )
}

/// Seconds with millisecond precision, trailing zeros dropped.
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let secs = millis / 1000;
    let frac = millis % 1000;
    if frac == 0 {
        secs.to_string()
    } else {
        format!("{}.{}", secs, format!("{:03}", frac).trim_end_matches('0'))
    }
}

/// `Time so far <s> seconds`
pub fn time_so_far(elapsed: Duration) -> String {
    format!("Time so far {} seconds", format_elapsed(elapsed))
}

/// Decimal token amount with trailing zeros dropped (`1.5`, `100`).
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
    let formatted = format_units(amount, decimals).unwrap_or_else(|_| amount.to_string());
    match formatted.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => formatted,
    }
}

/// Wei right-aligned to 20 columns.
pub fn display_wei(wei: impl Display) -> String {
    format!("{:>20}", wei.to_string())
}

/// Gas right-aligned to 10 columns.
pub fn display_gas(gas: impl Display) -> String {
    format!("{:>10}", gas.to_string())
}

/// `real - estimate`, negative when the estimate was high.
pub fn signed_difference(real: U256, estimate: U256) -> String {
    if real >= estimate {
        (real - estimate).to_string()
    } else {
        format!("-{}", estimate - real)
    }
}

/// Estimate report, with the measured values when the transaction was sent.
pub fn gas_report(estimate: &GasEstimate, real: Option<&GasUsage>) -> String {
    let mut lines = vec![
        "Estimates:".to_string(),
        format!("   Total gas cost: {} wei", display_wei(estimate.total_cost)),
        format!("      L1 gas cost: {} wei", display_wei(estimate.l1_cost)),
        format!("      L2 gas cost: {} wei", display_wei(estimate.l2_cost)),
    ];

    match real {
        Some(real) => {
            lines.push(String::new());
            lines.push("Real values:".to_string());
            lines.push(format!("   Total gas cost: {} wei", display_wei(real.total_cost)));
            lines.push(format!("      L1 gas cost: {} wei", display_wei(real.l1_cost)));
            lines.push(format!("      L2 gas cost: {} wei", display_wei(real.l2_cost)));

            lines.push(String::new());
            lines.push("L1 Gas:".to_string());
            lines.push(format!("      Estimate: {}", display_gas(estimate.l1_gas)));
            lines.push(format!("          Real: {}", display_gas(real.l1_gas)));
            lines.push(format!(
                "    Difference: {}",
                display_gas(signed_difference(real.l1_gas, estimate.l1_gas))
            ));

            lines.push(String::new());
            lines.push("L2 Gas:".to_string());
            lines.push(format!("      Estimate: {}", display_gas(estimate.l2_gas)));
            lines.push(format!("          Real: {}", display_gas(real.l2_gas)));
            lines.push(format!(
                "    Difference: {}",
                display_gas(signed_difference(
                    U256::from(real.l2_gas),
                    U256::from(estimate.l2_gas)
                ))
            ));
        }
        None => {
            lines.push(format!("      L1 gas: {}", display_gas(estimate.l1_gas)));
            lines.push(format!("      L2 gas: {}", display_gas(estimate.l2_gas)));
        }
    }

    lines.join("\n")
}

/// Three-line description of one bridge transfer, 18-decimal amounts.
pub fn describe_transfer(transfer: &TokenBridgeMessage, symbol: &str, relayed: bool) -> String {
    format!(
        "tx:{}\n\tAmount: {} {}\n\tRelayed: {}",
        transfer.transaction_hash,
        format_token_amount(transfer.amount, 18),
        symbol,
        relayed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::MessageDirection;
    use alloy::primitives::{Address, Bytes, TxHash};

    #[test]
    fn test_eth_balances_line() {
        let l1 = U256::from(1_500_000_000_123u64);
        let l2 = U256::from(999u64);
        assert_eq!(eth_balances_line(l1, l2), "On L1:1500 Gwei    On L2:0 Gwei");
    }

    #[test]
    fn test_token_balances_line() {
        let one = U256::from(10u64).pow(U256::from(18u64));
        let line = token_balances_line("OUTb", one * U256::from(3u64), U256::ZERO, 18);
        assert_eq!(line, "OUTb on L1:3     OUTb on L2:0");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(12_345)), "12.345");
        assert_eq!(format_elapsed(Duration::from_millis(1_500)), "1.5");
        assert_eq!(format_elapsed(Duration::from_secs(3)), "3");
        assert_eq!(time_so_far(Duration::from_millis(250)), "Time so far 0.25 seconds");
    }

    #[test]
    fn test_format_token_amount() {
        let one = U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(format_token_amount(one, 18), "1");
        assert_eq!(format_token_amount(one / U256::from(4u64), 18), "0.25");
        assert_eq!(format_token_amount(U256::ZERO, 18), "0");
    }

    #[test]
    fn test_padding() {
        assert_eq!(display_wei(42u64).len(), 20);
        assert!(display_wei(42u64).ends_with("42"));
        assert_eq!(display_gas(7u64), "         7");
    }

    #[test]
    fn test_signed_difference() {
        assert_eq!(signed_difference(U256::from(10u64), U256::from(4u64)), "6");
        assert_eq!(signed_difference(U256::from(4u64), U256::from(10u64)), "-6");
    }

    #[test]
    fn test_gas_report() {
        let estimate = GasEstimate {
            l1_gas: U256::from(1_600u64),
            l2_gas: 30_000,
            l1_cost: U256::from(100u64),
            l2_cost: U256::from(200u64),
            total_cost: U256::from(300u64),
        };
        let report = gas_report(&estimate, None);
        assert!(report.starts_with("Estimates:"));
        assert!(report.contains("      L2 gas:      30000"));
        assert!(!report.contains("Real values"));

        let real = GasUsage {
            tx_hash: TxHash::ZERO,
            l1_gas: U256::from(1_580u64),
            l2_gas: 28_000,
            l1_cost: U256::from(90u64),
            l2_cost: U256::from(180u64),
            total_cost: U256::from(270u64),
        };
        let report = gas_report(&estimate, Some(&real));
        assert!(report.contains("Real values:"));
        assert!(report.contains("    Difference:        -20"));
        assert!(report.contains("    Difference:      -2000"));
    }

    #[test]
    fn test_describe_transfer() {
        let transfer = TokenBridgeMessage {
            transaction_hash: TxHash::ZERO,
            direction: MessageDirection::L1ToL2,
            from: Address::ZERO,
            to: Address::ZERO,
            l1_token: Address::ZERO,
            l2_token: Address::ZERO,
            amount: U256::from(10u64).pow(U256::from(17u64)),
            extra_data: Bytes::new(),
            block_number: 1,
            log_index: 0,
        };
        let text = describe_transfer(&transfer, "ETH", true);
        assert!(text.starts_with("tx:0x0000"));
        assert!(text.contains("\tAmount: 0.1 ETH"));
        assert!(text.ends_with("\tRelayed: true"));
    }
}
