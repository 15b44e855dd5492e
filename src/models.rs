//! models.rs - Core data structures for the swap router
//!
//! Tokens, quotes, route metadata and the assembled transaction request.
//! Everything here is created fresh per swap invocation and discarded once
//! the transaction request is handed back to the caller.

use ethers::types::{Address, Bytes, U256, U512};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SwapError;

/// Denominator for slippage arithmetic: percent scaled by 1e6, so the
/// minimum-output floor keeps exact integer semantics down to 1e-6 percent.
const SLIPPAGE_DENOM: u64 = 100_000_000;

/// Represents a token on the active network.
///
/// `address == None` means the chain's native asset; native tokens are
/// detected by symbol against the network's designated native symbol when
/// the registry resolves them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Token {
    pub symbol: String,
    pub address: Option<Address>,
    pub decimals: u8,
}

impl Token {
    pub fn new(symbol: &str, address: Address, decimals: u8) -> Self {
        Token {
            symbol: symbol.to_string(),
            address: Some(address),
            decimals,
        }
    }

    /// The native asset carries no contract address.
    pub fn native(symbol: &str) -> Self {
        Token {
            symbol: symbol.to_string(),
            address: None,
            decimals: 18,
        }
    }

    pub fn is_native(&self) -> bool {
        self.address.is_none()
    }

    /// Address used inside paths and hop lists: the token's own contract,
    /// or the wrapped-native contract when the token is the native asset.
    pub fn erc20(&self, wrapped_native: Address) -> Address {
        self.address.unwrap_or(wrapped_native)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// One swap invocation's resolved inputs.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub from: Token,
    pub to: Token,
    /// Human-unit amount, used for logging and the aggregator payload.
    pub amount: Decimal,
    /// The same amount in wei.
    pub amount_in_wei: U256,
    /// Account that receives the swap proceeds.
    pub recipient: Address,
}

impl SwapRequest {
    /// Pair identifier (e.g. "ETH/USDC.e") for diagnostics.
    pub fn pair_id(&self) -> String {
        format!("{}/{}", self.from.symbol, self.to.symbol)
    }
}

/// Executable transaction captured from the aggregator's tx-create call.
/// Kept as raw strings; the builder parses and validates them.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorTx {
    pub to: String,
    pub data: String,
    pub value: Option<String>,
}

/// Venue-specific route payload attached to a quote. Opaque to the
/// orchestrator; only the matching builder knows how to consume it.
#[derive(Debug, Clone)]
pub enum RouteMeta {
    /// Aggregator correlation id, step count and the already-fetched
    /// executable transaction.
    Aggregator {
        request_id: String,
        steps: usize,
        tx: AggregatorTx,
    },
    /// Packed multi-hop path for the concentrated-liquidity router.
    Path(Bytes),
    /// Pool discrimination returned by the stable router's read call.
    StablePool { stable: bool },
}

/// Expected output plus the route metadata needed to build the calls.
/// Produced per invocation, consumed once, never cached.
#[derive(Debug, Clone)]
pub struct Quote {
    pub expected_out: U256,
    pub route: RouteMeta,
}

/// Unsigned transaction request returned to the caller. Gas estimation,
/// signing, submission and retry wrapping all happen outside the core.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRequest {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub deadline: Option<u64>,
}

/// Allowance the spending contract needs before an ERC-20 swap can execute.
/// Emitted to the approval collaborator; the approval transaction itself is
/// external and idempotent to repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequirement {
    pub spender: Address,
    pub token: Address,
    pub amount: U256,
}

/// Convert a human-unit amount to wei, truncating any sub-wei fraction.
pub fn to_wei(amount: Decimal, decimals: u8) -> Result<U256, SwapError> {
    if amount.is_sign_negative() {
        return Err(SwapError::InvalidAmount(amount.to_string()));
    }
    let scale = 10u128
        .checked_pow(decimals as u32)
        .and_then(Decimal::from_u128)
        .ok_or_else(|| SwapError::InvalidAmount(format!("unsupported decimals {decimals}")))?;
    let scaled = amount
        .checked_mul(scale)
        .ok_or_else(|| SwapError::InvalidAmount(amount.to_string()))?;
    let integral = scaled.trunc().to_string();
    let integral = integral.split('.').next().unwrap_or("0");
    U256::from_dec_str(integral).map_err(|_| SwapError::InvalidAmount(amount.to_string()))
}

/// Slippage-bounded minimum acceptable output.
///
/// `floor(expected * (1 - slippage/100))`: integer truncation, never rounds
/// up, and the result always stays within `0..=expected`. Slippage outside
/// `0..=100` percent is clamped.
pub fn min_amount_out(expected: U256, slippage_percent: Decimal) -> U256 {
    let scaled = (slippage_percent * Decimal::from(1_000_000u64)).trunc();
    let scaled = scaled.to_u64().unwrap_or(0).min(SLIPPAGE_DENOM);
    let numerator = expected.full_mul(U256::from(SLIPPAGE_DENOM - scaled));
    let floored = numerator / U512::from(SLIPPAGE_DENOM);
    U256::try_from(floored).unwrap_or(U256::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    #[test]
    fn test_native_token_has_no_address() {
        let eth = Token::native("ETH");
        assert!(eth.is_native());
        assert_eq!(eth.erc20(addr(6)), addr(6));
    }

    #[test]
    fn test_erc20_token_keeps_own_address() {
        let usdc = Token::new("USDC", addr(42), 6);
        assert!(!usdc.is_native());
        assert_eq!(usdc.erc20(addr(6)), addr(42));
    }

    #[test]
    fn test_to_wei_truncates() {
        assert_eq!(
            to_wei(dec!(1.5), 18).unwrap(),
            U256::from_dec_str("1500000000000000000").unwrap()
        );
        assert_eq!(to_wei(dec!(12.345678), 6).unwrap(), U256::from(12_345_678u64));
        // sub-wei fraction is dropped, never rounded up
        assert_eq!(to_wei(dec!(1.9999999), 6).unwrap(), U256::from(1_999_999u64));
    }

    #[test]
    fn test_to_wei_rejects_negative() {
        assert!(matches!(
            to_wei(dec!(-1), 18),
            Err(SwapError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_min_amount_out_reference_case() {
        // 1e18 wei at 0.5% slippage
        let expected = U256::from_dec_str("1000000000000000000").unwrap();
        assert_eq!(
            min_amount_out(expected, dec!(0.5)),
            U256::from_dec_str("995000000000000000").unwrap()
        );
    }

    #[test]
    fn test_min_amount_out_bounds() {
        let expected = U256::from(1_000_000u64);
        assert_eq!(min_amount_out(expected, dec!(0)), expected);
        assert_eq!(min_amount_out(expected, dec!(100)), U256::zero());
        // out-of-range slippage clamps instead of wrapping
        assert_eq!(min_amount_out(expected, dec!(250)), U256::zero());
        assert_eq!(min_amount_out(expected, dec!(-3)), expected);
    }

    #[test]
    fn test_min_amount_out_floors() {
        // 3 * (100_000_000 - 100) / 100_000_000 = 2.999997 -> 2
        assert_eq!(min_amount_out(U256::from(3u64), dec!(0.0001)), U256::from(2u64));
        assert!(min_amount_out(U256::from(3u64), dec!(0.0001)) <= U256::from(3u64));
    }
}
