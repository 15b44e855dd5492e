//! builder.rs - Venue-specific call assembly
//!
//! Turns a quote plus route metadata into the final call payloads: the
//! concentrated router's path swap (batched with unwrap/refund through
//! multicall), the stable router's three call shapes, and the passthrough
//! of an aggregator-built transaction.

use chrono::Utc;
use ethers::abi::AbiEncode;
use ethers::types::{Address, Bytes, H160, U256};
use ethers::utils::to_checksum;
use log::debug;

use crate::contracts::{
    ExactInputCall, MulticallCall, RefundETHCall, SwapExactETHForTokensCall,
    SwapExactTokensForETHCall, SwapExactTokensForTokensCall, UnwrapWETH9Call,
};
use crate::error::SwapError;
use crate::models::{AggregatorTx, SwapRequest};

/// Sentinel recipient telling the concentrated router to hold proceeds for
/// a follow-up call in the same batch.
pub const ROUTER_HOLD_RECIPIENT: Address = H160([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2,
]);

/// Seconds a stable-router swap stays valid.
const DEADLINE_SECS: u64 = 1800;

/// Final call payload for one venue: target contract, calldata, and the
/// deadline embedded in it (when the venue has one). The transaction value
/// is assembled by the orchestrator from the source token.
#[derive(Debug, Clone)]
pub struct BuiltCalls {
    pub to: Address,
    pub data: Bytes,
    pub deadline: Option<u64>,
}

/// Concentrated-AMM venue: `exactInput` over the packed path.
///
/// When the destination is the native asset the in-call recipient is the
/// hold sentinel and `unwrapWETH9` is appended; when the source is the
/// native asset `refundETH` is appended to return unspent value. The router
/// executes the batch through `multicall` either way.
pub fn build_amm_swap(
    req: &SwapRequest,
    path: Bytes,
    min_amount_out: U256,
    router: Address,
) -> BuiltCalls {
    let in_call_recipient = if req.to.is_native() {
        ROUTER_HOLD_RECIPIENT
    } else {
        req.recipient
    };

    let swap = ExactInputCall {
        params: (path, in_call_recipient, req.amount_in_wei, min_amount_out),
    };
    let mut calls: Vec<Bytes> = vec![swap.encode().into()];

    if req.from.is_native() || req.to.is_native() {
        let followup: Bytes = if req.to.is_native() {
            UnwrapWETH9Call {
                amount_minimum: min_amount_out,
                recipient: req.recipient,
            }
            .encode()
            .into()
        } else {
            RefundETHCall::default().encode().into()
        };
        calls.push(followup);
    }

    let data: Bytes = MulticallCall { data: calls }.encode().into();
    BuiltCalls {
        to: router,
        data,
        deadline: None,
    }
}

/// Stable-pool venue: one of three call shapes depending on which side of
/// the swap is the native asset, sharing the trailing
/// `(minAmountOut, hops, recipient, deadline)` payload.
pub fn build_stable_swap(
    req: &SwapRequest,
    stable: bool,
    min_amount_out: U256,
    router: Address,
    wrapped_native: Address,
) -> BuiltCalls {
    let deadline = Utc::now().timestamp() as u64 + DEADLINE_SECS;
    let routes = vec![(
        req.from.erc20(wrapped_native),
        req.to.erc20(wrapped_native),
        stable,
    )];

    let data: Bytes = if req.from.is_native() {
        SwapExactETHForTokensCall {
            amount_out_min: min_amount_out,
            routes,
            to: req.recipient,
            deadline: deadline.into(),
        }
        .encode()
        .into()
    } else if req.to.is_native() {
        SwapExactTokensForETHCall {
            amount_in: req.amount_in_wei,
            amount_out_min: min_amount_out,
            routes,
            to: req.recipient,
            deadline: deadline.into(),
        }
        .encode()
        .into()
    } else {
        SwapExactTokensForTokensCall {
            amount_in: req.amount_in_wei,
            amount_out_min: min_amount_out,
            routes,
            to: req.recipient,
            deadline: deadline.into(),
        }
        .encode()
        .into()
    };

    BuiltCalls {
        to: router,
        data,
        deadline: Some(deadline),
    }
}

/// Aggregator venue: the quote already carries the executable transaction;
/// validate the target address and forward calldata untouched.
pub fn forward_aggregator_tx(tx: &AggregatorTx) -> Result<BuiltCalls, SwapError> {
    let to: Address = tx
        .to
        .parse()
        .map_err(|_| SwapError::Malformed(format!("bad transaction target {}", tx.to)))?;
    let raw = tx.data.strip_prefix("0x").unwrap_or(&tx.data);
    let data: Bytes = hex::decode(raw)
        .map_err(|_| SwapError::Malformed("transaction data is not hex".to_string()))?
        .into();

    debug!("forwarding aggregator transaction to {}", to_checksum(&to, None));
    Ok(BuiltCalls {
        to,
        data,
        deadline: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::AbiDecode;
    use rust_decimal_macros::dec;

    use crate::models::Token;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    const WRAPPED: u64 = 0x0006;

    fn request(from: Token, to: Token) -> SwapRequest {
        SwapRequest {
            from,
            to,
            amount: dec!(1),
            amount_in_wei: U256::exp10(18),
            recipient: addr(0xbeef),
        }
    }

    fn sample_path() -> Bytes {
        let mut raw = vec![0u8; 43];
        raw[20..23].copy_from_slice(&[0x00, 0x01, 0xf4]);
        raw.into()
    }

    #[test]
    fn test_token_to_token_swap_is_single_multicall_entry() {
        let req = request(Token::new("USDC", addr(1), 6), Token::new("USDT", addr(2), 6));
        let built = build_amm_swap(&req, sample_path(), U256::from(990u64), addr(0xabc));

        let batch = MulticallCall::decode(&built.data).unwrap();
        assert_eq!(batch.data.len(), 1);

        let swap = ExactInputCall::decode(&batch.data[0]).unwrap();
        let (path, recipient, amount_in, min_out) = swap.params;
        assert_eq!(path, sample_path());
        assert_eq!(recipient, addr(0xbeef));
        assert_eq!(amount_in, U256::exp10(18));
        assert_eq!(min_out, U256::from(990u64));
    }

    #[test]
    fn test_native_out_uses_hold_sentinel_and_unwraps() {
        let req = request(Token::new("USDC", addr(1), 6), Token::native("ETH"));
        let built = build_amm_swap(&req, sample_path(), U256::from(990u64), addr(0xabc));

        let batch = MulticallCall::decode(&built.data).unwrap();
        assert_eq!(batch.data.len(), 2);

        let swap = ExactInputCall::decode(&batch.data[0]).unwrap();
        assert_eq!(swap.params.1, ROUTER_HOLD_RECIPIENT);

        let unwrap = UnwrapWETH9Call::decode(&batch.data[1]).unwrap();
        assert_eq!(unwrap.amount_minimum, U256::from(990u64));
        assert_eq!(unwrap.recipient, addr(0xbeef));
    }

    #[test]
    fn test_native_in_appends_refund() {
        let req = request(Token::native("ETH"), Token::new("USDC", addr(1), 6));
        let built = build_amm_swap(&req, sample_path(), U256::from(990u64), addr(0xabc));

        let batch = MulticallCall::decode(&built.data).unwrap();
        assert_eq!(batch.data.len(), 2);

        // proceeds go straight to the wallet; only unspent value is refunded
        let swap = ExactInputCall::decode(&batch.data[0]).unwrap();
        assert_eq!(swap.params.1, addr(0xbeef));
        assert!(RefundETHCall::decode(&batch.data[1]).is_ok());
    }

    #[test]
    fn test_stable_token_to_token_shape_and_deadline() {
        let req = request(Token::new("USDC", addr(1), 6), Token::new("USDT", addr(2), 6));
        let built = build_stable_swap(&req, true, U256::from(990u64), addr(0xabc), addr(WRAPPED));

        let call = SwapExactTokensForTokensCall::decode(&built.data).unwrap();
        assert_eq!(call.amount_in, U256::exp10(18));
        assert_eq!(call.amount_out_min, U256::from(990u64));
        assert_eq!(call.routes, vec![(addr(1), addr(2), true)]);
        assert_eq!(call.to, addr(0xbeef));

        let now = Utc::now().timestamp() as u64;
        let deadline = built.deadline.unwrap();
        assert!(deadline >= now + 1795 && deadline <= now + 1805);
        assert_eq!(call.deadline, U256::from(deadline));
    }

    #[test]
    fn test_stable_native_in_shape() {
        let req = request(Token::native("ETH"), Token::new("USDC", addr(1), 6));
        let built = build_stable_swap(&req, false, U256::from(990u64), addr(0xabc), addr(WRAPPED));

        let call = SwapExactETHForTokensCall::decode(&built.data).unwrap();
        // native side rides as the wrapped token inside the hop list
        assert_eq!(call.routes, vec![(addr(WRAPPED), addr(1), false)]);
    }

    #[test]
    fn test_stable_native_out_shape() {
        let req = request(Token::new("USDC", addr(1), 6), Token::native("ETH"));
        let built = build_stable_swap(&req, false, U256::from(990u64), addr(0xabc), addr(WRAPPED));

        let call = SwapExactTokensForETHCall::decode(&built.data).unwrap();
        assert_eq!(call.routes, vec![(addr(1), addr(WRAPPED), false)]);
    }

    #[test]
    fn test_forward_aggregator_tx_parses_target() {
        let tx = AggregatorTx {
            to: "0x2626664c2603336E57B271c5C0b26F421741e481".to_string(),
            data: "0xdeadbeef".to_string(),
            value: None,
        };
        let built = forward_aggregator_tx(&tx).unwrap();
        assert_eq!(built.data.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
        assert!(built.deadline.is_none());
    }

    #[test]
    fn test_forward_aggregator_tx_rejects_bad_target() {
        let tx = AggregatorTx {
            to: "not-an-address".to_string(),
            data: "0x".to_string(),
            value: None,
        };
        assert!(matches!(
            forward_aggregator_tx(&tx),
            Err(SwapError::Malformed(_))
        ));
    }
}
