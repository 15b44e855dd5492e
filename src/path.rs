//! path.rs - Binary multi-hop path packing for concentrated-liquidity pools
//!
//! Wire layout: `address(20) | fee(3) | address(20) [ | fee(3) | address(20) ]`.
//! Fees are 3-byte big-endian unsigned integers; addresses are always exactly
//! 20 bytes. Total length is `20 + 23 * hops`.

use ethers::types::{Address, Bytes};

use crate::config::EngineConfig;
use crate::error::SwapError;
use crate::models::Token;

const ADDR_LEN: usize = 20;
const FEE_LEN: usize = 3;

fn push_address(buf: &mut Vec<u8>, address: Address) {
    buf.extend_from_slice(address.as_bytes());
}

fn push_fee(buf: &mut Vec<u8>, fee: u32) {
    // big-endian, truncated to the low 3 bytes
    buf.extend_from_slice(&fee.to_be_bytes()[1..]);
}

fn direct_path(from: Address, fee: u32, to: Address) -> Bytes {
    let mut buf = Vec::with_capacity(2 * ADDR_LEN + FEE_LEN);
    push_address(&mut buf, from);
    push_fee(&mut buf, fee);
    push_address(&mut buf, to);
    buf.into()
}

fn missing_fee(cfg: &EngineConfig, from: &str, to: &str) -> SwapError {
    SwapError::MissingPoolFee {
        network: cfg.network.clone(),
        pair: format!("{from}/{to}"),
    }
}

/// Whether the pair must route through the network's stable intermediate.
/// Pure policy data: exempt networks always go direct, and a pair touching
/// the intermediate itself never re-routes through it.
fn requires_intermediate(cfg: &EngineConfig, from: &Token, to: &Token) -> bool {
    !cfg.routing.always_direct
        && from.symbol != cfg.routing.intermediate
        && to.symbol != cfg.routing.intermediate
}

/// Build the packed swap path for a pair.
///
/// An explicit fee override wins when the pair has no configured direct
/// pool; otherwise the direct fee table decides, and pairs the routing
/// policy sends through the intermediate get a three-hop path with each
/// leg's fee looked up independently. Fails with `MissingPoolFee` (and no
/// partial bytes) when a required tier is absent.
pub fn encode_path(
    cfg: &EngineConfig,
    from: &Token,
    to: &Token,
    fee_override: Option<u32>,
) -> Result<Bytes, SwapError> {
    let from_addr = from.erc20(cfg.wrapped_native);
    let to_addr = to.erc20(cfg.wrapped_native);
    let direct_fee = cfg.pair_fee(&from.symbol, &to.symbol);

    if let Some(fee) = fee_override {
        if direct_fee.is_none() {
            return Ok(direct_path(from_addr, fee, to_addr));
        }
    }

    if let Some(fee) = direct_fee {
        return Ok(direct_path(from_addr, fee, to_addr));
    }

    if requires_intermediate(cfg, from, to) {
        let mid = cfg.routing.intermediate.as_str();
        let leg_in = cfg
            .pair_fee(&from.symbol, mid)
            .ok_or_else(|| missing_fee(cfg, &from.symbol, mid))?;
        let leg_out = cfg
            .pair_fee(mid, &to.symbol)
            .ok_or_else(|| missing_fee(cfg, mid, &to.symbol))?;
        let mid_addr = cfg.token(mid)?.erc20(cfg.wrapped_native);

        let mut buf = Vec::with_capacity(3 * ADDR_LEN + 2 * FEE_LEN);
        push_address(&mut buf, from_addr);
        push_fee(&mut buf, leg_in);
        push_address(&mut buf, mid_addr);
        push_fee(&mut buf, leg_out);
        push_address(&mut buf, to_addr);
        return Ok(buf.into());
    }

    Err(missing_fee(cfg, &from.symbol, &to.symbol))
}

/// Split a single-hop path back into its fixed-width fields.
/// Mainly a diagnostic; returns `None` when the length is not one hop.
pub fn decode_direct(path: &[u8]) -> Option<(Address, u32, Address)> {
    if path.len() != 2 * ADDR_LEN + FEE_LEN {
        return None;
    }
    let from = Address::from_slice(&path[..ADDR_LEN]);
    let fee = u32::from_be_bytes([0, path[20], path[21], path[22]]);
    let to = Address::from_slice(&path[ADDR_LEN + FEE_LEN..]);
    Some((from, fee, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    /// Minimal network with a WETH/USDT direct pool plus both intermediate
    /// legs through USDC.
    fn test_config() -> EngineConfig {
        let mut cfg = EngineConfig::base();
        cfg.tokens.insert(
            "USDT".to_string(),
            crate::config::TokenEntry {
                address: addr(0x77),
                decimals: 6,
            },
        );
        cfg.tokens.insert(
            "USDC".to_string(),
            crate::config::TokenEntry {
                address: addr(0xcc),
                decimals: 6,
            },
        );
        let mut fees = HashMap::new();
        fees.insert("ETH/USDC.e".to_string(), 500);
        fees.insert("USDT/USDC".to_string(), 500);
        fees.insert("USDC/ETH".to_string(), 3000);
        cfg.fee_tiers = fees;
        cfg
    }

    #[test]
    fn test_direct_path_length_and_roundtrip() {
        let cfg = test_config();
        let from = cfg.token("ETH").unwrap();
        let to = cfg.token("USDC.e").unwrap();

        let path = encode_path(&cfg, &from, &to, None).unwrap();
        assert_eq!(path.len(), 20 + 23); // one hop

        let (a, fee, b) = decode_direct(&path).unwrap();
        assert_eq!(a, cfg.wrapped_native);
        assert_eq!(fee, 500);
        assert_eq!(b, to.address.unwrap());
    }

    #[test]
    fn test_fee_bytes_are_big_endian() {
        let cfg = test_config();
        let from = cfg.token("USDC").unwrap();
        let to = cfg.token("ETH").unwrap();

        let path = encode_path(&cfg, &from, &to, None).unwrap();
        // 3000 = 0x000bb8
        assert_eq!(&path[20..23], &[0x00, 0x0b, 0xb8]);
    }

    #[test]
    fn test_intermediate_path_has_two_hops() {
        let cfg = test_config();
        let from = cfg.token("USDT").unwrap();
        let to = cfg.token("ETH").unwrap();

        let path = encode_path(&cfg, &from, &to, None).unwrap();
        assert_eq!(path.len(), 20 + 23 * 2); // two hops

        // from | fee | USDC | fee | wrapped-native
        assert_eq!(&path[..20], from.address.unwrap().as_bytes());
        assert_eq!(&path[23..43], addr(0xcc).as_bytes());
        assert_eq!(&path[46..66], cfg.wrapped_native.as_bytes());
    }

    #[test]
    fn test_fee_override_applies_to_unlisted_pair() {
        let cfg = test_config();
        let from = cfg.token("USDC.e").unwrap();
        let to = cfg.token("USDT").unwrap();

        let path = encode_path(&cfg, &from, &to, Some(10_000)).unwrap();
        let (_, fee, _) = decode_direct(&path).unwrap();
        assert_eq!(fee, 10_000);
    }

    #[test]
    fn test_configured_pair_ignores_override() {
        let cfg = test_config();
        let from = cfg.token("ETH").unwrap();
        let to = cfg.token("USDC.e").unwrap();

        let path = encode_path(&cfg, &from, &to, Some(10_000)).unwrap();
        let (_, fee, _) = decode_direct(&path).unwrap();
        assert_eq!(fee, 500);
    }

    #[test]
    fn test_missing_leg_fails_without_partial_bytes() {
        let mut cfg = test_config();
        // keep the inbound leg, drop the outbound one
        cfg.fee_tiers.remove("USDC/ETH");
        let from = cfg.token("USDT").unwrap();
        let to = cfg.token("ETH").unwrap();

        match encode_path(&cfg, &from, &to, None) {
            Err(SwapError::MissingPoolFee { pair, .. }) => assert_eq!(pair, "USDC/ETH"),
            other => panic!("expected MissingPoolFee, got {other:?}"),
        }
    }

    #[test]
    fn test_exempt_network_never_routes_through_intermediate() {
        let mut cfg = test_config();
        cfg.routing.always_direct = true;
        let from = cfg.token("USDT").unwrap();
        let to = cfg.token("ETH").unwrap();

        assert!(matches!(
            encode_path(&cfg, &from, &to, None),
            Err(SwapError::MissingPoolFee { .. })
        ));
    }
}
