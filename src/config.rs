//! config.rs - Per-network registry and routing policy
//!
//! Token addresses, venue contracts, the pool-fee-tier table and the
//! intermediate-routing policy, all loaded once at startup and treated as
//! read-only afterwards. Presets cover the networks the router ships with;
//! the structs derive serde so deployments can load the same shape from a
//! file instead.

use ethers::types::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SwapError;
use crate::models::Token;

/// Registry entry for one ERC-20 token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEntry {
    pub address: Address,
    pub decimals: u8,
}

/// Per-network routing policy for the concentrated-liquidity path encoder.
///
/// The intermediate-hop rule is deliberately data, not logic: which pairs
/// must route through the stable intermediate is a product decision that
/// differs per network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingPolicy {
    /// Stable intermediate the three-hop path routes through (e.g. "USDC").
    pub intermediate: String,
    /// When set, this network never routes through the intermediate.
    pub always_direct: bool,
}

/// Venue contract addresses. A venue whose addresses are absent cannot be
/// constructed on this network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueContracts {
    pub amm_router: Option<Address>,
    pub amm_quoter: Option<Address>,
    pub stable_router: Option<Address>,
}

/// Remote aggregator endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Optional affiliate/referral tag attached to aggregator quote requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliateConfig {
    pub referrer: String,
    pub percent: Decimal,
    /// Payout wallet per blockchain identifier.
    pub wallets: HashMap<String, Address>,
}

/// Full engine configuration for one network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub network: String,
    pub chain_id: u64,
    /// Symbol of the chain's gas currency; tokens with this symbol resolve
    /// to the native asset (no contract address).
    pub native_symbol: String,
    /// Wrapping token standing in for the native asset inside paths.
    pub wrapped_native: Address,
    /// Tolerated deviation between quoted and executed output, in percent.
    pub slippage: Decimal,
    /// Request unlimited allowances instead of per-swap amounts.
    pub unlimited_approve: bool,
    pub rpc_url: String,
    pub tokens: HashMap<String, TokenEntry>,
    /// Pool fee tiers keyed by "FROM/TO" pair id.
    pub fee_tiers: HashMap<String, u32>,
    pub routing: RoutingPolicy,
    pub contracts: VenueContracts,
    pub aggregator: AggregatorConfig,
    pub affiliate: Option<AffiliateConfig>,
}

const AGGREGATOR_URL: &str = "https://api.rango.exchange";

fn addr(s: &str) -> Address {
    s.parse().expect("static address in network preset")
}

impl EngineConfig {
    /// Base mainnet preset: concentrated AMM + aggregator.
    pub fn base() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert(
            "WETH".to_string(),
            TokenEntry {
                address: addr("0x4200000000000000000000000000000000000006"),
                decimals: 18,
            },
        );
        tokens.insert(
            "USDC.e".to_string(),
            TokenEntry {
                address: addr("0xd9aAEc86B65D86f6A7B5B1b0c42FFA531710b6CA"),
                decimals: 6,
            },
        );
        tokens.insert(
            "USDC".to_string(),
            TokenEntry {
                address: addr("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
                decimals: 6,
            },
        );

        let mut fee_tiers = HashMap::new();
        fee_tiers.insert("USDC.e/ETH".to_string(), 500);
        fee_tiers.insert("ETH/USDC.e".to_string(), 500);

        EngineConfig {
            network: "Base".to_string(),
            chain_id: 8453,
            native_symbol: "ETH".to_string(),
            wrapped_native: addr("0x4200000000000000000000000000000000000006"),
            slippage: Decimal::new(5, 1),
            unlimited_approve: false,
            rpc_url: "https://mainnet.base.org".to_string(),
            tokens,
            fee_tiers,
            routing: RoutingPolicy {
                intermediate: "USDC".to_string(),
                always_direct: false,
            },
            contracts: VenueContracts {
                amm_router: Some(addr("0x2626664c2603336E57B271c5C0b26F421741e481")),
                amm_quoter: Some(addr("0x3d4e44Eb1374240CE5F1B871ab261CD16335B76a")),
                stable_router: None,
            },
            aggregator: AggregatorConfig {
                base_url: AGGREGATOR_URL.to_string(),
                api_key: String::new(),
            },
            affiliate: None,
        }
    }

    /// Polygon mainnet preset: concentrated AMM + aggregator; the direct
    /// fee table is rich enough that intermediate routing stays off.
    pub fn polygon() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert(
            "WMATIC".to_string(),
            TokenEntry {
                address: addr("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
                decimals: 18,
            },
        );
        tokens.insert(
            "WETH".to_string(),
            TokenEntry {
                address: addr("0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619"),
                decimals: 18,
            },
        );
        tokens.insert(
            "USDT".to_string(),
            TokenEntry {
                address: addr("0xc2132D05D31c914a87C6611C10748AEb04B58e8F"),
                decimals: 6,
            },
        );
        tokens.insert(
            "USDC.e".to_string(),
            TokenEntry {
                address: addr("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
                decimals: 6,
            },
        );
        tokens.insert(
            "USDC".to_string(),
            TokenEntry {
                address: addr("0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359"),
                decimals: 6,
            },
        );

        let mut fee_tiers = HashMap::new();
        for pair in [
            "USDT/MATIC",
            "MATIC/USDT",
            "USDC.e/MATIC",
            "MATIC/USDC.e",
            "USDC/MATIC",
            "MATIC/USDC",
            "MATIC/WETH",
            "WETH/MATIC",
            "USDC/USDC.e",
            "USDC.e/USDC",
        ] {
            fee_tiers.insert(pair.to_string(), 500);
        }

        EngineConfig {
            network: "Polygon".to_string(),
            chain_id: 137,
            native_symbol: "MATIC".to_string(),
            wrapped_native: addr("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
            slippage: Decimal::new(5, 1),
            unlimited_approve: false,
            rpc_url: "https://polygon-rpc.com".to_string(),
            tokens,
            fee_tiers,
            routing: RoutingPolicy {
                intermediate: "USDC".to_string(),
                always_direct: true,
            },
            contracts: VenueContracts {
                amm_router: Some(addr("0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45")),
                amm_quoter: Some(addr("0x61fFE014bA17989E743c5F6cB21bF9697530B21e")),
                stable_router: None,
            },
            aggregator: AggregatorConfig {
                base_url: AGGREGATOR_URL.to_string(),
                api_key: String::new(),
            },
            affiliate: None,
        }
    }

    /// zkSync Era preset: stable-pool venue + aggregator.
    pub fn zksync() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert(
            "WETH".to_string(),
            TokenEntry {
                address: addr("0x5AEa5775959fBC2557Cc8789bC1bf90A239D9a91"),
                decimals: 18,
            },
        );
        tokens.insert(
            "USDC".to_string(),
            TokenEntry {
                address: addr("0x3355df6D4c9C3035724Fd0e3914dE96A5a83aaf4"),
                decimals: 6,
            },
        );
        tokens.insert(
            "USDT".to_string(),
            TokenEntry {
                address: addr("0x493257fD37EDB34451f62EDf8D2a0C418852bA4C"),
                decimals: 6,
            },
        );

        EngineConfig {
            network: "zkSync".to_string(),
            chain_id: 324,
            native_symbol: "ETH".to_string(),
            wrapped_native: addr("0x5AEa5775959fBC2557Cc8789bC1bf90A239D9a91"),
            slippage: Decimal::new(5, 1),
            unlimited_approve: false,
            rpc_url: "https://mainnet.era.zksync.io".to_string(),
            tokens,
            fee_tiers: HashMap::new(),
            routing: RoutingPolicy {
                intermediate: "USDC".to_string(),
                always_direct: true,
            },
            contracts: VenueContracts {
                amm_router: None,
                amm_quoter: None,
                stable_router: Some(addr("0x6C31035D62541ceba2Ac587ea09891d1645D6D07")),
            },
            aggregator: AggregatorConfig {
                base_url: AGGREGATOR_URL.to_string(),
                api_key: String::new(),
            },
            affiliate: None,
        }
    }

    pub fn for_network(name: &str) -> Option<Self> {
        match name {
            "Base" => Some(Self::base()),
            "Polygon" => Some(Self::polygon()),
            "zkSync" => Some(Self::zksync()),
            _ => None,
        }
    }

    /// Resolve a token symbol. The network's native symbol resolves to the
    /// native asset; everything else must be listed in the registry.
    pub fn token(&self, symbol: &str) -> Result<Token, SwapError> {
        if symbol == self.native_symbol {
            return Ok(Token::native(symbol));
        }
        self.tokens
            .get(symbol)
            .map(|entry| Token {
                symbol: symbol.to_string(),
                address: Some(entry.address),
                decimals: entry.decimals,
            })
            .ok_or_else(|| SwapError::UnknownToken(symbol.to_string(), self.network.clone()))
    }

    /// Fee tier for a direct pair, if one is configured.
    pub fn pair_fee(&self, from: &str, to: &str) -> Option<u32> {
        self.fee_tiers.get(&format!("{from}/{to}")).copied()
    }
}
