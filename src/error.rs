//! error.rs - Error taxonomy for the swap router
//!
//! Every route-level failure carries the token pair and amount so an
//! external logger can render a single actionable line.

use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use thiserror::Error;

/// Failures surfaced by quoting, path encoding, building and orchestration.
///
/// The core performs no local recovery and no fallback between venues: each
/// swap invocation targets exactly one venue and the first failure is
/// terminal for that invocation.
#[derive(Debug, Error)]
pub enum SwapError {
    /// No venue route services this pair/amount.
    #[error("no route found for swap {amount} {from} -> {to}")]
    NoRoute {
        amount: Decimal,
        from: String,
        to: String,
    },

    /// The aggregator reported a diagnostic; the first message is carried
    /// verbatim.
    #[error("aggregator: {0}")]
    RemoteQuote(String),

    /// The path encoder has no fee tier for a required pool.
    #[error("no pool fee tier configured for {pair} on {network}")]
    MissingPoolFee { network: String, pair: String },

    /// The registry does not list this token symbol on this network.
    #[error("token {0} is not listed on {1}")]
    UnknownToken(String, String),

    /// The network config is missing the contracts this venue needs.
    #[error("venue {venue} is not configured on {network}")]
    VenueNotConfigured {
        venue: &'static str,
        network: String,
    },

    /// Amount is negative, non-representable in wei, or otherwise unusable.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The approval collaborator declined to put the allowance in place.
    #[error("approval required: spender {spender:?}, token {token:?}, amount {amount}")]
    ApprovalRequired {
        spender: Address,
        token: Address,
        amount: U256,
    },

    /// The price-impact guard aborted the swap.
    #[error("price impact guard rejected swap {amount} {from} -> {to}")]
    ImpactRejected {
        amount: Decimal,
        from: String,
        to: String,
    },

    /// Network failure talking to the quote service, propagated unchanged.
    #[error("quote transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Node RPC or contract read failure.
    #[error("rpc call failed: {0}")]
    Rpc(String),

    /// A venue payload did not have the shape the builder expects.
    #[error("malformed venue payload: {0}")]
    Malformed(String),
}
