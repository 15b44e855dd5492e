//! Multi-Venue Swap Router
//!
//! Quotes a trade across heterogeneous DEX venues, computes a
//! slippage-bounded minimum output, encodes venue-specific call data and
//! assembles an unsigned transaction request. Signing, gas estimation,
//! submission and retry wrapping are the caller's concern.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    SwapEngine                        │
//! │  resolve -> quote -> min-out -> guard -> approve     │
//! │          -> build -> assemble request                │
//! └────────────────────────┬────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                  Venue {quote, build}                │
//! └────────┬───────────────┬────────────────┬───────────┘
//!          │               │                │
//!          ▼               ▼                ▼
//! ┌──────────────┐ ┌───────────────┐ ┌──────────────┐
//! │  Aggregator  │ │ Concentrated  │ │  StablePool  │
//! │  (HTTP API)  │ │ AMM (path +   │ │ (getAmountOut│
//! │              │ │  quoter/router│ │  + 3 shapes) │
//! └──────────────┘ └───────────────┘ └──────────────┘
//! ```

pub mod builder;
pub mod config;
pub mod contracts;
pub mod engine;
pub mod error;
pub mod models;
pub mod path;
pub mod quote;
pub mod venue;

// Re-export commonly used types
pub use builder::{BuiltCalls, ROUTER_HOLD_RECIPIENT};
pub use config::{AffiliateConfig, AggregatorConfig, EngineConfig, RoutingPolicy, VenueContracts};
pub use engine::{
    ApprovalLogger, ApprovalManager, BalanceResolver, ManualAmounts, PriceImpactGuard, SwapEngine,
    UncheckedImpactGuard,
};
pub use error::SwapError;
pub use models::{
    min_amount_out, to_wei, AggregatorTx, ApprovalRequirement, Quote, RouteMeta, SwapRequest,
    Token, TransactionRequest,
};
pub use path::{decode_direct, encode_path};
pub use quote::{AggregatorApi, AmmQuoter, BestRoute, StableQuoter};
pub use venue::Venue;

/// Version of the swap router
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the package
pub const NAME: &str = env!("CARGO_PKG_NAME");
