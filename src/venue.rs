//! venue.rs - Liquidity venues behind a single {quote, build} interface
//!
//! Adding a venue means adding a variant plus its two methods; the
//! orchestrator never changes. Venues are selected per swap invocation and
//! never persisted.

use ethers::providers::{Http, Provider};
use ethers::types::{Address, U256};
use std::sync::Arc;

use crate::builder::{build_amm_swap, build_stable_swap, forward_aggregator_tx, BuiltCalls};
use crate::config::EngineConfig;
use crate::error::SwapError;
use crate::models::{Quote, RouteMeta, SwapRequest};
use crate::path::encode_path;
use crate::quote::{AggregatorApi, AmmQuoter, StableQuoter};

/// Remote aggregator venue: quoting and route building both happen against
/// the aggregator API, which also hands back the executable transaction.
pub struct AggregatorVenue {
    api: AggregatorApi,
}

/// Concentrated-liquidity venue: packed-path quoting against the on-chain
/// quoter, `exactInput` batches against the router.
pub struct AmmVenue {
    cfg: Arc<EngineConfig>,
    router: Address,
    quoter: AmmQuoter,
    /// Optional explicit fee tier for pairs outside the direct-pool table.
    pool_fee: Option<u32>,
}

/// Stable/volatile pool venue quoted through the router's own read call.
pub struct StableVenue {
    cfg: Arc<EngineConfig>,
    router: Address,
    quoter: StableQuoter,
}

/// A liquidity source able to quote a swap and build its transaction data.
pub enum Venue {
    Aggregator(AggregatorVenue),
    ConcentratedAmm(AmmVenue),
    StablePool(StableVenue),
}

impl Venue {
    pub fn aggregator(cfg: &EngineConfig) -> Venue {
        Venue::Aggregator(AggregatorVenue {
            api: AggregatorApi::new(cfg),
        })
    }

    pub fn concentrated_amm(
        cfg: Arc<EngineConfig>,
        provider: Arc<Provider<Http>>,
        pool_fee: Option<u32>,
    ) -> Result<Venue, SwapError> {
        let not_configured = || SwapError::VenueNotConfigured {
            venue: "ConcentratedAMM",
            network: cfg.network.clone(),
        };
        let router = cfg.contracts.amm_router.ok_or_else(not_configured)?;
        let quoter = cfg.contracts.amm_quoter.ok_or_else(not_configured)?;
        Ok(Venue::ConcentratedAmm(AmmVenue {
            router,
            quoter: AmmQuoter::new(quoter, provider),
            pool_fee,
            cfg,
        }))
    }

    pub fn stable_pool(
        cfg: Arc<EngineConfig>,
        provider: Arc<Provider<Http>>,
    ) -> Result<Venue, SwapError> {
        let router = cfg
            .contracts
            .stable_router
            .ok_or_else(|| SwapError::VenueNotConfigured {
                venue: "StablePool",
                network: cfg.network.clone(),
            })?;
        Ok(Venue::StablePool(StableVenue {
            router,
            quoter: StableQuoter::new(router, provider),
            cfg,
        }))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Venue::Aggregator(_) => "Aggregator",
            Venue::ConcentratedAmm(_) => "ConcentratedAMM",
            Venue::StablePool(_) => "StablePool",
        }
    }

    /// Obtain the expected output and route metadata for a request.
    pub async fn quote(&self, req: &SwapRequest) -> Result<Quote, SwapError> {
        match self {
            Venue::Aggregator(venue) => {
                let route = venue.api.best_route(req).await?;
                let tx = venue
                    .api
                    .create_transaction(&route.request_id, route.steps)
                    .await?;
                Ok(Quote {
                    expected_out: route.expected_out,
                    route: RouteMeta::Aggregator {
                        request_id: route.request_id,
                        steps: route.steps,
                        tx,
                    },
                })
            }
            Venue::ConcentratedAmm(venue) => {
                let path = encode_path(&venue.cfg, &req.from, &req.to, venue.pool_fee)?;
                let expected_out = venue
                    .quoter
                    .amount_out(path.clone(), req.amount_in_wei)
                    .await?;
                Ok(Quote {
                    expected_out,
                    route: RouteMeta::Path(path),
                })
            }
            Venue::StablePool(venue) => {
                let token_in = req.from.erc20(venue.cfg.wrapped_native);
                let token_out = req.to.erc20(venue.cfg.wrapped_native);
                let (expected_out, stable) = venue
                    .quoter
                    .amount_out(req.amount_in_wei, token_in, token_out)
                    .await?;
                if expected_out.is_zero() {
                    return Err(SwapError::NoRoute {
                        amount: req.amount,
                        from: req.from.symbol.clone(),
                        to: req.to.symbol.clone(),
                    });
                }
                Ok(Quote {
                    expected_out,
                    route: RouteMeta::StablePool { stable },
                })
            }
        }
    }

    /// Contract that must hold an allowance before this swap executes.
    pub fn spender(&self, quote: &Quote) -> Result<Address, SwapError> {
        match (self, &quote.route) {
            (Venue::Aggregator(_), RouteMeta::Aggregator { tx, .. }) => tx
                .to
                .parse()
                .map_err(|_| SwapError::Malformed(format!("bad transaction target {}", tx.to))),
            (Venue::ConcentratedAmm(venue), _) => Ok(venue.router),
            (Venue::StablePool(venue), _) => Ok(venue.router),
            (Venue::Aggregator(_), _) => Err(SwapError::Malformed(
                "aggregator venue given a non-aggregator quote".to_string(),
            )),
        }
    }

    /// Assemble the venue's call payload for an already-validated quote.
    pub async fn build(
        &self,
        req: &SwapRequest,
        quote: &Quote,
        min_amount_out: U256,
    ) -> Result<BuiltCalls, SwapError> {
        match (self, &quote.route) {
            (Venue::Aggregator(_), RouteMeta::Aggregator { tx, .. }) => forward_aggregator_tx(tx),
            (Venue::ConcentratedAmm(venue), RouteMeta::Path(path)) => Ok(build_amm_swap(
                req,
                path.clone(),
                min_amount_out,
                venue.router,
            )),
            (Venue::StablePool(venue), RouteMeta::StablePool { stable }) => Ok(build_stable_swap(
                req,
                *stable,
                min_amount_out,
                venue.router,
                venue.cfg.wrapped_native,
            )),
            _ => Err(SwapError::Malformed(
                "route metadata does not match venue".to_string(),
            )),
        }
    }
}
