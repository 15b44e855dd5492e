//! engine.rs - Swap orchestrator
//!
//! Drives one swap invocation through a strict pipeline:
//! resolve tokens -> quote -> minimum output -> impact guard -> approval ->
//! build -> assemble. No step is skipped, no state survives a failed step,
//! and every network call is free of side effects if it never returns, so a
//! failed invocation is safe to retry from the outside.

use async_trait::async_trait;
use ethers::types::{Address, U256};
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::SwapError;
use crate::models::{
    min_amount_out, to_wei, ApprovalRequirement, SwapRequest, Token, TransactionRequest,
};
use crate::venue::Venue;

// ============================================================================
// Collaborator seams
// ============================================================================

/// Resolves "swap everything sensible" requests into a concrete amount.
/// Lives outside the core: it needs balances and per-account policy.
#[async_trait]
pub trait BalanceResolver: Send + Sync {
    /// Returns the human-unit amount and its wei representation.
    async fn auto_amount(&self, token: &Token) -> Result<(Decimal, U256), SwapError>;
}

/// Puts the required allowance in place before an ERC-20 swap. The approval
/// transaction itself is external; repeating it is harmless.
#[async_trait]
pub trait ApprovalManager: Send + Sync {
    async fn ensure_approved(&self, requirement: &ApprovalRequirement) -> Result<(), SwapError>;
}

/// May abort a swap whose minimum output implies unacceptable impact.
#[async_trait]
pub trait PriceImpactGuard: Send + Sync {
    async fn check(
        &self,
        from: &Token,
        amount: Decimal,
        to: &Token,
        min_amount_out: U256,
    ) -> Result<(), SwapError>;
}

/// Balance resolver for wirings where auto amounts are not available.
pub struct ManualAmounts;

#[async_trait]
impl BalanceResolver for ManualAmounts {
    async fn auto_amount(&self, token: &Token) -> Result<(Decimal, U256), SwapError> {
        Err(SwapError::InvalidAmount(format!(
            "auto amount for {token} requires a balance collaborator"
        )))
    }
}

/// Surfaces approval requirements to the log and reports success; the
/// actual allowance transaction is someone else's job.
pub struct ApprovalLogger;

#[async_trait]
impl ApprovalManager for ApprovalLogger {
    async fn ensure_approved(&self, requirement: &ApprovalRequirement) -> Result<(), SwapError> {
        info!(
            "approval required: spender {:?}, token {:?}, amount {}",
            requirement.spender, requirement.token, requirement.amount
        );
        Ok(())
    }
}

/// Guard that logs the floor and lets every swap through.
pub struct UncheckedImpactGuard;

#[async_trait]
impl PriceImpactGuard for UncheckedImpactGuard {
    async fn check(
        &self,
        from: &Token,
        amount: Decimal,
        to: &Token,
        min_amount_out: U256,
    ) -> Result<(), SwapError> {
        debug!("impact unchecked: {amount} {from} -> {to}, floor {min_amount_out} wei");
        Ok(())
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Top-level entry point: coordinates quoting, slippage, approvals and call
/// assembly, and returns an unsigned transaction request. Signing, gas and
/// retry wrapping stay with the caller.
pub struct SwapEngine {
    config: Arc<EngineConfig>,
    account: Address,
    balances: Arc<dyn BalanceResolver>,
    approvals: Arc<dyn ApprovalManager>,
    impact_guard: Arc<dyn PriceImpactGuard>,
}

impl SwapEngine {
    pub fn new(
        config: Arc<EngineConfig>,
        account: Address,
        balances: Arc<dyn BalanceResolver>,
        approvals: Arc<dyn ApprovalManager>,
        impact_guard: Arc<dyn PriceImpactGuard>,
    ) -> Self {
        SwapEngine {
            config,
            account,
            balances,
            approvals,
            impact_guard,
        }
    }

    /// Assemble an unsigned swap transaction on the given venue.
    ///
    /// `amount == None` delegates sizing to the balance collaborator. The
    /// transaction value is the input amount exactly when the source token
    /// is the native asset.
    pub async fn swap(
        &self,
        venue: &Venue,
        from_symbol: &str,
        to_symbol: &str,
        amount: Option<Decimal>,
    ) -> Result<TransactionRequest, SwapError> {
        let from = self.config.token(from_symbol)?;
        let to = self.config.token(to_symbol)?;

        let (amount, amount_in_wei) = match amount {
            Some(amount) => (amount, to_wei(amount, from.decimals)?),
            None => self.balances.auto_amount(&from).await?,
        };

        info!(
            "Swap on {}: {} {} -> {}",
            venue.name(),
            amount,
            from.symbol,
            to.symbol
        );

        let req = SwapRequest {
            from,
            to,
            amount,
            amount_in_wei,
            recipient: self.account,
        };

        let quote = venue.quote(&req).await?;
        let min_out = min_amount_out(quote.expected_out, self.config.slippage);
        debug!(
            "expected out {} wei, floor {} wei at {}% slippage",
            quote.expected_out, min_out, self.config.slippage
        );

        if !req.from.is_native() {
            self.impact_guard
                .check(&req.from, req.amount, &req.to, min_out)
                .await?;

            let requirement = ApprovalRequirement {
                spender: venue.spender(&quote)?,
                token: req.from.erc20(self.config.wrapped_native),
                amount: if self.config.unlimited_approve {
                    U256::MAX
                } else {
                    req.amount_in_wei
                },
            };
            self.approvals.ensure_approved(&requirement).await?;
        }

        let built = venue.build(&req, &quote, min_out).await?;
        let value = if req.from.is_native() {
            req.amount_in_wei
        } else {
            U256::zero()
        };

        Ok(TransactionRequest {
            to: built.to,
            value,
            data: built.data,
            deadline: built.deadline,
        })
    }
}
