//! main.rs - Dry-run entry point for the swap router
//!
//! Assembles an unsigned swap transaction from environment settings and
//! prints it. Nothing is signed or broadcast; wire the printed request into
//! your signer of choice.

use ethers::providers::{Http, Provider};
use ethers::types::Address;
use log::info;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

use swap_router::{
    ApprovalLogger, EngineConfig, ManualAmounts, SwapEngine, UncheckedImpactGuard, Venue, NAME,
    VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║     🔀 Multi-Venue Swap Router v{}                      ║", VERSION);
    println!("║     Dry run: assemble only, never sign                   ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    info!("Starting {} v{}", NAME, VERSION);

    let network = env::var("NETWORK").unwrap_or_else(|_| "Base".to_string());
    let mut config = EngineConfig::for_network(&network)
        .ok_or_else(|| anyhow::anyhow!("unknown network preset: {network}"))?;
    if let Ok(key) = env::var("AGGREGATOR_API_KEY") {
        config.aggregator.api_key = key;
    }
    if let Ok(url) = env::var("RPC_URL") {
        config.rpc_url = url;
    }

    let account: Address = env::var("ACCOUNT")
        .map_err(|_| anyhow::anyhow!("ACCOUNT env var is required"))?
        .parse()
        .map_err(|_| anyhow::anyhow!("ACCOUNT is not a valid address"))?;

    let from = env::var("FROM_TOKEN").unwrap_or_else(|_| config.native_symbol.clone());
    let to = env::var("TO_TOKEN").unwrap_or_else(|_| "USDC".to_string());
    let amount = match env::var("AMOUNT") {
        Ok(raw) => Some(
            Decimal::from_str(&raw).map_err(|_| anyhow::anyhow!("AMOUNT is not a number"))?,
        ),
        Err(_) => None,
    };

    let config = Arc::new(config);
    let venue_kind = env::var("VENUE").unwrap_or_else(|_| "aggregator".to_string());
    let venue = match venue_kind.as_str() {
        "aggregator" => Venue::aggregator(&config),
        "amm" => {
            let provider = Arc::new(Provider::<Http>::try_from(config.rpc_url.as_str())?);
            let pool_fee = env::var("POOL_FEE").ok().and_then(|f| f.parse().ok());
            Venue::concentrated_amm(config.clone(), provider, pool_fee)?
        }
        "stable" => {
            let provider = Arc::new(Provider::<Http>::try_from(config.rpc_url.as_str())?);
            Venue::stable_pool(config.clone(), provider)?
        }
        other => anyhow::bail!("unknown venue: {other} (use aggregator | amm | stable)"),
    };

    info!(
        "Network: {} (chain {}), venue: {}",
        config.network,
        config.chain_id,
        venue.name()
    );

    let engine = SwapEngine::new(
        config,
        account,
        Arc::new(ManualAmounts),
        Arc::new(ApprovalLogger),
        Arc::new(UncheckedImpactGuard),
    );

    let request = engine.swap(&venue, &from, &to, amount).await?;

    info!("✓ Transaction assembled");
    println!("{}", serde_json::to_string_pretty(&request)?);
    println!();
    println!("Hand this request to your signer; value is in wei.");

    Ok(())
}
