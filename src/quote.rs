//! quote.rs - Quote providers for the swap venues
//!
//! Two strategies: the remote aggregator API (for venues spanning many
//! underlying pools) and direct on-chain read calls (for venues whose pool
//! topology the router knows). Both produce an expected output in wei plus
//! whatever route metadata the matching builder needs.

use ethers::providers::{Http, Provider};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::to_checksum;
use log::debug;
use reqwest::Client;
use rust_decimal::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::{AffiliateConfig, EngineConfig};
use crate::contracts::{IQuoter, IStableRouter};
use crate::error::SwapError;
use crate::models::{AggregatorTx, SwapRequest, Token};

// ============================================================================
// Remote aggregator strategy
// ============================================================================

/// Best route found by the aggregator: correlation id, number of venue
/// steps, and the expected output in wei.
#[derive(Debug, Clone)]
pub struct BestRoute {
    pub request_id: String,
    pub steps: usize,
    pub expected_out: U256,
}

/// HTTP client for the remote routing aggregator.
///
/// Every request carries a fresh UUID idempotency header; the API key rides
/// in the query string. Responses are classified by `result`/`error`
/// presence first, then by `diagnosisMessages`.
#[derive(Debug, Clone)]
pub struct AggregatorApi {
    client: Client,
    base_url: String,
    api_key: String,
    blockchain: String,
    slippage: Decimal,
    unlimited_approve: bool,
    affiliate: Option<AffiliateConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetRef<'a> {
    blockchain: &'a str,
    symbol: &'a str,
    /// `null` for the native asset.
    address: Option<String>,
}

impl<'a> AssetRef<'a> {
    fn new(blockchain: &'a str, token: &'a Token) -> Self {
        AssetRef {
            blockchain,
            symbol: &token.symbol,
            address: token.address.map(|a| to_checksum(&a, None)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectedWallet {
    blockchain: String,
    addresses: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteRequest<'a> {
    from: AssetRef<'a>,
    to: AssetRef<'a>,
    selected_wallets: HashMap<String, String>,
    connected_wallets: Vec<ConnectedWallet>,
    amount: f64,
    check_prerequisites: bool,
    slippage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    affiliate_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    affiliate_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    affiliate_wallets: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteResponse {
    result: Option<RouteResult>,
    request_id: Option<String>,
    #[serde(default)]
    diagnosis_messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteResult {
    /// Ordered venue steps; opaque here, only the count matters.
    #[serde(default)]
    swaps: Vec<serde_json::Value>,
    output_amount: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    slippage: f64,
    infinite_approve: bool,
}

#[derive(Debug, Serialize)]
struct Validations {
    balance: bool,
    fee: bool,
    approve: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTxRequest {
    user_settings: UserSettings,
    validations: Validations,
    request_id: String,
    step: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTxResponse {
    error: Option<serde_json::Value>,
    #[serde(default)]
    diagnosis_messages: Vec<String>,
    transaction: Option<RawTransaction>,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    to: Option<String>,
    data: Option<String>,
    value: Option<String>,
}

impl AggregatorApi {
    pub fn new(cfg: &EngineConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        AggregatorApi {
            client,
            base_url: cfg.aggregator.base_url.clone(),
            api_key: cfg.aggregator.api_key.clone(),
            blockchain: cfg.network.to_uppercase(),
            slippage: cfg.slippage,
            unlimited_approve: cfg.unlimited_approve,
            affiliate: cfg.affiliate.clone(),
        }
    }

    async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        route: &str,
        body: &T,
    ) -> Result<R, SwapError> {
        let url = format!("{}/{}", self.base_url, route);
        let response = self
            .client
            .post(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .header("content-type", "application/json;charset=UTF-8")
            .header("accept", "*/*")
            .header("x-request-id", Uuid::new_v4().to_string())
            .json(body)
            .send()
            .await?;
        Ok(response.json::<R>().await?)
    }

    /// Ask the aggregator for the best route across its venues.
    pub async fn best_route(&self, req: &SwapRequest) -> Result<BestRoute, SwapError> {
        let wallet = to_checksum(&req.recipient, None);
        let payload = RouteRequest {
            from: AssetRef::new(&self.blockchain, &req.from),
            to: AssetRef::new(&self.blockchain, &req.to),
            selected_wallets: HashMap::from([(self.blockchain.clone(), wallet.clone())]),
            connected_wallets: vec![ConnectedWallet {
                blockchain: self.blockchain.clone(),
                addresses: vec![wallet],
            }],
            amount: req.amount.to_f64().unwrap_or_default(),
            check_prerequisites: true,
            slippage: self.slippage.to_f64().unwrap_or_default(),
            affiliate_ref: self.affiliate.as_ref().map(|a| a.referrer.clone()),
            affiliate_percent: self
                .affiliate
                .as_ref()
                .map(|a| a.percent.to_f64().unwrap_or_default()),
            affiliate_wallets: self.affiliate.as_ref().map(|a| {
                a.wallets
                    .iter()
                    .map(|(chain, wallet)| (chain.clone(), to_checksum(wallet, None)))
                    .collect()
            }),
        };

        let response: RouteResponse = self.post("routing/best", &payload).await?;

        let (result, request_id) = match (response.result, response.request_id) {
            (Some(result), Some(request_id)) => (result, request_id),
            _ => {
                return Err(match response.diagnosis_messages.into_iter().next() {
                    Some(message) => SwapError::RemoteQuote(message),
                    None => SwapError::NoRoute {
                        amount: req.amount,
                        from: req.from.symbol.clone(),
                        to: req.to.symbol.clone(),
                    },
                });
            }
        };

        let raw_out = result
            .output_amount
            .ok_or_else(|| SwapError::Malformed("route result has no outputAmount".to_string()))?;
        let expected_out = U256::from_dec_str(&raw_out)
            .map_err(|_| SwapError::Malformed(format!("bad outputAmount {raw_out}")))?;

        debug!(
            "aggregator route {}: {} steps, expected out {} wei",
            request_id,
            result.swaps.len(),
            expected_out
        );

        Ok(BestRoute {
            request_id,
            steps: result.swaps.len(),
            expected_out,
        })
    }

    /// Fetch the executable transaction for a previously quoted route.
    pub async fn create_transaction(
        &self,
        request_id: &str,
        step: usize,
    ) -> Result<AggregatorTx, SwapError> {
        let payload = CreateTxRequest {
            user_settings: UserSettings {
                slippage: self.slippage.to_f64().unwrap_or_default(),
                infinite_approve: self.unlimited_approve,
            },
            validations: Validations {
                balance: true,
                fee: true,
                approve: false,
            },
            request_id: request_id.to_string(),
            step,
        };

        let response: CreateTxResponse = self.post("tx/create", &payload).await?;

        if let Some(error) = response.error.filter(|e| !e.is_null()) {
            return Err(SwapError::RemoteQuote(
                response
                    .diagnosis_messages
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| error.to_string()),
            ));
        }

        let tx = response
            .transaction
            .ok_or_else(|| SwapError::Malformed("tx response has no transaction".to_string()))?;
        Ok(AggregatorTx {
            to: tx
                .to
                .ok_or_else(|| SwapError::Malformed("transaction has no target".to_string()))?,
            data: tx.data.unwrap_or_else(|| "0x".to_string()),
            value: tx.value,
        })
    }
}

// ============================================================================
// On-chain read strategies
// ============================================================================

/// Read-only quoter for the concentrated-liquidity venue.
#[derive(Debug, Clone)]
pub struct AmmQuoter {
    quoter: IQuoter<Provider<Http>>,
}

impl AmmQuoter {
    pub fn new(address: Address, provider: Arc<Provider<Http>>) -> Self {
        AmmQuoter {
            quoter: IQuoter::new(address, provider),
        }
    }

    /// `quoteExactInput(path, amountIn)` via eth_call; only the output
    /// amount is kept.
    pub async fn amount_out(&self, path: Bytes, amount_in: U256) -> Result<U256, SwapError> {
        let (amount_out, _, _, _) = self
            .quoter
            .quote_exact_input(path, amount_in)
            .call()
            .await
            .map_err(|e| SwapError::Rpc(e.to_string()))?;
        Ok(amount_out)
    }
}

/// Read-only quoter for the stable-pool venue; the router's own
/// `getAmountOut` also discriminates stable vs. volatile pools.
#[derive(Debug, Clone)]
pub struct StableQuoter {
    router: IStableRouter<Provider<Http>>,
}

impl StableQuoter {
    pub fn new(address: Address, provider: Arc<Provider<Http>>) -> Self {
        StableQuoter {
            router: IStableRouter::new(address, provider),
        }
    }

    pub async fn amount_out(
        &self,
        amount_in: U256,
        token_in: Address,
        token_out: Address,
    ) -> Result<(U256, bool), SwapError> {
        self.router
            .get_amount_out(amount_in, token_in, token_out)
            .call()
            .await
            .map_err(|e| SwapError::Rpc(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    fn request(cfg: &EngineConfig, from: &str, to: &str) -> SwapRequest {
        SwapRequest {
            from: cfg.token(from).unwrap(),
            to: cfg.token(to).unwrap(),
            amount: dec!(1.5),
            amount_in_wei: U256::from_dec_str("1500000000000000000").unwrap(),
            recipient: Address::from_low_u64_be(0xbeef),
        }
    }

    fn api_against(server_url: &str) -> (EngineConfig, AggregatorApi) {
        let mut cfg = EngineConfig::base();
        cfg.aggregator.base_url = server_url.to_string();
        cfg.aggregator.api_key = "test-key".to_string();
        let api = AggregatorApi::new(&cfg);
        (cfg, api)
    }

    #[tokio::test]
    async fn test_best_route_happy_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/routing/best")
            .match_query(Matcher::UrlEncoded("apiKey".into(), "test-key".into()))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"result":{"swaps":[{"venue":"a"},{"venue":"b"}],"outputAmount":"2500000000"},"requestId":"req-1"}"#,
            )
            .create_async()
            .await;

        let (cfg, api) = api_against(&server.url());
        let route = api.best_route(&request(&cfg, "ETH", "USDC.e")).await.unwrap();

        assert_eq!(route.request_id, "req-1");
        assert_eq!(route.steps, 2);
        assert_eq!(route.expected_out, U256::from(2_500_000_000u64));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_best_route_surfaces_first_diagnostic() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/routing/best")
            .match_query(Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(r#"{"diagnosisMessages":["insufficient liquidity","second"]}"#)
            .create_async()
            .await;

        let (cfg, api) = api_against(&server.url());
        let err = api
            .best_route(&request(&cfg, "ETH", "USDC.e"))
            .await
            .unwrap_err();

        assert!(matches!(err, SwapError::RemoteQuote(m) if m == "insufficient liquidity"));
    }

    #[tokio::test]
    async fn test_best_route_without_diagnostics_is_no_route() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/routing/best")
            .match_query(Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(r#"{}"#)
            .create_async()
            .await;

        let (cfg, api) = api_against(&server.url());
        let err = api
            .best_route(&request(&cfg, "ETH", "USDC.e"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "no route found for swap 1.5 ETH -> USDC.e"
        );
    }

    #[tokio::test]
    async fn test_create_transaction_happy_path() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/tx/create")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "requestId": "req-1",
                "step": 2,
                "validations": {"balance": true, "fee": true, "approve": false}
            })))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error":null,"transaction":{"to":"0x2626664c2603336E57B271c5C0b26F421741e481","data":"0xdeadbeef","value":"0x0"}}"#,
            )
            .create_async()
            .await;

        let (_, api) = api_against(&server.url());
        let tx = api.create_transaction("req-1", 2).await.unwrap();

        assert_eq!(tx.to, "0x2626664c2603336E57B271c5C0b26F421741e481");
        assert_eq!(tx.data, "0xdeadbeef");
    }

    #[tokio::test]
    async fn test_create_transaction_error_uses_diagnostics() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/tx/create")
            .match_query(Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"failed","diagnosisMessages":["route expired"]}"#)
            .create_async()
            .await;

        let (_, api) = api_against(&server.url());
        let err = api.create_transaction("req-1", 1).await.unwrap_err();

        assert!(matches!(err, SwapError::RemoteQuote(m) if m == "route expired"));
    }
}
