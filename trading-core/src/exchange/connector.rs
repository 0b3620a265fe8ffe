// ====
// USDT-M Futures REST Connector
// ====
// Public market data + HMAC-signed order and account endpoints
// No third-party exchange SDK
// ====

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::errors::ExchangeError;
use super::signer::{RequestSigner, API_KEY_HEADER};
use super::traits::FuturesApi;
use super::types::{AccountInfo, AccountTrade, AssetBalance, PositionRisk};
use super::utils::{format_decimal, parse_optional_price, parse_or_zero, parse_price, parse_size};
use crate::config::Api;
use trading_common::data::{
    Instrument, OrderRecord, OrderRequest, OrderStatus, OrderType, Side, SymbolFilters,
};

/// Futures connector
///
/// Public endpoints work without credentials, so dry runs can validate
/// against real trading rules with an empty key pair.
pub struct BinanceFuturesConnector {
    /// HTTP client
    client: Client,
    /// Signer, absent when no key pair is configured
    signer: Option<RequestSigner>,
    /// API base URL
    base_url: String,
    /// Validity window for signed requests
    recv_window_ms: u64,
}

impl BinanceFuturesConnector {
    /// Create new connector
    ///
    /// Example:
    /// ```ignore
    /// let settings = Settings::new()?;
    /// let connector = BinanceFuturesConnector::new(&settings.api)?;
    /// ```
    pub fn new(api: &Api) -> Result<Self, ExchangeError> {
        let signer = if api.has_credentials() {
            Some(RequestSigner::new(&api.key, &api.secret)?)
        } else {
            None
        };

        Self::with_base_url(api.base_url(), signer, api.recv_window_ms, api.timeout_secs)
    }

    pub fn with_base_url(
        base_url: &str,
        signer: Option<RequestSigner>,
        recv_window_ms: u64,
        timeout_secs: u64,
    ) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            signer,
            base_url: base_url.trim_end_matches('/').to_string(),
            recv_window_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.signer.is_some()
    }

    // ====================================================================
    // INTERNAL
    // ====================================================================

    /// Unsigned GET
    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExchangeError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(path, "public request");

        let response = self.client.get(&url).query(params).send().await?;
        Self::read_response(response).await
    }

    /// Appends timestamp, recvWindow and signature, then sends
    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: Vec<(&str, String)>,
    ) -> Result<T, ExchangeError> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            ExchangeError::MissingCredentials(format!("{} requires an API key pair", path))
        })?;

        let query = build_signed_query(
            &params,
            chrono::Utc::now().timestamp_millis(),
            self.recv_window_ms,
        );
        let signature = signer.sign(&query)?;
        let url = format!("{}{}?{}&signature={}", self.base_url, path, query, signature);
        debug!(path, method = %method, "signed request");

        let response = self
            .client
            .request(method, &url)
            .header(API_KEY_HEADER, signer.api_key())
            .send()
            .await?;

        Self::read_response(response).await
    }

    /// Non-2xx bodies are mapped to `ApiError` when they carry `{code, msg}`
    async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, ExchangeError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(err) => ExchangeError::ApiError {
                    code: err.code,
                    msg: err.msg,
                },
                Err(_) => ExchangeError::NetworkError(format!("HTTP {}: {}", status, body)),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl FuturesApi for BinanceFuturesConnector {
    // ====================================================================
    // MARKET DATA
    // ====================================================================

    async fn ping(&self) -> Result<(), ExchangeError> {
        let _: serde_json::Value = self.get_public("/fapi/v1/ping", &[]).await?;
        Ok(())
    }

    async fn exchange_info(&self) -> Result<Vec<Instrument>, ExchangeError> {
        let response: ExchangeInfoResponse = self.get_public("/fapi/v1/exchangeInfo", &[]).await?;
        debug!(count = response.symbols.len(), "instrument list fetched");

        response
            .symbols
            .into_iter()
            .map(SymbolInfo::into_instrument)
            .collect()
    }

    async fn ticker_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let ticker: TickerPrice = self
            .get_public("/fapi/v1/ticker/price", &[("symbol", symbol.to_string())])
            .await?;
        parse_price(&ticker.price)
    }

    // ====================================================================
    // TRADING
    // ====================================================================

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderRecord, ExchangeError> {
        let response: OrderResponse = self
            .send_signed(Method::POST, "/fapi/v1/order", order_params(request))
            .await?;
        response.into_record()
    }

    async fn get_order(&self, symbol: &str, order_id: i64) -> Result<OrderRecord, ExchangeError> {
        let response: OrderResponse = self
            .send_signed(
                Method::GET,
                "/fapi/v1/order",
                vec![("symbol", symbol.to_string()), ("orderId", order_id.to_string())],
            )
            .await?;
        response.into_record()
    }

    async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<OrderRecord, ExchangeError> {
        let response: OrderResponse = self
            .send_signed(
                Method::DELETE,
                "/fapi/v1/order",
                vec![("symbol", symbol.to_string()), ("orderId", order_id.to_string())],
            )
            .await?;
        response.into_record()
    }

    async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<OrderRecord>, ExchangeError> {
        let params = symbol
            .map(|s| vec![("symbol", s.to_string())])
            .unwrap_or_default();
        let response: Vec<OrderResponse> = self
            .send_signed(Method::GET, "/fapi/v1/openOrders", params)
            .await?;
        response.into_iter().map(OrderResponse::into_record).collect()
    }

    // ====================================================================
    // ACCOUNT
    // ====================================================================

    async fn account_trades(&self, symbol: &str, limit: u32) -> Result<Vec<AccountTrade>, ExchangeError> {
        let response: Vec<UserTrade> = self
            .send_signed(
                Method::GET,
                "/fapi/v1/userTrades",
                vec![("symbol", symbol.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        response.into_iter().map(UserTrade::into_trade).collect()
    }

    async fn account(&self) -> Result<AccountInfo, ExchangeError> {
        let response: AccountResponse = self
            .send_signed(Method::GET, "/fapi/v2/account", Vec::new())
            .await?;
        response.into_account()
    }

    async fn positions(&self, symbol: &str) -> Result<Vec<PositionRisk>, ExchangeError> {
        let response: Vec<PositionResponse> = self
            .send_signed(
                Method::GET,
                "/fapi/v2/positionRisk",
                vec![("symbol", symbol.to_string())],
            )
            .await?;
        response.into_iter().map(PositionResponse::into_position).collect()
    }
}

// ====================================================================
// DATA STRUCTURES
// ====================================================================

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfoResponse {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    symbol: String,
    status: String,
    #[serde(default)]
    filters: Vec<FilterInfo>,
}

impl SymbolInfo {
    fn into_instrument(self) -> Result<Instrument, ExchangeError> {
        let mut filters = SymbolFilters::default();

        for filter in self.filters {
            match filter {
                FilterInfo::PriceFilter {
                    min_price,
                    max_price,
                    tick_size,
                } => {
                    filters.min_price = parse_or_zero(&min_price)?;
                    filters.max_price = upper_bound(&max_price)?;
                    filters.tick_size = parse_or_zero(&tick_size)?;
                }
                FilterInfo::LotSize {
                    min_qty,
                    max_qty,
                    step_size,
                } => {
                    filters.min_qty = parse_or_zero(&min_qty)?;
                    filters.max_qty = upper_bound(&max_qty)?;
                    filters.step_size = parse_or_zero(&step_size)?;
                }
                FilterInfo::MinNotional { notional } => {
                    filters.min_notional = parse_or_zero(&notional)?;
                }
                FilterInfo::Other => {}
            }
        }

        Ok(Instrument {
            symbol: self.symbol,
            status: self.status,
            filters,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "filterType")]
enum FilterInfo {
    #[serde(rename = "PRICE_FILTER")]
    PriceFilter {
        #[serde(rename = "minPrice", default)]
        min_price: String,
        #[serde(rename = "maxPrice", default)]
        max_price: String,
        #[serde(rename = "tickSize", default)]
        tick_size: String,
    },
    #[serde(rename = "LOT_SIZE")]
    LotSize {
        #[serde(rename = "minQty", default)]
        min_qty: String,
        #[serde(rename = "maxQty", default)]
        max_qty: String,
        #[serde(rename = "stepSize", default)]
        step_size: String,
    },
    #[serde(rename = "MIN_NOTIONAL")]
    MinNotional {
        #[serde(default)]
        notional: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    #[serde(rename = "orderId")]
    order_id: i64,
    #[serde(rename = "clientOrderId", default)]
    client_order_id: Option<String>,
    symbol: String,
    side: Side,
    #[serde(rename = "type")]
    order_type: OrderType,
    #[serde(rename = "origQty")]
    orig_qty: String,
    #[serde(default)]
    price: Option<String>,
    #[serde(rename = "stopPrice", default)]
    stop_price: Option<String>,
    status: OrderStatus,
    #[serde(rename = "executedQty", default)]
    executed_qty: String,
    #[serde(rename = "avgPrice", default)]
    avg_price: String,
    #[serde(rename = "timeInForce", default)]
    time_in_force: Option<String>,
}

impl OrderResponse {
    fn into_record(self) -> Result<OrderRecord, ExchangeError> {
        Ok(OrderRecord {
            order_id: self.order_id,
            client_order_id: self.client_order_id,
            symbol: self.symbol,
            side: self.side,
            order_type: self.order_type,
            orig_qty: parse_size(&self.orig_qty)?,
            price: parse_optional_price(self.price.as_deref())?,
            stop_price: parse_optional_price(self.stop_price.as_deref())?,
            status: self.status,
            executed_qty: parse_or_zero(&self.executed_qty)?,
            avg_price: parse_or_zero(&self.avg_price)?,
            // GTX / GTD have no local counterpart
            time_in_force: self.time_in_force.and_then(|tif| tif.parse().ok()),
            simulated: false,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "totalWalletBalance")]
    total_wallet_balance: String,
    #[serde(rename = "totalUnrealizedProfit", default)]
    total_unrealized_profit: String,
    #[serde(rename = "availableBalance")]
    available_balance: String,
    #[serde(default)]
    assets: Vec<AssetResponse>,
}

impl AccountResponse {
    fn into_account(self) -> Result<AccountInfo, ExchangeError> {
        let assets = self
            .assets
            .into_iter()
            .map(|a| {
                Ok(AssetBalance {
                    asset: a.asset,
                    wallet_balance: parse_or_zero(&a.wallet_balance)?,
                    available_balance: parse_or_zero(&a.available_balance)?,
                    unrealized_profit: parse_or_zero(&a.unrealized_profit)?,
                })
            })
            .collect::<Result<Vec<_>, ExchangeError>>()?;

        Ok(AccountInfo {
            total_wallet_balance: parse_or_zero(&self.total_wallet_balance)?,
            total_unrealized_profit: parse_or_zero(&self.total_unrealized_profit)?,
            available_balance: parse_or_zero(&self.available_balance)?,
            assets,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    asset: String,
    #[serde(rename = "walletBalance", default)]
    wallet_balance: String,
    #[serde(rename = "availableBalance", default)]
    available_balance: String,
    #[serde(rename = "unrealizedProfit", default)]
    unrealized_profit: String,
}

#[derive(Debug, Deserialize)]
struct PositionResponse {
    symbol: String,
    #[serde(rename = "positionAmt")]
    position_amt: String,
    #[serde(rename = "entryPrice", default)]
    entry_price: String,
    #[serde(rename = "markPrice", default)]
    mark_price: String,
    #[serde(rename = "unRealizedProfit", default)]
    unrealized_profit: String,
    #[serde(default)]
    leverage: String,
}

impl PositionResponse {
    fn into_position(self) -> Result<PositionRisk, ExchangeError> {
        Ok(PositionRisk {
            symbol: self.symbol,
            position_amt: parse_size(&self.position_amt)?,
            entry_price: parse_or_zero(&self.entry_price)?,
            mark_price: parse_or_zero(&self.mark_price)?,
            unrealized_profit: parse_or_zero(&self.unrealized_profit)?,
            leverage: parse_or_zero(&self.leverage)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserTrade {
    id: i64,
    #[serde(rename = "orderId")]
    order_id: i64,
    symbol: String,
    side: Side,
    price: String,
    qty: String,
    #[serde(rename = "realizedPnl", default)]
    realized_pnl: String,
    #[serde(default)]
    commission: String,
    #[serde(rename = "commissionAsset", default)]
    commission_asset: String,
    time: i64,
}

impl UserTrade {
    fn into_trade(self) -> Result<AccountTrade, ExchangeError> {
        let time = chrono::DateTime::from_timestamp_millis(self.time).ok_or_else(|| {
            ExchangeError::ParseError(format!("Invalid trade timestamp {}", self.time))
        })?;

        Ok(AccountTrade {
            id: self.id,
            order_id: self.order_id,
            symbol: self.symbol,
            side: self.side,
            price: parse_price(&self.price)?,
            qty: parse_size(&self.qty)?,
            realized_pnl: parse_or_zero(&self.realized_pnl)?,
            commission: parse_or_zero(&self.commission)?,
            commission_asset: self.commission_asset,
            time,
        })
    }
}

// ====================================================================
// HELPERS
// ====================================================================

/// Zero or missing maximum means unbounded
fn upper_bound(raw: &str) -> Result<Decimal, ExchangeError> {
    let value = parse_or_zero(raw)?;
    Ok(if value.is_zero() { Decimal::MAX } else { value })
}

/// Wire parameters for the order-entry endpoint
fn order_params(request: &OrderRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("symbol", request.symbol.clone()),
        ("side", request.side.as_str().to_string()),
        ("type", request.order_type.as_str().to_string()),
        ("quantity", format_decimal(request.quantity)),
    ];

    if let Some(price) = request.price {
        params.push(("price", format_decimal(price)));
    }
    if let Some(stop_price) = request.stop_price {
        params.push(("stopPrice", format_decimal(stop_price)));
    }
    if let Some(tif) = request.time_in_force {
        params.push(("timeInForce", tif.as_str().to_string()));
    }
    if request.reduce_only {
        params.push(("reduceOnly", "true".to_string()));
    }

    params
}

/// URL-encoded query with the authentication fields appended last
fn build_signed_query(params: &[(&str, String)], timestamp_ms: i64, recv_window_ms: u64) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("recvWindow", &recv_window_ms.to_string());
    serializer.append_pair("timestamp", &timestamp_ms.to_string());
    serializer.finish()
}
