// exchange/traits.rs

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::exchange::errors::ExchangeError;
use crate::exchange::types::{AccountInfo, AccountTrade, PositionRisk};
use trading_common::data::{Instrument, OrderRecord, OrderRequest};

/// REST surface of a USDT-margined futures venue.
///
/// Market data calls are public. Everything touching orders or the account
/// is signed and needs credentials.
#[async_trait]
pub trait FuturesApi: Send + Sync {
    /// Connectivity check
    async fn ping(&self) -> Result<(), ExchangeError>;

    /// Full instrument list with parsed trading rules
    async fn exchange_info(&self) -> Result<Vec<Instrument>, ExchangeError>;

    /// Last traded price
    async fn ticker_price(&self, symbol: &str) -> Result<Decimal, ExchangeError>;

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderRecord, ExchangeError>;

    async fn get_order(&self, symbol: &str, order_id: i64) -> Result<OrderRecord, ExchangeError>;

    async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<OrderRecord, ExchangeError>;

    /// Resting orders, for one symbol or across the account
    async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<OrderRecord>, ExchangeError>;

    async fn account_trades(&self, symbol: &str, limit: u32) -> Result<Vec<AccountTrade>, ExchangeError>;

    async fn account(&self) -> Result<AccountInfo, ExchangeError>;

    async fn positions(&self, symbol: &str) -> Result<Vec<PositionRisk>, ExchangeError>;
}
