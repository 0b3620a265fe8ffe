// tests/common/mod.rs
// In-memory futures API for exercising the services without a network.
#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use trading_common::data::{Instrument, OrderRecord, OrderRequest, OrderStatus, SymbolFilters};
use trading_core::config::Settings;
use trading_core::context::TradingContext;
use trading_core::exchange::{AccountInfo, AccountTrade, ExchangeError, FuturesApi, PositionRisk};
use trading_core::service::{AutoApprove, Confirm};

pub fn btc_filters() -> SymbolFilters {
    SymbolFilters {
        min_qty: dec!(0.001),
        max_qty: dec!(1000),
        step_size: dec!(0.001),
        min_price: dec!(0.1),
        max_price: dec!(1000000),
        tick_size: dec!(0.1),
        min_notional: dec!(5),
    }
}

pub struct FakeExchange {
    instruments: Vec<Instrument>,
    prices: Mutex<HashMap<String, Decimal>>,
    orders: Mutex<HashMap<i64, OrderRecord>>,
    placed: Mutex<Vec<OrderRequest>>,
    next_order_id: AtomicI64,
    /// Placement attempts from this index on are rejected
    reject_from: AtomicUsize,
    pub exchange_info_calls: AtomicUsize,
}

impl FakeExchange {
    /// BTCUSDT trading at 50000, ETHUSDT listed but halted
    pub fn new() -> Self {
        let instruments = vec![
            Instrument {
                symbol: "BTCUSDT".to_string(),
                status: "TRADING".to_string(),
                filters: btc_filters(),
            },
            Instrument {
                symbol: "ETHUSDT".to_string(),
                status: "BREAK".to_string(),
                filters: btc_filters(),
            },
        ];

        let mut prices = HashMap::new();
        prices.insert("BTCUSDT".to_string(), dec!(50000));
        prices.insert("ETHUSDT".to_string(), dec!(3000));

        Self {
            instruments,
            prices: Mutex::new(prices),
            orders: Mutex::new(HashMap::new()),
            placed: Mutex::new(Vec::new()),
            next_order_id: AtomicI64::new(1000),
            reject_from: AtomicUsize::new(usize::MAX),
            exchange_info_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_price(&self, symbol: &str, price: Decimal) {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
    }

    pub fn reject_orders(&self, reject: bool) {
        let from = if reject { self.place_calls() } else { usize::MAX };
        self.reject_from.store(from, Ordering::SeqCst);
    }

    /// Accepts the next `accepted` placements, then rejects the rest
    pub fn reject_after(&self, accepted: usize) {
        self.reject_from.store(self.place_calls() + accepted, Ordering::SeqCst);
    }

    /// Seeds an order the exchange knows about without a placement
    pub fn insert_order(&self, record: OrderRecord) {
        self.orders.lock().unwrap().insert(record.order_id, record);
    }

    pub fn order(&self, order_id: i64) -> Option<OrderRecord> {
        self.orders.lock().unwrap().get(&order_id).cloned()
    }

    pub fn placed(&self) -> Vec<OrderRequest> {
        self.placed.lock().unwrap().clone()
    }

    pub fn place_calls(&self) -> usize {
        self.placed.lock().unwrap().len()
    }

    /// Marks a resting order as completely filled at its limit price
    pub fn fill(&self, order_id: i64) {
        let mut orders = self.orders.lock().unwrap();
        let order = orders.get_mut(&order_id).expect("unknown order id");
        order.status = OrderStatus::Filled;
        order.executed_qty = order.orig_qty;
        order.avg_price = order.price.unwrap_or_default();
    }
}

#[async_trait]
impl FuturesApi for FakeExchange {
    async fn ping(&self) -> Result<(), ExchangeError> {
        Ok(())
    }

    async fn exchange_info(&self) -> Result<Vec<Instrument>, ExchangeError> {
        self.exchange_info_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.instruments.clone())
    }

    async fn ticker_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        self.prices
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.to_string()))
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderRecord, ExchangeError> {
        let attempt = {
            let mut placed = self.placed.lock().unwrap();
            placed.push(request.clone());
            placed.len() - 1
        };
        if attempt >= self.reject_from.load(Ordering::SeqCst) {
            return Err(ExchangeError::ApiError {
                code: -2019,
                msg: "Margin is insufficient.".to_string(),
            });
        }

        let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        let record = OrderRecord {
            order_id,
            client_order_id: None,
            symbol: request.symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            orig_qty: request.quantity,
            price: request.price,
            stop_price: request.stop_price,
            status: OrderStatus::New,
            executed_qty: Decimal::ZERO,
            avg_price: Decimal::ZERO,
            time_in_force: request.time_in_force,
            simulated: false,
        };
        self.orders.lock().unwrap().insert(order_id, record.clone());
        Ok(record)
    }

    async fn get_order(&self, _symbol: &str, order_id: i64) -> Result<OrderRecord, ExchangeError> {
        self.orders
            .lock()
            .unwrap()
            .get(&order_id)
            .cloned()
            .ok_or_else(|| ExchangeError::ApiError {
                code: -2013,
                msg: "Order does not exist.".to_string(),
            })
    }

    async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<OrderRecord, ExchangeError> {
        let mut record = self.get_order(symbol, order_id).await?;
        record.status = OrderStatus::Canceled;
        self.orders.lock().unwrap().insert(order_id, record.clone());
        Ok(record)
    }

    async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<OrderRecord>, ExchangeError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.status == OrderStatus::New)
            .filter(|o| symbol.map_or(true, |s| o.symbol == s))
            .cloned()
            .collect())
    }

    async fn account_trades(&self, _symbol: &str, _limit: u32) -> Result<Vec<AccountTrade>, ExchangeError> {
        Ok(Vec::new())
    }

    async fn account(&self) -> Result<AccountInfo, ExchangeError> {
        Ok(AccountInfo {
            total_wallet_balance: dec!(1000),
            total_unrealized_profit: Decimal::ZERO,
            available_balance: dec!(1000),
            assets: Vec::new(),
        })
    }

    async fn positions(&self, _symbol: &str) -> Result<Vec<PositionRisk>, ExchangeError> {
        Ok(Vec::new())
    }
}

/// Answers prompts from a script, then says no
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    block_when_done: bool,
    pub asked: AtomicUsize,
}

impl ScriptedConfirm {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            block_when_done: false,
            asked: AtomicUsize::new(0),
        }
    }

    /// Like `new`, but an operator who walked away once the script runs out
    pub fn then_block(answers: &[bool]) -> Self {
        Self {
            block_when_done: true,
            ..Self::new(answers)
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, _question: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        let next = self.answers.lock().unwrap().pop_front();
        match next {
            Some(answer) => answer,
            None if self.block_when_done => loop {
                std::thread::park();
            },
            None => false,
        }
    }
}

pub fn context_with(api: Arc<FakeExchange>, confirmer: Arc<dyn Confirm>, dry_run: bool) -> TradingContext {
    let settings = Settings::defaults().unwrap();
    TradingContext::new(settings, api, confirmer, dry_run)
}

pub fn context(api: Arc<FakeExchange>, dry_run: bool) -> TradingContext {
    context_with(api, Arc::new(AutoApprove), dry_run)
}
