// service/submitter.rs
// Order submission with a dry-run path that never touches the network

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::errors::{ServiceError, ServiceResult};
use super::prompt::{confirm_or_shutdown, Confirm};
use crate::exchange::FuturesApi;
use trading_common::data::{OrderRecord, OrderRequest, OrderStatus};

/// Sentinel order id for simulated single orders
pub const DRY_RUN_ORDER_ID: i64 = 9_999_999;

/// How a dry run should report an order
#[derive(Debug, Clone, Copy)]
pub struct Simulation {
    pub order_id: i64,
    /// Fill price for immediate orders without a limit price
    pub fill_price: Option<Decimal>,
    pub latency: Duration,
}

impl Simulation {
    pub fn new(order_id: i64) -> Self {
        Self {
            order_id,
            fill_price: None,
            latency: Duration::ZERO,
        }
    }

    pub fn fill_price(mut self, price: Decimal) -> Self {
        self.fill_price = Some(price);
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

pub struct OrderSubmitter {
    api: Arc<dyn FuturesApi>,
    confirmer: Arc<dyn Confirm>,
    dry_run: bool,
}

impl OrderSubmitter {
    pub fn new(api: Arc<dyn FuturesApi>, confirmer: Arc<dyn Confirm>, dry_run: bool) -> Self {
        Self {
            api,
            confirmer,
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn mode_label(&self) -> &'static str {
        if self.dry_run {
            "DRY RUN"
        } else {
            "LIVE"
        }
    }

    /// Prompts in live mode; declining aborts. Dry runs never ask.
    pub fn confirm(&self, question: &str) -> ServiceResult<()> {
        if self.dry_run || self.confirmer.confirm(question) {
            return Ok(());
        }
        info!(question, "declined by operator");
        Err(ServiceError::Aborted("Order cancelled by user".to_string()))
    }

    /// Same prompt as `confirm`, abandoned when `shutdown` fires.
    /// `None` means interrupted; dry runs always answer yes.
    pub async fn ask_or_shutdown(
        &self,
        question: &str,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Option<bool> {
        if self.dry_run {
            return Some(true);
        }
        confirm_or_shutdown(self.confirmer.clone(), question, shutdown).await
    }

    pub async fn submit(&self, request: &OrderRequest) -> ServiceResult<OrderRecord> {
        self.submit_with(request, Simulation::new(DRY_RUN_ORDER_ID)).await
    }

    /// Live: forwards the request verbatim. Dry run: waits `latency` and
    /// returns a record with the given sentinel id.
    pub async fn submit_with(
        &self,
        request: &OrderRequest,
        simulation: Simulation,
    ) -> ServiceResult<OrderRecord> {
        let record = if self.dry_run {
            if !simulation.latency.is_zero() {
                tokio::time::sleep(simulation.latency).await;
            }
            simulate(request, &simulation)
        } else {
            match self.api.place_order(request).await {
                Ok(record) => record,
                Err(e) => {
                    warn!(
                        symbol = %request.symbol,
                        side = %request.side,
                        order_type = %request.order_type,
                        error = %e,
                        "order rejected"
                    );
                    return Err(e.into());
                }
            }
        };

        info!(
            order_id = record.order_id,
            symbol = %record.symbol,
            side = %record.side,
            order_type = %record.order_type,
            quantity = %record.orig_qty,
            price = ?record.price,
            stop_price = ?record.stop_price,
            status = %record.status,
            simulated = record.simulated,
            "order placed"
        );

        Ok(record)
    }
}

/// Immediate orders come back filled, resting orders as NEW
pub fn simulate(request: &OrderRequest, simulation: &Simulation) -> OrderRecord {
    let filled = request.is_immediate();
    let fill_price = request
        .price
        .or(simulation.fill_price)
        .unwrap_or(Decimal::ZERO);

    OrderRecord {
        order_id: simulation.order_id,
        client_order_id: None,
        symbol: request.symbol.clone(),
        side: request.side,
        order_type: request.order_type,
        orig_qty: request.quantity,
        price: request.price,
        stop_price: request.stop_price,
        status: if filled {
            OrderStatus::Filled
        } else {
            OrderStatus::New
        },
        executed_qty: if filled { request.quantity } else { Decimal::ZERO },
        avg_price: if filled { fill_price } else { Decimal::ZERO },
        time_in_force: request.time_in_force,
        simulated: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trading_common::data::{Side, TimeInForce};

    #[test]
    fn test_simulated_market_fill() {
        let request = OrderRequest::market("BTCUSDT", Side::Buy, dec!(0.01));
        let record = simulate(&request, &Simulation::new(DRY_RUN_ORDER_ID).fill_price(dec!(50000)));

        assert_eq!(record.order_id, 9_999_999);
        assert_eq!(record.status, OrderStatus::Filled);
        assert_eq!(record.executed_qty, dec!(0.01));
        assert_eq!(record.avg_price, dec!(50000));
        assert!(record.simulated);
    }

    #[test]
    fn test_simulated_resting_order() {
        let request = OrderRequest::limit("BTCUSDT", Side::Sell, dec!(0.01), dec!(60000), TimeInForce::Gtc);
        let record = simulate(&request, &Simulation::new(8_888_003));

        assert_eq!(record.order_id, 8_888_003);
        assert_eq!(record.status, OrderStatus::New);
        assert_eq!(record.executed_qty, Decimal::ZERO);
        assert_eq!(record.price, Some(dec!(60000)));
    }

    #[test]
    fn test_simulated_ioc_fills_at_limit() {
        let request = OrderRequest::limit("BTCUSDT", Side::Buy, dec!(0.02), dec!(49000), TimeInForce::Ioc);
        let record = simulate(&request, &Simulation::new(9_999_001).fill_price(dec!(50000)));

        assert_eq!(record.status, OrderStatus::Filled);
        assert_eq!(record.avg_price, dec!(49000));
    }
}
