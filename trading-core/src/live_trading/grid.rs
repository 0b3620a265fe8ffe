// src/live_trading/grid.rs
// Grid setup and the polling loop that re-arms filled levels.

use chrono::Local;
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::cli::{rule, section};
use crate::context::TradingContext;
use crate::service::{ServiceError, ServiceResult, Simulation};
use trading_common::data::{OrderRecord, OrderRequest, OrderStatus, Side, TimeInForce};
use trading_common::strategy::{GridLedger, GridPlan, LevelTag};

/// Level `n` of a dry run reports order id `GRID_SENTINEL_BASE + n`
pub const GRID_SENTINEL_BASE: i64 = 8_888_000;

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Status line every this many polls
const STATUS_EVERY_POLLS: u64 = 6;

const DRY_RUN_LEVEL_LATENCY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct GridConfig {
    pub symbol: String,
    pub lower_price: Decimal,
    pub upper_price: Decimal,
    pub num_grids: u32,
    pub quantity_per_grid: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridStats {
    pub orders_placed: usize,
    pub orders_filled: usize,
    pub orders_active: usize,
    pub realized_profit: Decimal,
    pub round_trips: u32,
}

pub struct GridTrader<'a> {
    ctx: &'a TradingContext,
    symbol: String,
    plan: GridPlan,
    quantity: Decimal,
    active: Vec<OrderRecord>,
    filled: Vec<OrderRecord>,
    ledger: GridLedger,
    polls: u64,
}

impl std::fmt::Debug for GridTrader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridTrader")
            .field("symbol", &self.symbol)
            .field("plan", &self.plan)
            .field("quantity", &self.quantity)
            .field("active", &self.active)
            .field("filled", &self.filled)
            .field("ledger", &self.ledger)
            .field("polls", &self.polls)
            .finish_non_exhaustive()
    }
}

/// A level that passed price and order-value checks
#[derive(Debug, Clone, Copy)]
struct LevelOrder {
    index: usize,
    side: Side,
    price: Decimal,
}

impl<'a> GridTrader<'a> {
    /// Validates the range and every level's order value, shows the layout,
    /// then places one GTC limit per level except the one at the live price.
    /// A level the exchange rejects is logged and skipped.
    pub async fn setup(
        ctx: &'a TradingContext,
        config: &GridConfig,
    ) -> ServiceResult<GridTrader<'a>> {
        let v = &ctx.validator;
        let symbol = v.validate_symbol(&config.symbol).await?;
        let lower = v.validate_price(&symbol, config.lower_price).await?;
        let upper = v.validate_price(&symbol, config.upper_price).await?;
        let quantity = v.validate_quantity(&symbol, config.quantity_per_grid).await?;

        let current_price = v.current_price(&symbol).await?;
        let plan = GridPlan::new(lower, upper, config.num_grids, current_price)?;

        let mut orders = Vec::with_capacity(plan.levels.len());
        for level in &plan.levels {
            let Some(side) = level.side() else {
                continue;
            };
            let price = v.validate_price(&symbol, level.price).await?;
            v.validate_notional(&symbol, quantity, price).await?;
            orders.push(LevelOrder {
                index: level.index,
                side,
                price,
            });
        }

        section("GRID TRADING STRATEGY SUMMARY");
        println!("Symbol:               {}", symbol);
        println!("Price Range:          ${} - ${}", lower, upper);
        println!("Current Price:        ${}", current_price.round_dp(2));
        println!("Grid Levels:          {}", plan.levels.len());
        println!("Quantity per Level:   {}", quantity);
        println!("Grid Step:            ${}", plan.step.round_dp(8).normalize());
        println!("\nOrder Distribution:");
        println!("  Buy Orders:         {} (below current price)", plan.buy_count());
        println!("  Sell Orders:        {} (above current price)", plan.sell_count());
        println!(
            "  Total Investment:   ${} USDT",
            plan.required_investment(quantity).round_dp(2)
        );
        println!("\nMode:                 {}", ctx.submitter.mode_label());
        rule();

        println!("\nGrid Levels:");
        for level in &plan.levels {
            let marker = match level.tag {
                LevelTag::Current => "→",
                _ => " ",
            };
            println!(
                "  {} Level {:2}: ${} ({})",
                marker,
                level.index,
                level.price.round_dp(8).normalize(),
                level.tag.as_str()
            );
        }

        if !plan.contains(current_price) {
            warn!(
                symbol = %symbol,
                %current_price,
                %lower,
                %upper,
                "current price outside grid range"
            );
            println!(
                "\n⚠️  WARNING: Current price (${}) is outside grid range!",
                current_price.round_dp(2)
            );
            println!("    Grid will only trigger when price returns to range.");
        }

        ctx.submitter.confirm("Proceed with grid setup? (yes/no): ")?;

        let mut trader = GridTrader {
            ctx,
            symbol,
            plan,
            quantity,
            active: Vec::new(),
            filled: Vec::new(),
            ledger: GridLedger::new(),
            polls: 0,
        };
        trader.place_levels(&orders).await;
        Ok(trader)
    }

    async fn place_levels(&mut self, orders: &[LevelOrder]) {
        section("PLACING GRID ORDERS");
        let total = self.plan.levels.len();

        for level in &self.plan.levels {
            if level.tag == LevelTag::Current {
                println!(
                    "[{}/{}] Skipping level at current price: ${}",
                    level.index,
                    total,
                    level.price.round_dp(8).normalize()
                );
            }
        }

        for order in orders {
            let LevelOrder { index, side, price } = *order;
            let request =
                OrderRequest::limit(&self.symbol, side, self.quantity, price, TimeInForce::Gtc);
            let simulation =
                Simulation::new(GRID_SENTINEL_BASE + index as i64).latency(DRY_RUN_LEVEL_LATENCY);

            match self.ctx.submitter.submit_with(&request, simulation).await {
                Ok(record) => {
                    info!(
                        grid_level = index,
                        order_id = record.order_id,
                        side = %side,
                        %price,
                        "grid order placed"
                    );
                    println!(
                        "[{}/{}] {} @ ${} ✅ Order ID: {}",
                        index, total, side, price, record.order_id
                    );
                    self.active.push(record);
                }
                Err(e) => {
                    error!(grid_level = index, %price, error = %e, "failed to place grid order");
                    println!("[{}/{}] {} @ ${} ❌ Failed: {}", index, total, side, price, e);
                }
            }
        }

        info!(
            symbol = %self.symbol,
            levels = total,
            active_orders = self.active.len(),
            lower = %self.plan.lower,
            upper = %self.plan.upper,
            "grid setup complete"
        );
        section("GRID SETUP COMPLETE");
        println!("Active Orders:        {}", self.active.len());
        rule();
    }

    /// Polls until the shutdown signal, then returns the final statistics.
    /// Refused in dry-run mode since simulated ids do not exist on the exchange.
    pub async fn monitor(
        &mut self,
        check_interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> ServiceResult<GridStats> {
        if self.ctx.is_dry_run() {
            return Err(ServiceError::Config(
                "Monitoring is not available in dry-run mode".to_string(),
            ));
        }

        section("MONITORING GRID");
        println!("Press Ctrl+C to stop monitoring\n");
        info!(
            symbol = %self.symbol,
            interval_secs = check_interval.as_secs_f64(),
            "grid monitoring started"
        );

        loop {
            self.monitor_once().await;

            tokio::select! {
                _ = tokio::time::sleep(check_interval) => {}
                Ok(()) = shutdown.recv() => {
                    println!("\n⚠️  Monitoring stopped by user");
                    break;
                }
            }
        }

        let stats = self.stats();
        self.print_final_stats();
        Ok(stats)
    }

    /// One pass over the resting orders. Lookup failures leave the order
    /// in the active set for the next pass.
    pub async fn monitor_once(&mut self) {
        let mut still_active = Vec::with_capacity(self.active.len());
        let mut fills = Vec::new();

        for order in std::mem::take(&mut self.active) {
            match self.ctx.api.get_order(&self.symbol, order.order_id).await {
                Ok(current) if current.status == OrderStatus::Filled => fills.push(current),
                Ok(current) if is_closed(current.status) => {
                    warn!(
                        order_id = current.order_id,
                        status = %current.status,
                        "grid order closed without fill"
                    );
                }
                Ok(_) => still_active.push(order),
                Err(e) => {
                    warn!(order_id = order.order_id, error = %e, "failed to check grid order");
                    still_active.push(order);
                }
            }
        }
        self.active = still_active;

        for fill in fills {
            self.handle_fill(fill).await;
        }

        self.polls += 1;
        if self.polls % STATUS_EVERY_POLLS == 0 {
            self.print_status().await;
        }
    }

    async fn handle_fill(&mut self, fill: OrderRecord) {
        let fill_price = if fill.avg_price > Decimal::ZERO {
            fill.avg_price
        } else {
            fill.price.unwrap_or(Decimal::ZERO)
        };
        let fill_qty = if fill.executed_qty > Decimal::ZERO {
            fill.executed_qty
        } else {
            fill.orig_qty
        };
        let profit = self.ledger.record_fill(fill.side, fill_price, fill_qty);

        info!(
            order_id = fill.order_id,
            side = %fill.side,
            executed_qty = %fill_qty,
            avg_price = %fill_price,
            realized = %profit,
            "grid order filled"
        );
        println!("\n[{}] ✅ Order filled!", Local::now().format("%H:%M:%S"));
        println!("  {} {} @ ${}", fill.side, fill_qty, fill_price.round_dp(2));
        println!("  Order ID: {}", fill.order_id);
        if !profit.is_zero() {
            println!("  Realized: ${} USDT", profit.round_dp(4));
        }

        let side = fill.side;
        self.filled.push(fill);

        // only reachable in dry run through direct monitor_once calls,
        // since monitor() refuses to start there
        if !self.ctx.is_dry_run() {
            self.place_replacement(side, fill_price, fill_qty).await;
        }
    }

    /// Opposite side one grid step away, same quantity. Skipped when the
    /// new price or its order value fails validation.
    async fn place_replacement(
        &mut self,
        filled_side: Side,
        fill_price: Decimal,
        quantity: Decimal,
    ) {
        let (side, raw_price) = self.plan.replacement(filled_side, fill_price);
        let v = &self.ctx.validator;

        let checked = async {
            let price = v.validate_price(&self.symbol, raw_price).await?;
            v.validate_notional(&self.symbol, quantity, price).await?;
            Ok::<_, ServiceError>(price)
        };
        let price = match checked.await {
            Ok(price) => price,
            Err(e) => {
                error!(side = %side, price = %raw_price, error = %e, "replacement order rejected");
                println!("\n  ❌ Replacement {} at ${} rejected: {}", side, raw_price, e);
                return;
            }
        };

        println!("\n  📌 Placing replacement {} order at ${}", side, price);
        let request = OrderRequest::limit(&self.symbol, side, quantity, price, TimeInForce::Gtc);
        match self.ctx.submitter.submit(&request).await {
            Ok(record) => {
                info!(
                    order_id = record.order_id,
                    side = %side,
                    %price,
                    "grid replacement placed"
                );
                println!("  ✅ Replacement order placed: ID {}", record.order_id);
                self.active.push(record);
            }
            Err(e) => {
                error!(side = %side, %price, error = %e, "failed to place replacement order")
            }
        }
    }

    async fn print_status(&self) {
        let price = match self.ctx.validator.current_price(&self.symbol).await {
            Ok(price) => price.round_dp(2).to_string(),
            Err(e) => {
                warn!(error = %e, "price lookup failed");
                "n/a".to_string()
            }
        };

        println!("\n[{}] Status Update:", Local::now().format("%H:%M:%S"));
        println!("  Current Price:    ${}", price);
        println!("  Active Orders:    {}", self.active.len());
        println!("  Filled Orders:    {}", self.filled.len());
        println!("  Realized Profit:  ${} USDT", self.ledger.realized_profit().round_dp(2));
    }

    pub fn stats(&self) -> GridStats {
        GridStats {
            orders_placed: self.active.len() + self.filled.len(),
            orders_filled: self.filled.len(),
            orders_active: self.active.len(),
            realized_profit: self.ledger.realized_profit(),
            round_trips: self.ledger.round_trips(),
        }
    }

    pub fn print_final_stats(&self) {
        let stats = self.stats();
        section("GRID TRADING FINAL STATISTICS");
        println!("Symbol:               {}", self.symbol);
        println!("Total Orders Placed:  {}", stats.orders_placed);
        println!("Orders Filled:        {}", stats.orders_filled);
        println!("Orders Active:        {}", stats.orders_active);
        println!("Round Trips:          {}", stats.round_trips);
        println!("Realized Profit:      ${} USDT", stats.realized_profit.round_dp(2));
        rule();

        info!(
            symbol = %self.symbol,
            filled = stats.orders_filled,
            active = stats.orders_active,
            round_trips = stats.round_trips,
            realized_profit = %stats.realized_profit,
            "grid stopped"
        );
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn plan(&self) -> &GridPlan {
        &self.plan
    }

    pub fn active_orders(&self) -> &[OrderRecord] {
        &self.active
    }

    pub fn filled_orders(&self) -> &[OrderRecord] {
        &self.filled
    }
}

fn is_closed(status: OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::Canceled | OrderStatus::Expired | OrderStatus::Rejected
    )
}
