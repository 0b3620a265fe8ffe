// src/live_trading/twap.rs
// Sequential TWAP execution: one slice per scheduled time, sleeping in between.

use chrono::Utc;
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::cli::{rule, section};
use crate::context::TradingContext;
use crate::service::{ServiceResult, Simulation};
use trading_common::data::{OrderRecord, OrderRequest, Side, TimeInForce};
use trading_common::strategy::{TwapPlan, TwapSummary};

/// Slice `n` of a dry run reports order id `TWAP_SENTINEL_BASE + n`
pub const TWAP_SENTINEL_BASE: i64 = 9_999_000;

const DRY_RUN_SLICE_LATENCY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct TwapRequest {
    pub symbol: String,
    pub side: String,
    pub total_quantity: Decimal,
    pub duration: Duration,
    pub num_slices: u32,
    /// Slices go out as LIMIT IOC at this price instead of MARKET
    pub limit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwapCompletion {
    /// Every slice was attempted
    Completed,
    /// Operator chose not to continue after a failed slice
    Declined,
    /// Shutdown signal received between slices
    Interrupted,
}

#[derive(Debug, Clone)]
pub struct TwapReport {
    pub symbol: String,
    pub side: Side,
    pub plan: TwapPlan,
    pub start_price: Decimal,
    pub executed: Vec<OrderRecord>,
    pub failed_slices: u32,
    pub completion: TwapCompletion,
}

impl TwapReport {
    pub fn summary(&self) -> TwapSummary {
        TwapSummary::from_records(&self.executed)
    }
}

/// A validated TWAP run the operator has agreed to start
#[derive(Debug, Clone)]
pub struct PreparedTwap {
    symbol: String,
    side: Side,
    plan: TwapPlan,
    slice_quantity: Decimal,
    limit_price: Option<Decimal>,
    start_price: Decimal,
}

impl PreparedTwap {
    pub fn plan(&self) -> &TwapPlan {
        &self.plan
    }
}

pub struct TwapExecutor<'a> {
    ctx: &'a TradingContext,
}

impl<'a> TwapExecutor<'a> {
    pub fn new(ctx: &'a TradingContext) -> Self {
        Self { ctx }
    }

    /// Validates and confirms, then runs the schedule
    pub async fn execute(
        &self,
        request: &TwapRequest,
        shutdown: broadcast::Receiver<()>,
    ) -> ServiceResult<TwapReport> {
        let prepared = self.prepare(request).await?;
        self.run(prepared, shutdown).await
    }

    /// Validation, plan printout and the start confirmation. Nothing is sent.
    pub async fn prepare(&self, request: &TwapRequest) -> ServiceResult<PreparedTwap> {
        let v = &self.ctx.validator;
        let submitter = &self.ctx.submitter;

        let symbol = v.validate_symbol(&request.symbol).await?;
        let side = v.validate_side(&request.side)?;
        let filters = v.symbol_filters(&symbol).await?;
        let plan = TwapPlan::new(
            request.total_quantity,
            request.num_slices,
            request.duration,
            &filters,
        )?;
        let slice_quantity = v.validate_quantity(&symbol, plan.slice_quantity).await?;
        let limit_price = match request.limit_price {
            Some(price) => {
                let price = v.validate_price(&symbol, price).await?;
                v.validate_notional(&symbol, slice_quantity, price).await?;
                Some(price)
            }
            None => None,
        };
        let start_price = v.current_price(&symbol).await?;
        let interval = plan.interval();

        section("TWAP EXECUTION PLAN");
        println!("Symbol:               {}", symbol);
        println!("Side:                 {}", side);
        println!("Total Quantity:       {}", plan.requested_total);
        println!("Number of Slices:     {}", plan.num_slices);
        println!("Quantity per Slice:   {}", slice_quantity);
        println!("Total Duration:       {}s", plan.duration.as_secs());
        println!("Interval:             {:.1}s", interval.as_secs_f64());
        println!("Current Price:        ${}", start_price.round_dp(2));
        println!(
            "Order Type:           {}",
            limit_price
                .map(|p| format!("LIMIT IOC @ ${}", p))
                .unwrap_or_else(|| "MARKET".to_string())
        );
        println!(
            "Est. Completion:      {}",
            plan.estimated_completion(Utc::now()).format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("Mode:                 {}", submitter.mode_label());
        rule();

        let shortfall = plan.shortfall();
        if !shortfall.is_zero() {
            warn!(
                requested = %plan.requested_total,
                actual = %plan.actual_total(),
                %shortfall,
                "slice rounding leaves part of the requested quantity unexecuted"
            );
            println!(
                "\n⚠️  Rounding: {} slices of {} = {} (requested {}, {} will not be executed)",
                plan.num_slices,
                slice_quantity,
                plan.actual_total(),
                plan.requested_total,
                shortfall
            );
        }

        submitter.confirm("Start TWAP execution? (yes/no): ")?;

        Ok(PreparedTwap {
            symbol,
            side,
            plan,
            slice_quantity,
            limit_price,
            start_price,
        })
    }

    /// Sends one slice per scheduled time. Partial execution (declined or
    /// interrupted) is a normal outcome and comes back as `Ok`.
    pub async fn run(
        &self,
        prepared: PreparedTwap,
        mut shutdown: broadcast::Receiver<()>,
    ) -> ServiceResult<TwapReport> {
        let v = &self.ctx.validator;
        let submitter = &self.ctx.submitter;
        let PreparedTwap {
            symbol,
            side,
            plan,
            slice_quantity,
            limit_price,
            start_price,
        } = prepared;

        let started_at = Utc::now();
        let started = Instant::now();
        let schedule = plan.schedule(started_at);
        info!(
            symbol = %symbol,
            side = %side,
            slices = plan.num_slices,
            %slice_quantity,
            interval_secs = plan.interval().as_secs_f64(),
            "TWAP started"
        );

        section("EXECUTING TWAP STRATEGY");

        let mut executed = Vec::new();
        let mut failed_slices = 0;
        let mut completion = TwapCompletion::Completed;

        for slice in schedule {
            let offset = (slice.target_time - started_at).to_std().unwrap_or_default();
            let due = started + offset;
            let wait = due.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                println!("    ⏳ Waiting {:.1}s for next slice...", wait.as_secs_f64());
                tokio::select! {
                    _ = tokio::time::sleep_until(due) => {}
                    Ok(()) = shutdown.recv() => {
                        completion = TwapCompletion::Interrupted;
                        break;
                    }
                }
            }
            if shutdown.try_recv().is_ok() {
                completion = TwapCompletion::Interrupted;
                break;
            }

            let price = match v.current_price(&symbol).await {
                Ok(price) => price,
                Err(e) => {
                    warn!(
                        slice = slice.index,
                        error = %e,
                        "price lookup failed, using start price for display"
                    );
                    start_price
                }
            };
            let progress =
                Decimal::from(slice.index) / Decimal::from(plan.num_slices) * Decimal::from(100);
            println!(
                "\n[{}/{}] ({}%) Executing {} {} @ ${}",
                slice.index,
                plan.num_slices,
                progress.round_dp(1),
                slice.quantity,
                symbol,
                price.round_dp(2)
            );

            let order = match limit_price {
                Some(limit) => {
                    OrderRequest::limit(&symbol, side, slice.quantity, limit, TimeInForce::Ioc)
                }
                None => OrderRequest::market(&symbol, side, slice.quantity),
            };
            let simulation = Simulation::new(TWAP_SENTINEL_BASE + i64::from(slice.index))
                .fill_price(price)
                .latency(DRY_RUN_SLICE_LATENCY);

            match submitter.submit_with(&order, simulation).await {
                Ok(record) => {
                    info!(
                        slice = slice.index,
                        total_slices = plan.num_slices,
                        order_id = record.order_id,
                        executed_qty = %record.executed_qty,
                        avg_price = %record.avg_price,
                        "TWAP slice executed"
                    );
                    println!(
                        "    ✅ Filled: {} @ ${}",
                        record.executed_qty,
                        record.avg_price.round_dp(2)
                    );
                    executed.push(record);
                }
                Err(e) => {
                    failed_slices += 1;
                    error!(slice = slice.index, error = %e, "TWAP slice failed");
                    println!("    ❌ Failed: {}", e);

                    if slice.index < plan.num_slices {
                        let question = "Continue with remaining slices? (yes/no): ";
                        match submitter.ask_or_shutdown(question, &mut shutdown).await {
                            Some(true) => {}
                            Some(false) => {
                                completion = TwapCompletion::Declined;
                                break;
                            }
                            None => {
                                completion = TwapCompletion::Interrupted;
                                break;
                            }
                        }
                    }
                }
            }
        }

        let report = TwapReport {
            symbol,
            side,
            plan,
            start_price,
            executed,
            failed_slices,
            completion,
        };
        print_report(&report);
        Ok(report)
    }
}

fn print_report(report: &TwapReport) {
    let summary = report.summary();

    match report.completion {
        TwapCompletion::Completed => section("TWAP EXECUTION COMPLETED"),
        TwapCompletion::Declined => section("TWAP EXECUTION STOPPED"),
        TwapCompletion::Interrupted => section("TWAP EXECUTION INTERRUPTED"),
    }
    println!("Symbol:               {}", report.symbol);
    println!("Side:                 {}", report.side);
    println!(
        "Slices Executed:      {}/{}",
        summary.slices_executed, report.plan.num_slices
    );
    println!("Failed Slices:        {}", report.failed_slices);
    println!("Total Executed:       {}", summary.total_quantity);
    println!("Average Price:        ${}", summary.average_price.round_dp(2));
    println!("Total Cost:           ${} USDT", summary.total_cost.round_dp(2));
    if summary.slices_executed > 0 {
        println!(
            "Price Range:          ${} - ${} (${})",
            summary.min_price.round_dp(2),
            summary.max_price.round_dp(2),
            summary.price_range().round_dp(2)
        );
        println!(
            "Drift vs Start:       {}%",
            summary.drift_pct(report.start_price).round_dp(3)
        );
    }
    rule();

    info!(
        symbol = %report.symbol,
        slices_executed = summary.slices_executed,
        failed = report.failed_slices,
        total_quantity = %summary.total_quantity,
        average_price = %summary.average_price,
        completion = ?report.completion,
        "TWAP finished"
    );
}
