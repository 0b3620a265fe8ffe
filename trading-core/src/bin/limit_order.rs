// src/bin/limit_order.rs
// Usage:
//   limit_order place BTCUSDT BUY 0.01 50000 [--tif GTC]
//   limit_order cancel BTCUSDT 123456
//   limit_order status BTCUSDT 123456
//   limit_order open [BTCUSDT]
//   limit_order modify BTCUSDT 123456 0.02 49500

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::process::ExitCode;

use trading_common::data::TimeInForce;
use trading_core::cli::{bootstrap, exit_code, section, CommonArgs};
use trading_core::live_trading::limit::{
    cancel_order, check_order_status, modify_order, open_orders, place_limit_order, print_orders,
};

#[derive(Parser)]
#[command(name = "limit_order")]
#[command(about = "Place and manage limit orders on USDT-margined futures")]
struct Args {
    #[command(subcommand)]
    action: Action,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand)]
enum Action {
    /// Place a new limit order
    Place {
        symbol: String,
        side: String,
        quantity: Decimal,
        price: Decimal,
        /// GTC, IOC or FOK
        #[arg(long, default_value = "GTC")]
        tif: TimeInForce,
    },
    /// Cancel an open order
    Cancel { symbol: String, order_id: i64 },
    /// Show the current state of an order
    Status { symbol: String, order_id: i64 },
    /// List open orders
    Open { symbol: Option<String> },
    /// Cancel an order and re-place it with new quantity and price
    Modify {
        symbol: String,
        order_id: i64,
        quantity: Decimal,
        price: Decimal,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    exit_code(run(Args::parse()).await)
}

async fn run(args: Args) -> Result<()> {
    let session = bootstrap("limit order", &args.common)?;
    let ctx = &session.ctx;

    match args.action {
        Action::Place {
            symbol,
            side,
            quantity,
            price,
            tif,
        } => {
            place_limit_order(ctx, &symbol, &side, quantity, price, tif).await?;
        }
        Action::Cancel { symbol, order_id } => {
            let record = cancel_order(ctx, &symbol, order_id).await?;
            println!("\n✅ Order {} cancelled ({})", record.order_id, record.status);
        }
        Action::Status { symbol, order_id } => {
            let record = check_order_status(ctx, &symbol, order_id).await?;
            section("ORDER STATUS");
            print_orders(std::slice::from_ref(&record));
            println!("Executed: {} @ {}", record.executed_qty, record.avg_price);
        }
        Action::Open { symbol } => {
            let orders = open_orders(ctx, symbol.as_deref()).await?;
            section("OPEN ORDERS");
            print_orders(&orders);
        }
        Action::Modify {
            symbol,
            order_id,
            quantity,
            price,
        } => {
            let record = modify_order(ctx, &symbol, order_id, quantity, price).await?;
            println!("\n✅ Order replaced: new ID {}", record.order_id);
        }
    }

    Ok(())
}
