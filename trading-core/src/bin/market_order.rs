// src/bin/market_order.rs
// Usage: market_order BTCUSDT BUY 0.01 [--dry-run] [--yes]

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use std::process::ExitCode;

use trading_core::cli::{bootstrap, exit_code, CommonArgs};
use trading_core::live_trading::market::place_market_order;

#[derive(Parser)]
#[command(name = "market_order")]
#[command(about = "Place a market order on USDT-margined futures")]
struct Args {
    /// Trading pair, e.g. BTCUSDT
    symbol: String,

    /// BUY or SELL
    side: String,

    /// Order quantity in base asset
    quantity: Decimal,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    exit_code(run(Args::parse()).await)
}

async fn run(args: Args) -> Result<()> {
    let session = bootstrap("market order", &args.common)?;
    place_market_order(&session.ctx, &args.symbol, &args.side, args.quantity).await?;
    Ok(())
}
