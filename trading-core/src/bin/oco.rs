// src/bin/oco.rs
// Usage: oco BTCUSDT SELL 0.01 55000 48000 [--stop-limit 47900]

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use std::process::ExitCode;

use trading_core::cli::{bootstrap, exit_code, CommonArgs};
use trading_core::live_trading::oco::place_oco;
use trading_core::live_trading::OcoParams;

#[derive(Parser)]
#[command(name = "oco")]
#[command(about = "Place a take-profit and stop-loss pair for an open position")]
struct Args {
    symbol: String,

    /// Side of the exit orders: SELL closes a long, BUY closes a short
    side: String,

    quantity: Decimal,

    /// Take-profit limit price
    take_profit: Decimal,

    /// Stop-loss trigger price
    stop_price: Decimal,

    /// Stop-loss limit price, 0.1% through the trigger when omitted
    #[arg(long)]
    stop_limit: Option<Decimal>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    exit_code(run(Args::parse()).await)
}

async fn run(args: Args) -> Result<()> {
    let session = bootstrap("oco order", &args.common)?;

    let params = OcoParams {
        symbol: args.symbol,
        side: args.side,
        quantity: args.quantity,
        take_profit: args.take_profit,
        stop_price: args.stop_price,
        stop_limit_price: args.stop_limit,
    };
    place_oco(&session.ctx, &params).await?;
    Ok(())
}
