// src/bin/balance_check.rs
// Usage: balance_check [BTCUSDT]
// Connectivity and account sanity check before trading.

use anyhow::{bail, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::info;

use trading_core::cli::{bootstrap, exit_code, rule, section, CommonArgs};
use trading_core::exchange::utils::normalize_symbol;

const RECENT_TRADES: u32 = 5;

#[derive(Parser)]
#[command(name = "balance_check")]
#[command(about = "Check exchange connectivity, wallet balance and open positions")]
struct Args {
    /// Also show the position for this symbol
    symbol: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    exit_code(run(Args::parse()).await)
}

async fn run(args: Args) -> Result<()> {
    let session = bootstrap("balance check", &args.common)?;
    let ctx = &session.ctx;

    if !ctx.settings.api.has_credentials() {
        bail!("Balance check needs BINANCE_API_KEY and BINANCE_API_SECRET");
    }

    ctx.api.ping().await?;
    println!("✅ Exchange reachable ({})", ctx.settings.network_name());

    let account = ctx.api.account().await?;
    let quote = ctx.settings.quote_asset.as_str();

    section("ACCOUNT");
    println!("Total Wallet Balance: ${}", account.total_wallet_balance.round_dp(2));
    println!("Unrealized PnL:       ${}", account.total_unrealized_profit.round_dp(2));
    println!("Available Balance:    ${}", account.available_balance.round_dp(2));
    match account.asset(quote) {
        Some(asset) => println!(
            "{} Wallet:          {} (available {})",
            quote,
            asset.wallet_balance.round_dp(4),
            asset.available_balance.round_dp(4)
        ),
        None => println!("{} Wallet:          none", quote),
    }
    rule();

    info!(
        wallet = %account.total_wallet_balance,
        available = %account.available_balance,
        "account fetched"
    );

    if let Some(symbol) = args.symbol {
        let symbol = normalize_symbol(&symbol);
        let positions = ctx.api.positions(&symbol).await?;

        section(&format!("POSITION {}", symbol));
        match positions.iter().find(|p| p.is_open()) {
            Some(p) => {
                println!("Size:                 {}", p.position_amt);
                println!("Entry Price:          ${}", p.entry_price);
                println!("Mark Price:           ${}", p.mark_price);
                println!("Unrealized PnL:       ${}", p.unrealized_profit.round_dp(2));
                println!("Leverage:             {}x", p.leverage);
            }
            None => println!("No open position"),
        }

        let trades = ctx.api.account_trades(&symbol, RECENT_TRADES).await?;
        if !trades.is_empty() {
            println!("\nRecent fills:");
            for t in &trades {
                println!(
                    "  {}  {:<4} {} @ {}  pnl {}  fee {} {}",
                    t.time.format("%Y-%m-%d %H:%M:%S"),
                    t.side,
                    t.qty,
                    t.price,
                    t.realized_pnl,
                    t.commission,
                    t.commission_asset
                );
            }
        }
        rule();
    }

    Ok(())
}
