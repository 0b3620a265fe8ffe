// src/cli.rs
// Shared plumbing for the command binaries

use clap::Args;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::Settings;
use crate::context::TradingContext;
use crate::logging::init_logging;
use crate::service::{AutoApprove, Confirm, StdinPrompt};

pub const RULE_WIDTH: usize = 60;

/// Flags every command accepts
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Simulate orders without sending them to the exchange
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Debug output on the console
    #[arg(long, short)]
    pub verbose: bool,
}

/// Context plus the log flush guard; drop it last
pub struct Session {
    pub ctx: TradingContext,
    _log_guard: WorkerGuard,
}

/// Settings, logging, client. Prints the command banner.
pub fn bootstrap(command: &str, args: &CommonArgs) -> anyhow::Result<Session> {
    let settings = Settings::new()?;
    let log_guard = init_logging(&settings.logging, args.verbose)?;

    let confirmer: Arc<dyn Confirm> = if args.yes {
        Arc::new(AutoApprove)
    } else {
        Arc::new(StdinPrompt)
    };

    let ctx = TradingContext::connect(settings, confirmer, args.dry_run)?;
    print_banner(command, &ctx);
    info!(command, network = ctx.settings.network_name(), dry_run = args.dry_run, "command started");

    Ok(Session {
        ctx,
        _log_guard: log_guard,
    })
}

pub fn print_banner(command: &str, ctx: &TradingContext) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("FUTURES ORDER TOOLKIT :: {}", command.to_uppercase());
    println!(
        "Network: {}   Mode: {}",
        ctx.settings.network_name(),
        ctx.submitter.mode_label()
    );
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn section(title: &str) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("{}", title);
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn rule() {
    println!("{}", "=".repeat(RULE_WIDTH));
}

/// Broadcast channel that fires once on Ctrl-C
pub fn shutdown_channel() -> broadcast::Sender<()> {
    let (tx, _) = broadcast::channel(1);
    let signal_tx = tx.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping");
            let _ = signal_tx.send(());
        }
    });

    tx
}

/// 0 on success, 1 on anything else
pub fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("\n❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
