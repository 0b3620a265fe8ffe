// service/prompt.rs
// Human-in-the-loop confirmation

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tracing::warn;

/// Yes/no question put to the operator before anything irreversible
pub trait Confirm: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
}

/// Reads one line from stdin; only `yes` (any case) approves
pub struct StdinPrompt;

impl Confirm for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        print!("\n{}", question);
        if let Err(e) = io::stdout().flush() {
            warn!(error = %e, "failed to flush prompt");
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                warn!(error = %e, "failed to read confirmation, treating as no");
                false
            }
        }
    }
}

/// Approves everything (`--yes`)
pub struct AutoApprove;

impl Confirm for AutoApprove {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

/// Asks on a detached thread and stops waiting when `shutdown` fires.
/// `None` means interrupted. The thread is not joined, so a prompt still
/// blocked on stdin never holds up process exit.
pub async fn confirm_or_shutdown(
    confirmer: Arc<dyn Confirm>,
    question: &str,
    shutdown: &mut broadcast::Receiver<()>,
) -> Option<bool> {
    let (tx, rx) = oneshot::channel();
    let question = question.to_string();
    std::thread::spawn(move || {
        let _ = tx.send(confirmer.confirm(&question));
    });

    tokio::select! {
        answer = rx => Some(answer.unwrap_or(false)),
        Ok(()) = shutdown.recv() => {
            println!();
            warn!("prompt interrupted");
            None
        }
    }
}
