//! Operator console: typing `stop` or `exit` stops the scheduler.

use tokio::sync::mpsc;
use tracing::info;

use crate::scheduler::BotController;

pub fn is_stop_command(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "stop" | "exit")
}

/// Reads stdin on a dedicated OS thread and forwards each line.
///
/// A plain thread rather than `tokio::io::stdin`: a blocked read must not
/// keep the runtime from shutting down.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Consumes console lines until a stop command (or the end of input).
/// Returns true if a stop was requested.
pub async fn listen_for_stop(mut lines: mpsc::UnboundedReceiver<String>, bot: BotController) -> bool {
    println!("Type 'stop' or 'exit' to stop the scheduler.");
    while let Some(line) = lines.recv().await {
        if is_stop_command(&line) {
            info!("Stop command received from console");
            bot.request_stop();
            return true;
        }
    }
    false
}
