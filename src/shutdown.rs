use tokio_util::sync::CancellationToken;
use tracing::info;

/// Wait for a termination signal, then cancel the shared token so in-flight
/// work (the slot watcher in particular) winds down before the process exits.
pub async fn handle_signals(token: CancellationToken) {
    let signal = wait_for_signal().await;
    info!("Received {}, shutting down", signal);
    token.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

#[cfg(windows)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::windows::{ctrl_break, ctrl_c};

    let mut ctrlc = ctrl_c().expect("Ctrl+C handler");
    let mut ctrlbreak = ctrl_break().expect("Ctrl+Break handler");

    tokio::select! {
        _ = ctrlc.recv() => "Ctrl+C",
        _ = ctrlbreak.recv() => "Ctrl+Break",
    }
}
