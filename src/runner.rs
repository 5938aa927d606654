use std::sync::Arc;
use tracing::info;

use crate::cli::RunArgs;
use webopener::config::Config;
use webopener::controller::{ControllerParts, ControllerService, StatusSnapshot};
use webopener::error::JobOutcome;
use webopener::host::memory::MemoryHost;
use webopener::host::process::BrowserCommandHost;
use webopener::host::terminal::{TerminalNotices, TerminalStatus};
use webopener::host::WindowHost;
use webopener::observability::Metrics;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Run one job to completion, cancelling it on Ctrl+C or SIGTERM
pub async fn run(config: Config, args: RunArgs) -> Result<(), AnyError> {
    let host: Arc<dyn WindowHost> = if args.dry_run {
        Arc::new(MemoryHost::new())
    } else {
        Arc::new(BrowserCommandHost::new(&config.window.browser_command)?)
    };

    let metrics = Arc::new(Metrics::new());
    let parts = ControllerParts {
        host,
        status: Arc::new(TerminalStatus),
        notices: Arc::new(TerminalNotices),
        metrics: metrics.clone(),
    };

    let (handle, task) = ControllerService::spawn(&config, parts);
    handle.start_job(args.url, args.delay, args.duration).await?;

    let final_status: StatusSnapshot = tokio::select! {
        status = handle.wait_for(StatusSnapshot::is_terminal) => status?,
        _ = shutdown_signal() => {
            handle.cancel().await?;
            handle.status()
        }
    };

    let success = final_status.outcome.as_ref().is_some_and(JobOutcome::is_success);
    info!(phase = %final_status.phase, success, metrics = ?metrics.snapshot(), "Job finished");
    if args.json {
        println!("{}", serde_json::to_string_pretty(&final_status)?);
    }

    drop(handle);
    task.await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, cancelling job");
}
