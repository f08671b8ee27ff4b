use metalwatch_core::monitor::Monitor;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Runs one check immediately and then one per `period` until Ctrl-C or SIGTERM.
/// Checks never overlap: each tick awaits the previous check.
pub async fn run(monitor: &Monitor, period: Duration) -> anyhow::Result<()> {
    tracing::info!(
        interval_minutes = period.as_secs() / 60,
        "starting daemon mode; press Ctrl+C to stop"
    );

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("daemon stopped");
                return Ok(());
            }
            _ = ticker.tick() => {
                run_cycle(monitor).await;
            }
        }
    }
}

async fn run_cycle(monitor: &Monitor) {
    match monitor.run_check(chrono::Utc::now()).await {
        Ok(report) => {
            crate::report::print_check(&report, false);
            if report.has_fetch_failures() {
                tracing::warn!("check finished with fetch failures; next cycle will retry");
            }
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{err:#}"), "check cycle failed");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
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
}
