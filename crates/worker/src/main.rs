use anyhow::Context;
use clap::{ArgGroup, Parser};
use metalwatch_core::config::Settings;
use metalwatch_core::domain::Metal;
use metalwatch_core::monitor::Monitor;
use metalwatch_core::notify::Notifier;
use metalwatch_core::pricing::http::HttpJsonPriceProvider;
use metalwatch_core::storage::{JsonFileStore, MemoryStore, StateStore};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod daemon;
mod report;

#[derive(Debug, Parser)]
#[command(
    name = "metalwatch",
    about = "Watch gold and silver prices and alert on 10%/20% drops from a baseline"
)]
#[command(group(ArgGroup::new("mode").multiple(false)))]
#[command(group(ArgGroup::new("per_metal").args(["set_baseline", "reset_alerts"])))]
struct Args {
    /// Keep running and check every CHECK_INTERVAL_MINUTES.
    #[arg(short, long, group = "mode")]
    daemon: bool,

    /// Store the current prices as the new baselines (clears their alerts).
    #[arg(short = 'b', long, group = "mode")]
    set_baseline: bool,

    /// Forget which thresholds were already notified.
    #[arg(short, long, group = "mode")]
    reset_alerts: bool,

    /// Show configuration, baselines, alert state and current prices.
    #[arg(short, long, group = "mode")]
    status: bool,

    /// Check once without sending notifications or writing state.
    #[arg(long, group = "mode")]
    dry_run: bool,

    /// Limit --set-baseline or --reset-alerts to one metal.
    #[arg(long, value_parser = parse_metal, requires = "per_metal")]
    metal: Option<Metal>,
}

fn parse_metal(s: &str) -> Result<Metal, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let settings = Settings::from_env().inspect_err(|err| {
        tracing::error!(error = %err, "invalid configuration");
    })?;
    let _sentry_guard = init_sentry(&settings);

    let one_shot_check = !(args.daemon || args.set_baseline || args.reset_alerts || args.status || args.dry_run);
    if args.daemon || one_shot_check {
        settings.require_notification_channel().inspect_err(|err| {
            tracing::error!(error = %err, "refusing to check prices");
        })?;
    }

    let prices = Arc::new(HttpJsonPriceProvider::from_settings(&settings)?);
    let file_store = JsonFileStore::new(settings.state_dir.clone());

    if args.dry_run {
        let state = capture(file_store.load())?;
        let store = Arc::new(MemoryStore::new(state));
        let monitor = Monitor::from_settings(&settings, prices, store, Notifier::default());
        tracing::info!(dry_run = true, "checking prices without notifying or saving state");
        let check = capture(monitor.run_check(chrono::Utc::now()).await)?;
        report::print_check(&check, true);
        return Ok(exit_code(!check.has_fetch_failures()));
    }

    let notifier = Notifier::from_settings(&settings)?;
    let monitor = Monitor::from_settings(&settings, prices, Arc::new(file_store), notifier);

    let metals: Vec<Metal> = match args.metal {
        Some(metal) => vec![metal],
        None => Metal::ALL.to_vec(),
    };

    if args.set_baseline {
        let result = monitor.set_baselines(&metals, chrono::Utc::now()).await;
        let baseline_report = capture(result)?;
        report::print_baselines(&baseline_report);
        return Ok(exit_code(!baseline_report.has_failures()));
    }

    if args.reset_alerts {
        capture(monitor.reset_alerts(args.metal))?;
        match args.metal {
            Some(metal) => println!("Alert state has been reset for {metal}."),
            None => println!("Alert state has been reset."),
        }
        return Ok(ExitCode::SUCCESS);
    }

    if args.status {
        let status = capture(monitor.status().await)?;
        report::print_status(&settings, &monitor, &status);
        return Ok(ExitCode::SUCCESS);
    }

    if args.daemon {
        daemon::run(&monitor, settings.check_interval())
            .await
            .context("daemon loop failed")?;
        return Ok(ExitCode::SUCCESS);
    }

    let check = capture(monitor.run_check(chrono::Utc::now()).await)?;
    report::print_check(&check, false);
    Ok(exit_code(!check.has_fetch_failures()))
}

fn capture<T>(result: anyhow::Result<T>) -> anyhow::Result<T> {
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
    }
    result
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
