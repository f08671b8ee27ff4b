use metalwatch_core::config::Settings;
use metalwatch_core::domain::{BaselineSource, Threshold};
use metalwatch_core::monitor::{BaselineReport, CheckReport, MetalOutcome, Monitor, StatusReport};
use metalwatch_core::notify::render::rupees;
use metalwatch_core::notify::ChannelStatus;
use rust_decimal::Decimal;

fn tick(on: bool) -> &'static str {
    if on {
        "yes"
    } else {
        "no"
    }
}

fn change(drop_pct: Decimal) -> String {
    let pct = drop_pct.round_dp(2);
    if pct > Decimal::ZERO {
        format!("down {:.2}%", pct)
    } else {
        format!("up {:.2}%", pct.abs())
    }
}

fn channel(label: &str, status: &ChannelStatus) -> Option<String> {
    match status {
        ChannelStatus::Delivered => Some(format!("{label} sent")),
        ChannelStatus::Failed(reason) => Some(format!("{label} failed: {reason}")),
        ChannelStatus::NotConfigured => None,
    }
}

pub fn print_check(report: &CheckReport, dry_run: bool) {
    for check in &report.metals {
        let name = check.metal.as_str().to_ascii_uppercase();
        match &check.outcome {
            MetalOutcome::FetchFailed { error } => {
                println!("{name}: could not fetch price ({error})");
            }
            MetalOutcome::BaselineInitialized { quote } => {
                println!("{name}: {} (baseline recorded)", rupees(quote.price));
            }
            MetalOutcome::Checked {
                quote,
                baseline,
                drop_pct,
                alerts,
                rebaselined,
            } => {
                let delta = drop_pct.map(change).unwrap_or_default();
                println!(
                    "{name}: {} vs baseline {} {delta}",
                    rupees(quote.price),
                    rupees(baseline.price)
                );
                for alert in alerts {
                    let channels: Vec<String> = [
                        channel("email", &alert.outcome.email),
                        channel("sms", &alert.outcome.sms),
                    ]
                    .into_iter()
                    .flatten()
                    .collect();
                    println!(
                        "  ALERT {} drop: {}",
                        alert.event.threshold,
                        if dry_run {
                            "dry run, not sent".to_string()
                        } else if channels.is_empty() {
                            "no channel configured".to_string()
                        } else {
                            channels.join(", ")
                        }
                    );
                }
                if *rebaselined {
                    println!("  baseline moved to {}", rupees(quote.price));
                }
            }
        }
    }
}

pub fn print_baselines(report: &BaselineReport) {
    for (metal, price) in &report.set {
        println!("{}: baseline set to {}", metal.as_str().to_ascii_uppercase(), rupees(*price));
    }
    for (metal, error) in &report.failed {
        println!(
            "{}: could not fetch price, baseline unchanged ({error})",
            metal.as_str().to_ascii_uppercase()
        );
    }
    for metal in &report.shadowed {
        println!(
            "note: {} is set and still overrides the stored {metal} baseline",
            metal.baseline_env_key()
        );
    }
    if !report.set.is_empty() {
        println!("Alert state has been reset for the updated metals.");
    }
}

pub fn print_status(settings: &Settings, monitor: &Monitor, report: &StatusReport) {
    let enabled = monitor.evaluator().thresholds();
    println!("Configuration:");
    println!("  email configured: {}", tick(settings.email_configured()));
    match monitor.notifier().sms_gateway() {
        Some(gateway) => println!("  sms configured:   yes ({gateway:?})"),
        None => println!("  sms configured:   no"),
    }
    println!("  check interval:   {} minutes", settings.check_interval_minutes);
    for threshold in Threshold::ALL {
        println!("  {threshold} alert:        {}", tick(enabled.contains(&threshold)));
    }
    println!("  auto rebaseline:  {}", tick(settings.auto_rebaseline));
    println!("  state dir:        {}", settings.state_dir.display());

    for status in &report.metals {
        let name = status.metal.as_str().to_ascii_uppercase();
        println!();
        println!("{name}:");

        match &status.baseline {
            Some(b) => {
                let origin = match (b.source, b.set_at) {
                    (BaselineSource::Environment, _) => format!("from {}", status.metal.baseline_env_key()),
                    (BaselineSource::Stored, Some(at)) => format!("set {}", at.format("%Y-%m-%d %H:%M UTC")),
                    (BaselineSource::Stored, None) => "stored".to_string(),
                };
                println!("  baseline: {} ({origin})", rupees(b.price));
            }
            None => println!("  baseline: not set (run with --set-baseline)"),
        }

        match &status.quote {
            Ok(q) => {
                println!("  price (with GST):    {}", rupees(q.price));
                if let Some(p) = q.price_without_gst {
                    println!("  price (without GST): {}", rupees(p));
                }
                if let Some(p) = q.buy_price {
                    println!("  buy price:           {}", rupees(p));
                }
                if let Some(p) = q.sell_price {
                    println!("  sell price:          {}", rupees(p));
                }
                if let Some(d) = status.drop_pct {
                    println!("  change:              {}", change(d));
                }
            }
            Err(err) => println!("  price: unavailable ({err})"),
        }

        for alert in &status.alerts {
            match alert.notified_at {
                Some(at) => println!(
                    "  {} alert: sent {}",
                    alert.threshold,
                    at.format("%Y-%m-%d %H:%M UTC")
                ),
                None => println!("  {} alert: armed", alert.threshold),
            }
        }
    }
}
