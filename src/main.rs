//! Cycling Sensor Sim
//!
//! Main entry point: runs the simulated sensors on the loopback peripheral.

use anyhow::Context;
use clap::Parser;
use cycling_sensor_sim::config::{self, AppConfig};
use cycling_sensor_sim::gatt::{advertising, services};
use cycling_sensor_sim::peripheral::{LoopbackPeripheral, Peripheral};
use cycling_sensor_sim::scheduler::NotificationScheduler;
use cycling_sensor_sim::simulator::{ProfileName, Simulator, SimulatorHandle, StdRandom};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Simulated BLE power meter, cadence sensor and heart-rate strap.
#[derive(Parser, Debug)]
#[command(name = "cycling-sensor-sim", version, about)]
struct Cli {
    /// Config file (defaults to config.toml in the data directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in profile: classic, coupled or full
    #[arg(long)]
    profile: Option<ProfileName>,

    /// Seed for reproducible telemetry
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Write the effective configuration back to the config file and exit
    #[arg(long)]
    write_config: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    report_json: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(profile) = self.profile {
            config.profile = profile;
            config.custom_profile = None;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(secs) = self.duration_secs {
            config.scheduler.max_duration_secs = secs;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting Cycling Sensor Sim v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(cli.config.as_deref()).context("loading config")?;
    cli.apply(&mut config);

    if cli.write_config {
        let path = config::save_config(&config, cli.config.as_deref())
            .context("writing config")?;
        tracing::info!("Wrote config to {}", path.display());
        return Ok(());
    }

    let profile = config.simulator_profile().context("resolving profile")?;
    let power_fields = profile.encoder.power_fields;
    let simulator = Simulator::new(profile, Box::new(StdRandom::from_seed_option(config.seed)))
        .context("building simulator")?;
    let handle = SimulatorHandle::new(simulator);

    let mut peripheral = LoopbackPeripheral::new(config.device.subscribers);
    let events = peripheral.event_receiver();
    peripheral
        .configure(advertising::device_configuration(&config.device))
        .context("configuring peripheral")?;
    for service in services::build_services(&handle, &power_fields, &config.device) {
        peripheral.add_service(service).context("registering service")?;
    }

    // Notification log consumer
    std::thread::spawn(move || {
        for event in events {
            tracing::info!("{} -> {} central(s): {}", event.name, event.delivered_to, event.summary);
        }
    });

    let peripheral = Arc::new(peripheral);
    peripheral.power_on().await.context("powering on")?;
    peripheral.start_advertising().await.context("starting advertising")?;

    let scheduler = NotificationScheduler::new(peripheral.clone(), handle, config.scheduler.clone());
    let report = scheduler
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    peripheral.stop_advertising().await.context("stopping advertising")?;
    peripheral.power_off().await.context("powering off")?;

    if cli.report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        tracing::info!(
            "Run finished after {:.1}s ({}), {} notifications delivered, {} failed",
            report.elapsed_secs,
            report.stop_reason,
            report.notifications_sent,
            report.delivery_failures
        );
    }

    Ok(())
}
