//! Notification scheduler.
//!
//! Two periodic timers drive the peripheral: the vitals tick advances the
//! simulation and notifies Heart Rate then Cycling Power; the faster cadence
//! tick notifies CSC, whose read paces itself to the simulated cadence. Both
//! run as futures joined in a single task and stop together when the run
//! duration elapses or the shutdown future resolves.

use crate::config::SchedulerSettings;
use crate::gatt::uuids::{
    CSC_MEASUREMENT_UUID, CYCLING_POWER_MEASUREMENT_UUID, HEART_RATE_MEASUREMENT_UUID,
};
use crate::peripheral::Peripheral;
use crate::simulator::SimulatorHandle;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use uuid::Uuid;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The configured maximum duration elapsed
    DurationElapsed,
    /// The shutdown future resolved
    Shutdown,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::DurationElapsed => write!(f, "duration elapsed"),
            StopReason::Shutdown => write!(f, "shutdown requested"),
        }
    }
}

/// Summary of a scheduler run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Run time in seconds
    pub elapsed_secs: f64,
    pub vitals_ticks: u64,
    pub cadence_ticks: u64,
    pub notifications_sent: u64,
    pub delivery_failures: u64,
    pub stop_reason: StopReason,
}

#[derive(Debug, Default)]
struct Counters {
    vitals_ticks: AtomicU64,
    cadence_ticks: AtomicU64,
    notifications_sent: AtomicU64,
    delivery_failures: AtomicU64,
}

/// Two-rate notification driver.
pub struct NotificationScheduler<P: Peripheral + ?Sized> {
    peripheral: Arc<P>,
    simulator: SimulatorHandle,
    settings: SchedulerSettings,
}

impl<P: Peripheral + ?Sized> NotificationScheduler<P> {
    pub fn new(peripheral: Arc<P>, simulator: SimulatorHandle, settings: SchedulerSettings) -> Self {
        Self {
            peripheral,
            simulator,
            settings,
        }
    }

    /// Run until the maximum duration elapses.
    pub async fn run(&self) -> RunReport {
        self.run_until(std::future::pending()).await
    }

    /// Run until the maximum duration elapses or `shutdown` resolves.
    ///
    /// Pending sleeps, including a CSC read waiting for its revolution, are
    /// dropped as soon as either happens.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) -> RunReport {
        let counters = Counters::default();
        let started_at = Utc::now();
        let start = Instant::now();
        let max_duration = self.settings.max_duration();

        tracing::info!(
            "Scheduler started: vitals every {:?}, cadence every {:?}, stopping after {:?}",
            self.settings.vitals_interval(),
            self.settings.cadence_interval(),
            max_duration
        );

        let stop_reason = tokio::select! {
            () = tokio::time::sleep(max_duration) => StopReason::DurationElapsed,
            () = shutdown => StopReason::Shutdown,
            (never, _) = futures::future::join(
                self.vitals_loop(&counters),
                self.cadence_loop(&counters),
            ) => match never {},
        };

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            elapsed_secs: start.elapsed().as_secs_f64(),
            vitals_ticks: counters.vitals_ticks.load(Ordering::Relaxed),
            cadence_ticks: counters.cadence_ticks.load(Ordering::Relaxed),
            notifications_sent: counters.notifications_sent.load(Ordering::Relaxed),
            delivery_failures: counters.delivery_failures.load(Ordering::Relaxed),
            stop_reason,
        };

        tracing::info!(
            "Scheduler stopped ({}): {} vitals ticks, {} cadence ticks, {} notifications, {} failures",
            report.stop_reason,
            report.vitals_ticks,
            report.cadence_ticks,
            report.notifications_sent,
            report.delivery_failures
        );

        report
    }

    async fn vitals_loop(&self, counters: &Counters) -> Infallible {
        let mut ticker = ticker(self.settings.vitals_interval());
        loop {
            ticker.tick().await;
            self.simulator.advance().await;
            counters.vitals_ticks.fetch_add(1, Ordering::Relaxed);

            self.deliver(HEART_RATE_MEASUREMENT_UUID, counters).await;
            self.deliver(CYCLING_POWER_MEASUREMENT_UUID, counters).await;
        }
    }

    async fn cadence_loop(&self, counters: &Counters) -> Infallible {
        let mut ticker = ticker(self.settings.cadence_interval());
        loop {
            ticker.tick().await;
            counters.cadence_ticks.fetch_add(1, Ordering::Relaxed);

            self.deliver(CSC_MEASUREMENT_UUID, counters).await;
        }
    }

    async fn deliver(&self, characteristic: Uuid, counters: &Counters) {
        match self.peripheral.notify_subscribers(characteristic).await {
            Ok(_) => {
                counters.notifications_sent.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                counters.delivery_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Notification for {} failed: {}", characteristic, e);
            }
        }
    }
}

/// Interval whose first tick is one period from now; late ticks are skipped.
fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}
