//! In-process peripheral that "delivers" notifications to simulated centrals.
//!
//! Every notification reads the characteristic value, decodes it for the log
//! and is forwarded on an optional event channel, which is how tests and the
//! binary observe the telemetry stream without a radio.

use crate::gatt;
use crate::peripheral::types::{
    CharacteristicDefinition, DeviceConfiguration, NotificationEvent, PeripheralError,
    PeripheralState, ServiceDefinition,
};
use crate::peripheral::Peripheral;
use async_trait::async_trait;
use crossbeam::channel::{Receiver, Sender};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Loopback implementation of [`Peripheral`].
pub struct LoopbackPeripheral {
    /// Applied device configuration
    device: Option<DeviceConfiguration>,
    /// Registered services
    services: Vec<ServiceDefinition>,
    /// Number of simulated subscribed centrals
    subscribers: usize,
    /// Characteristics whose deliveries fail
    failing: HashSet<Uuid>,
    /// Power/advertising state
    state: Mutex<PeripheralState>,
    /// Channel for sending notification events
    event_tx: Option<Sender<NotificationEvent>>,
    /// Successful notifications
    delivered: AtomicU64,
}

impl LoopbackPeripheral {
    /// Create a peripheral with `subscribers` connected centrals.
    pub fn new(subscribers: usize) -> Self {
        Self {
            device: None,
            services: Vec::new(),
            subscribers,
            failing: HashSet::new(),
            state: Mutex::new(PeripheralState::Off),
            event_tx: None,
            delivered: AtomicU64::new(0),
        }
    }

    /// Get a receiver for notification events.
    pub fn event_receiver(&mut self) -> Receiver<NotificationEvent> {
        let (tx, rx) = crossbeam::channel::unbounded();
        self.event_tx = Some(tx);
        rx
    }

    /// Make every notification of `characteristic` fail delivery.
    pub fn fail_deliveries_to(&mut self, characteristic: Uuid) {
        self.failing.insert(characteristic);
    }

    pub fn device(&self) -> Option<&DeviceConfiguration> {
        self.device.as_ref()
    }

    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }

    pub async fn state(&self) -> PeripheralState {
        *self.state.lock().await
    }

    /// Number of notifications delivered so far.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    fn characteristic(&self, uuid: &Uuid) -> Option<&CharacteristicDefinition> {
        self.services.iter().find_map(|s| s.characteristic(uuid))
    }

    /// Serve a central's read request.
    pub async fn read(&self, characteristic: Uuid) -> Result<Vec<u8>, PeripheralError> {
        if *self.state.lock().await == PeripheralState::Off {
            return Err(PeripheralError::NotPoweredOn);
        }
        let definition = self
            .characteristic(&characteristic)
            .ok_or(PeripheralError::UnknownCharacteristic(characteristic))?;
        if !definition.properties.read {
            return Err(PeripheralError::NotReadable(characteristic));
        }
        Ok(definition.value.read().await)
    }

    async fn set_state(&self, from: &[PeripheralState], to: PeripheralState) -> Result<(), PeripheralError> {
        let mut state = self.state.lock().await;
        if !from.contains(&*state) {
            return Err(PeripheralError::NotPoweredOn);
        }
        tracing::info!("Peripheral {} -> {}", *state, to);
        *state = to;
        Ok(())
    }
}

impl Default for LoopbackPeripheral {
    fn default() -> Self {
        Self::new(1)
    }
}

#[async_trait]
impl Peripheral for LoopbackPeripheral {
    fn configure(&mut self, device: DeviceConfiguration) -> Result<(), PeripheralError> {
        if device.name.is_empty() {
            return Err(PeripheralError::InvalidConfiguration(
                "device name is empty".to_string(),
            ));
        }
        if device.advertising_interval_min_ms > device.advertising_interval_max_ms {
            return Err(PeripheralError::InvalidConfiguration(format!(
                "advertising interval {}..{} ms",
                device.advertising_interval_min_ms, device.advertising_interval_max_ms
            )));
        }
        tracing::info!("Configured device {} ({})", device.name, device.address);
        self.device = Some(device);
        Ok(())
    }

    fn add_service(&mut self, service: ServiceDefinition) -> Result<(), PeripheralError> {
        if self.services.iter().any(|s| s.uuid == service.uuid) {
            return Err(PeripheralError::DuplicateService(service.uuid));
        }
        tracing::debug!(
            "Registered service {} with {} characteristics",
            service.name,
            service.characteristics.len()
        );
        self.services.push(service);
        Ok(())
    }

    async fn power_on(&self) -> Result<(), PeripheralError> {
        if self.device.is_none() {
            return Err(PeripheralError::InvalidConfiguration(
                "device not configured".to_string(),
            ));
        }
        self.set_state(&[PeripheralState::Off, PeripheralState::On], PeripheralState::On)
            .await
    }

    async fn start_advertising(&self) -> Result<(), PeripheralError> {
        self.set_state(
            &[PeripheralState::On, PeripheralState::Advertising],
            PeripheralState::Advertising,
        )
        .await
    }

    async fn stop_advertising(&self) -> Result<(), PeripheralError> {
        self.set_state(
            &[PeripheralState::On, PeripheralState::Advertising],
            PeripheralState::On,
        )
        .await
    }

    async fn power_off(&self) -> Result<(), PeripheralError> {
        let mut state = self.state.lock().await;
        tracing::info!("Peripheral {} -> {}", *state, PeripheralState::Off);
        *state = PeripheralState::Off;
        Ok(())
    }

    async fn notify_subscribers(&self, characteristic: Uuid) -> Result<usize, PeripheralError> {
        let definition = self
            .characteristic(&characteristic)
            .ok_or(PeripheralError::UnknownCharacteristic(characteristic))?;
        if !definition.properties.notify {
            return Err(PeripheralError::NotNotifiable(characteristic));
        }
        if *self.state.lock().await != PeripheralState::Advertising {
            return Err(PeripheralError::NotPoweredOn);
        }

        let payload = definition.value.read().await;

        if self.failing.contains(&characteristic) {
            return Err(PeripheralError::DeliveryFailed(format!(
                "{} has no reachable subscribers",
                definition.name
            )));
        }

        let summary = gatt::describe(&characteristic, &payload);
        tracing::debug!("Notify {}: {}", definition.name, summary);

        self.delivered.fetch_add(1, Ordering::Relaxed);
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(NotificationEvent {
                characteristic,
                name: definition.name.clone(),
                payload,
                summary,
                delivered_to: self.subscribers,
                timestamp: Instant::now(),
            });
        }

        Ok(self.subscribers)
    }
}
