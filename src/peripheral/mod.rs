//! Interface to the BLE peripheral stack.
//!
//! The simulator only needs device configuration, service registration and a
//! per-characteristic "notify subscribers" primitive. [`LoopbackPeripheral`]
//! implements it in-process.

pub mod loopback;
pub mod types;

pub use loopback::LoopbackPeripheral;
pub use types::{
    CharacteristicDefinition, CharacteristicSource, CharacteristicValue, DeviceConfiguration,
    NotificationEvent, PeripheralError, PeripheralState, Properties, ServiceDefinition,
};

use async_trait::async_trait;
use uuid::Uuid;

/// A BLE peripheral able to host GATT services.
///
/// Registration happens before the peripheral is shared; everything after
/// `power_on` works through `&self`.
#[async_trait]
pub trait Peripheral: Send + Sync {
    /// Apply identity and advertising parameters.
    fn configure(&mut self, device: DeviceConfiguration) -> Result<(), PeripheralError>;

    /// Register a primary service.
    fn add_service(&mut self, service: ServiceDefinition) -> Result<(), PeripheralError>;

    async fn power_on(&self) -> Result<(), PeripheralError>;

    async fn start_advertising(&self) -> Result<(), PeripheralError>;

    async fn stop_advertising(&self) -> Result<(), PeripheralError>;

    async fn power_off(&self) -> Result<(), PeripheralError>;

    /// Read the characteristic and push its value to every subscribed central.
    ///
    /// Returns the number of centrals reached.
    async fn notify_subscribers(&self, characteristic: Uuid) -> Result<usize, PeripheralError>;
}
