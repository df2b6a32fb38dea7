//! GATT definitions and errors shared with the BLE peripheral stack.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;
use thiserror::Error;
use uuid::Uuid;

/// Produces the current value of a dynamic characteristic.
///
/// Reads may suspend, e.g. while a crank revolution is being paced.
#[async_trait]
pub trait CharacteristicSource: Send + Sync {
    async fn read(&self) -> Vec<u8>;
}

/// Value of a characteristic.
#[derive(Clone)]
pub enum CharacteristicValue {
    /// Fixed bytes
    Static(Vec<u8>),
    /// Computed on every read or notification
    Dynamic(Arc<dyn CharacteristicSource>),
}

impl CharacteristicValue {
    pub async fn read(&self) -> Vec<u8> {
        match self {
            CharacteristicValue::Static(bytes) => bytes.clone(),
            CharacteristicValue::Dynamic(source) => source.read().await,
        }
    }
}

impl fmt::Debug for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacteristicValue::Static(bytes) => f.debug_tuple("Static").field(bytes).finish(),
            CharacteristicValue::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

impl From<Vec<u8>> for CharacteristicValue {
    fn from(bytes: Vec<u8>) -> Self {
        CharacteristicValue::Static(bytes)
    }
}

impl From<&str> for CharacteristicValue {
    fn from(text: &str) -> Self {
        CharacteristicValue::Static(text.as_bytes().to_vec())
    }
}

/// Characteristic properties relevant to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Properties {
    pub read: bool,
    pub notify: bool,
}

impl Properties {
    pub const READ: Properties = Properties {
        read: true,
        notify: false,
    };
    pub const NOTIFY: Properties = Properties {
        read: false,
        notify: true,
    };
    pub const READ_NOTIFY: Properties = Properties {
        read: true,
        notify: true,
    };
}

/// A characteristic registered with the peripheral.
#[derive(Debug, Clone)]
pub struct CharacteristicDefinition {
    pub uuid: Uuid,
    /// Human-readable name for logs
    pub name: String,
    pub properties: Properties,
    pub value: CharacteristicValue,
}

impl CharacteristicDefinition {
    pub fn new(
        uuid: Uuid,
        name: impl Into<String>,
        properties: Properties,
        value: impl Into<CharacteristicValue>,
    ) -> Self {
        Self {
            uuid,
            name: name.into(),
            properties,
            value: value.into(),
        }
    }
}

/// A primary service and its characteristics.
#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    pub uuid: Uuid,
    pub name: String,
    pub characteristics: Vec<CharacteristicDefinition>,
}

impl ServiceDefinition {
    pub fn new(uuid: Uuid, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            characteristics: Vec::new(),
        }
    }

    /// Builder-style characteristic registration.
    pub fn with_characteristic(mut self, characteristic: CharacteristicDefinition) -> Self {
        self.characteristics.push(characteristic);
        self
    }

    pub fn characteristic(&self, uuid: &Uuid) -> Option<&CharacteristicDefinition> {
        self.characteristics.iter().find(|c| &c.uuid == uuid)
    }
}

/// Identity and advertising parameters handed to the peripheral stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfiguration {
    /// Advertised device name
    pub name: String,
    /// Static random address, e.g. `F0:F1:F2:F3:F4:F6`
    pub address: String,
    /// Advertising interval bounds in milliseconds
    pub advertising_interval_min_ms: u32,
    pub advertising_interval_max_ms: u32,
    /// Raw advertising data (AD structures)
    pub advertising_data: Vec<u8>,
}

/// Power and advertising state of the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeripheralState {
    /// Controller off
    #[default]
    Off,
    /// Controller on, not advertising
    On,
    /// Advertising and accepting connections
    Advertising,
}

impl fmt::Display for PeripheralState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeripheralState::Off => write!(f, "Off"),
            PeripheralState::On => write!(f, "On"),
            PeripheralState::Advertising => write!(f, "Advertising"),
        }
    }
}

/// A notification pushed to subscribed centrals.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub characteristic: Uuid,
    pub name: String,
    pub payload: Vec<u8>,
    /// Decoded value for display
    pub summary: String,
    /// Number of centrals the notification reached
    pub delivered_to: usize,
    pub timestamp: Instant,
}

/// Errors raised by the peripheral stack.
#[derive(Debug, Error)]
pub enum PeripheralError {
    /// Device configuration missing or rejected
    #[error("Invalid device configuration: {0}")]
    InvalidConfiguration(String),

    /// Operation requires the controller to be powered on
    #[error("Peripheral is not powered on")]
    NotPoweredOn,

    /// A service with this UUID is already registered
    #[error("Service already registered: {0}")]
    DuplicateService(Uuid),

    /// No characteristic with this UUID is registered
    #[error("Unknown characteristic: {0}")]
    UnknownCharacteristic(Uuid),

    /// The characteristic does not support notifications
    #[error("Characteristic does not support notify: {0}")]
    NotNotifiable(Uuid),

    /// The characteristic does not support reads
    #[error("Characteristic does not support read: {0}")]
    NotReadable(Uuid),

    /// The notification could not be delivered
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
}
