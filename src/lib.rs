//! Cycling Sensor Sim - Simulated BLE Cycling Sensors
//!
//! Emulates a power meter, a crank cadence sensor and a heart-rate strap.
//! A randomized telemetry state machine drifts power and heart rate toward
//! periodically re-rolled targets; GATT encoders turn the state into Heart
//! Rate, Cycling Power and CSC measurement payloads; a two-rate scheduler
//! pushes them to subscribers of a BLE peripheral.

pub mod config;
pub mod gatt;
pub mod peripheral;
pub mod scheduler;
pub mod simulator;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError};
pub use peripheral::{LoopbackPeripheral, Peripheral};
pub use scheduler::{NotificationScheduler, RunReport, StopReason};
pub use simulator::{Simulator, SimulatorHandle, SimulatorProfile, SimulatorState};
