//! GATT service table of the simulated sensor set.

use crate::config::DeviceSettings;
use crate::gatt::uuids::*;
use crate::peripheral::types::{
    CharacteristicDefinition, CharacteristicSource, CharacteristicValue, Properties,
    ServiceDefinition,
};
use crate::simulator::profile::PowerFields;
use crate::simulator::SimulatorHandle;
use async_trait::async_trait;
use std::sync::Arc;

/// Measurement characteristics backed by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    HeartRate,
    CyclingPower,
    Csc,
    BatteryLevel,
}

/// [`CharacteristicSource`] reading one measurement from the simulator.
pub struct MeasurementSource {
    simulator: SimulatorHandle,
    measurement: Measurement,
}

impl MeasurementSource {
    pub fn new(simulator: SimulatorHandle, measurement: Measurement) -> Self {
        Self {
            simulator,
            measurement,
        }
    }

    fn value(simulator: &SimulatorHandle, measurement: Measurement) -> CharacteristicValue {
        CharacteristicValue::Dynamic(Arc::new(Self::new(simulator.clone(), measurement)))
    }
}

#[async_trait]
impl CharacteristicSource for MeasurementSource {
    async fn read(&self) -> Vec<u8> {
        match self.measurement {
            Measurement::HeartRate => self.simulator.heart_rate_measurement().await,
            Measurement::CyclingPower => self.simulator.cycling_power_measurement().await,
            Measurement::Csc => self.simulator.csc_measurement().await,
            Measurement::BatteryLevel => self.simulator.battery_level().await,
        }
    }
}

/// Cycling Power Feature bits matching the reported measurement fields.
///
/// Bit 0 pedal power balance, bit 1 accumulated torque, bit 3 crank
/// revolution data.
pub fn cycling_power_feature(fields: &PowerFields) -> u32 {
    let mut features = 0u32;
    if fields.pedal_power_balance {
        features |= 0x0001;
    }
    if fields.accumulated_torque {
        features |= 0x0002;
    }
    if fields.crank_revolution_data {
        features |= 0x0008;
    }
    features
}

/// CSC Feature: crank revolution data supported (bit 1).
pub const CSC_FEATURE: u16 = 0x0002;

/// Build every service the simulated device exposes.
pub fn build_services(
    simulator: &SimulatorHandle,
    power_fields: &PowerFields,
    device: &DeviceSettings,
) -> Vec<ServiceDefinition> {
    vec![
        device_information_service(device),
        generic_access_service(device),
        ServiceDefinition::new(HEART_RATE_SERVICE_UUID, "Heart Rate")
            .with_characteristic(CharacteristicDefinition::new(
                HEART_RATE_MEASUREMENT_UUID,
                "Heart Rate Measurement",
                Properties::NOTIFY,
                MeasurementSource::value(simulator, Measurement::HeartRate),
            ))
            .with_characteristic(CharacteristicDefinition::new(
                BODY_SENSOR_LOCATION_UUID,
                "Body Sensor Location",
                Properties::READ,
                vec![device.body_sensor_location],
            )),
        ServiceDefinition::new(CYCLING_POWER_SERVICE_UUID, "Cycling Power")
            .with_characteristic(CharacteristicDefinition::new(
                CYCLING_POWER_MEASUREMENT_UUID,
                "Cycling Power Measurement",
                Properties::NOTIFY,
                MeasurementSource::value(simulator, Measurement::CyclingPower),
            ))
            .with_characteristic(CharacteristicDefinition::new(
                CYCLING_POWER_FEATURE_UUID,
                "Cycling Power Feature",
                Properties::READ,
                cycling_power_feature(power_fields).to_le_bytes().to_vec(),
            ))
            .with_characteristic(CharacteristicDefinition::new(
                SENSOR_LOCATION_UUID,
                "Sensor Location",
                Properties::READ,
                vec![device.power_sensor_location],
            )),
        ServiceDefinition::new(CSC_SERVICE_UUID, "Cycling Speed and Cadence")
            .with_characteristic(CharacteristicDefinition::new(
                CSC_MEASUREMENT_UUID,
                "CSC Measurement",
                Properties::NOTIFY,
                MeasurementSource::value(simulator, Measurement::Csc),
            ))
            .with_characteristic(CharacteristicDefinition::new(
                CSC_FEATURE_UUID,
                "CSC Feature",
                Properties::READ,
                CSC_FEATURE.to_le_bytes().to_vec(),
            ))
            .with_characteristic(CharacteristicDefinition::new(
                SENSOR_LOCATION_UUID,
                "Sensor Location",
                Properties::READ,
                vec![device.cadence_sensor_location],
            )),
        ServiceDefinition::new(BATTERY_SERVICE_UUID, "Battery").with_characteristic(
            CharacteristicDefinition::new(
                BATTERY_LEVEL_UUID,
                "Battery Level",
                Properties::READ_NOTIFY,
                MeasurementSource::value(simulator, Measurement::BatteryLevel),
            ),
        ),
    ]
}

fn device_information_service(device: &DeviceSettings) -> ServiceDefinition {
    let strings = [
        (MANUFACTURER_NAME_UUID, "Manufacturer Name", &device.manufacturer),
        (MODEL_NUMBER_UUID, "Model Number", &device.model_number),
        (SERIAL_NUMBER_UUID, "Serial Number", &device.serial_number),
        (FIRMWARE_REVISION_UUID, "Firmware Revision", &device.firmware_revision),
        (HARDWARE_REVISION_UUID, "Hardware Revision", &device.hardware_revision),
        (SOFTWARE_REVISION_UUID, "Software Revision", &device.software_revision),
    ];

    strings.into_iter().fold(
        ServiceDefinition::new(DEVICE_INFORMATION_SERVICE_UUID, "Device Information"),
        |service, (uuid, name, value)| {
            service.with_characteristic(CharacteristicDefinition::new(
                uuid,
                name,
                Properties::READ,
                value.as_str(),
            ))
        },
    )
}

fn generic_access_service(device: &DeviceSettings) -> ServiceDefinition {
    ServiceDefinition::new(GENERIC_ACCESS_SERVICE_UUID, "Generic Access")
        .with_characteristic(CharacteristicDefinition::new(
            DEVICE_NAME_UUID,
            "Device Name",
            Properties::READ,
            device.name.as_str(),
        ))
        .with_characteristic(CharacteristicDefinition::new(
            APPEARANCE_UUID,
            "Appearance",
            Properties::READ,
            device.appearance.to_le_bytes().to_vec(),
        ))
}
