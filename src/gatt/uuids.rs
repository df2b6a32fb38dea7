//! Bluetooth SIG assigned numbers used by the simulated sensors.

use uuid::Uuid;

/// Expand a 16-bit assigned number onto the Bluetooth base UUID.
pub const fn from_u16(short: u16) -> Uuid {
    Uuid::from_u128(((short as u128) << 96) | 0x0000_0000_0000_1000_8000_0080_5f9b_34fb)
}

/// 16-bit assigned number of a base-UUID derived UUID, if it is one.
pub fn to_u16(uuid: &Uuid) -> Option<u16> {
    let value = uuid.as_u128();
    let base = value & 0xffff_0000_ffff_ffff_ffff_ffff_ffff_ffff;
    let short = (value >> 96) & 0xffff_ffff;
    if base == 0x0000_0000_0000_1000_8000_0080_5f9b_34fb && short <= 0xffff {
        Some(short as u16)
    } else {
        None
    }
}

/// Generic Access Service UUID (0x1800)
pub const GENERIC_ACCESS_SERVICE_UUID: Uuid = from_u16(0x1800);

/// Device Name UUID (0x2A00)
pub const DEVICE_NAME_UUID: Uuid = from_u16(0x2a00);

/// Appearance UUID (0x2A01)
pub const APPEARANCE_UUID: Uuid = from_u16(0x2a01);

/// Device Information Service UUID (0x180A)
pub const DEVICE_INFORMATION_SERVICE_UUID: Uuid = from_u16(0x180a);

/// Model Number String UUID (0x2A24)
pub const MODEL_NUMBER_UUID: Uuid = from_u16(0x2a24);

/// Serial Number String UUID (0x2A25)
pub const SERIAL_NUMBER_UUID: Uuid = from_u16(0x2a25);

/// Firmware Revision String UUID (0x2A26)
pub const FIRMWARE_REVISION_UUID: Uuid = from_u16(0x2a26);

/// Hardware Revision String UUID (0x2A27)
pub const HARDWARE_REVISION_UUID: Uuid = from_u16(0x2a27);

/// Software Revision String UUID (0x2A28)
pub const SOFTWARE_REVISION_UUID: Uuid = from_u16(0x2a28);

/// Manufacturer Name String UUID (0x2A29)
pub const MANUFACTURER_NAME_UUID: Uuid = from_u16(0x2a29);

/// Heart Rate Service UUID (0x180D)
pub const HEART_RATE_SERVICE_UUID: Uuid = from_u16(0x180d);

/// Heart Rate Measurement UUID (0x2A37)
pub const HEART_RATE_MEASUREMENT_UUID: Uuid = from_u16(0x2a37);

/// Body Sensor Location UUID (0x2A38)
pub const BODY_SENSOR_LOCATION_UUID: Uuid = from_u16(0x2a38);

/// Battery Service UUID (0x180F)
pub const BATTERY_SERVICE_UUID: Uuid = from_u16(0x180f);

/// Battery Level UUID (0x2A19)
pub const BATTERY_LEVEL_UUID: Uuid = from_u16(0x2a19);

/// Cycling Speed and Cadence Service UUID (0x1816)
pub const CSC_SERVICE_UUID: Uuid = from_u16(0x1816);

/// CSC Measurement UUID (0x2A5B)
pub const CSC_MEASUREMENT_UUID: Uuid = from_u16(0x2a5b);

/// CSC Feature UUID (0x2A5C)
pub const CSC_FEATURE_UUID: Uuid = from_u16(0x2a5c);

/// Sensor Location UUID (0x2A5D)
pub const SENSOR_LOCATION_UUID: Uuid = from_u16(0x2a5d);

/// Cycling Power Service UUID (0x1818)
pub const CYCLING_POWER_SERVICE_UUID: Uuid = from_u16(0x1818);

/// Cycling Power Measurement UUID (0x2A63)
pub const CYCLING_POWER_MEASUREMENT_UUID: Uuid = from_u16(0x2a63);

/// Cycling Power Feature UUID (0x2A65)
pub const CYCLING_POWER_FEATURE_UUID: Uuid = from_u16(0x2a65);
