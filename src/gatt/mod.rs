//! GATT characteristics of the simulated sensors: assigned numbers, encoders,
//! decoders, the service table and the advertising payload.

pub mod advertising;
pub mod encoder;
pub mod parse;
pub mod services;
pub mod uuids;

pub use encoder::{
    cycling_power_flags, encode_battery_level, encode_csc, encode_cycling_power, encode_heart_rate,
};
pub use parse::{
    parse_csc_measurement, parse_cycling_power_measurement, parse_heart_rate_measurement,
    CscData, CyclingPowerData, HeartRateData,
};
pub use services::{build_services, Measurement, MeasurementSource};

use uuid::Uuid;

/// Human-readable description of a characteristic payload.
pub fn describe(characteristic: &Uuid, payload: &[u8]) -> String {
    let decoded = match *characteristic {
        uuids::HEART_RATE_MEASUREMENT_UUID => {
            parse_heart_rate_measurement(payload).map(|data| data.to_string())
        }
        uuids::CYCLING_POWER_MEASUREMENT_UUID => {
            parse_cycling_power_measurement(payload).map(|data| data.to_string())
        }
        uuids::CSC_MEASUREMENT_UUID => parse_csc_measurement(payload).map(|data| data.to_string()),
        uuids::BATTERY_LEVEL_UUID => payload.first().map(|level| format!("{level}%")),
        _ => None,
    };

    decoded.unwrap_or_else(|| format!("{payload:02x?}"))
}
