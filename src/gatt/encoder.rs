//! Measurement characteristic encoders.
//!
//! Layouts follow the Bluetooth GATT Specification Supplement:
//! - Heart Rate Measurement (0x2A37): `[flags:u8][hr:u8]`
//! - Cycling Power Measurement (0x2A63):
//!   `[flags:u16][power:i16]{[balance:i8]}{[torque:u16]}{[revs:u16][time:u16]}`
//! - CSC Measurement (0x2A5B): `[flags:u8][revs:u16][time:u16]`
//! - Battery Level (0x2A19): `[level:u8]`
//!
//! Multi-byte fields are little-endian.

use crate::simulator::profile::{BalanceReference, EncoderSettings, PowerFields, TorqueSource};
use crate::simulator::random::RandomSource;
use crate::simulator::state::SimulatorState;
use std::time::Duration;

/// Heart Rate Measurement flags: UINT8 value, no contact, energy or RR data.
pub const HEART_RATE_FLAGS: u8 = 0x00;

/// Pedal Power Balance present (bit 0)
pub const CP_FLAG_BALANCE_PRESENT: u16 = 0x0001;
/// Pedal Power Balance reference is left (bit 1)
pub const CP_FLAG_BALANCE_REFERENCE_LEFT: u16 = 0x0002;
/// Accumulated Torque present (bit 2)
pub const CP_FLAG_TORQUE_PRESENT: u16 = 0x0004;
/// Accumulated Torque source is crank (bit 3)
pub const CP_FLAG_TORQUE_SOURCE_CRANK: u16 = 0x0008;
/// Wheel Revolution Data present (bit 4), never emitted
pub const CP_FLAG_WHEEL_REVOLUTION_PRESENT: u16 = 0x0010;
/// Crank Revolution Data present (bit 5)
pub const CP_FLAG_CRANK_REVOLUTION_PRESENT: u16 = 0x0020;

/// CSC Measurement flags: crank revolution data present (bit 1).
pub const CSC_FLAGS_CRANK_ONLY: u8 = 0x02;

/// Cycling Power Measurement flags for the enabled fields.
pub fn cycling_power_flags(fields: &PowerFields) -> u16 {
    let mut flags = 0u16;

    if fields.pedal_power_balance {
        flags |= CP_FLAG_BALANCE_PRESENT;
        if fields.balance_reference == BalanceReference::Left {
            flags |= CP_FLAG_BALANCE_REFERENCE_LEFT;
        }
    }

    if fields.accumulated_torque {
        flags |= CP_FLAG_TORQUE_PRESENT;
        if fields.torque_source == TorqueSource::Crank {
            flags |= CP_FLAG_TORQUE_SOURCE_CRANK;
        }
    }

    if fields.crank_revolution_data {
        flags |= CP_FLAG_CRANK_REVOLUTION_PRESENT;
    }

    flags
}

/// Encoded length of a Cycling Power Measurement with these fields.
pub fn cycling_power_len(fields: &PowerFields) -> usize {
    4 + usize::from(fields.pedal_power_balance)
        + 2 * usize::from(fields.accumulated_torque)
        + 4 * usize::from(fields.crank_revolution_data)
}

/// Encode a Heart Rate Measurement.
///
/// The jittered value is truncated to 8 bits, so it wraps outside 0..=255.
pub fn encode_heart_rate(
    state: &SimulatorState,
    settings: &EncoderSettings,
    rng: &mut dyn RandomSource,
) -> Vec<u8> {
    let heart_rate = state
        .heart_rate
        .wrapping_add(settings.heart_rate_jitter.sample(rng));
    vec![HEART_RATE_FLAGS, heart_rate as u8]
}

/// Encode a Cycling Power Measurement.
///
/// Reading accumulates torque when the torque field is enabled. The crank
/// block reports the shared crank counters as last set by a CSC read.
pub fn encode_cycling_power(
    state: &mut SimulatorState,
    settings: &EncoderSettings,
    rng: &mut dyn RandomSource,
) -> Vec<u8> {
    let fields = &settings.power_fields;
    let mut data = Vec::with_capacity(cycling_power_len(fields));

    data.extend_from_slice(&cycling_power_flags(fields).to_le_bytes());

    let power = state.power.wrapping_add(settings.power_jitter.sample(rng));
    data.extend_from_slice(&(power as i16).to_le_bytes());

    if fields.pedal_power_balance {
        // 1/2 percent resolution
        let balance = settings.balance_percent.sample(rng) * 2;
        data.push((balance as i8) as u8);
    }

    if fields.accumulated_torque {
        // Profile validation keeps the increment non-negative
        let delta = settings.torque_increment.sample(rng) as u16;
        data.extend_from_slice(&state.accumulate_torque(delta).to_le_bytes());
    }

    if fields.crank_revolution_data {
        data.extend_from_slice(&state.accumulated_revolutions.to_le_bytes());
        data.extend_from_slice(&state.last_revolution_event_time.to_le_bytes());
    }

    data
}

/// Record one crank revolution at session time `now` and encode a CSC Measurement.
pub fn encode_csc(state: &mut SimulatorState, now: Duration) -> Vec<u8> {
    state.record_revolution(now);

    let mut data = Vec::with_capacity(5);
    data.push(CSC_FLAGS_CRANK_ONLY);
    data.extend_from_slice(&state.accumulated_revolutions.to_le_bytes());
    data.extend_from_slice(&state.last_revolution_event_time.to_le_bytes());
    data
}

/// Encode the Battery Level.
pub fn encode_battery_level(state: &SimulatorState) -> Vec<u8> {
    vec![state.battery_level]
}
