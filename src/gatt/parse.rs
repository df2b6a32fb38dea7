//! Central-side decoding of the measurement characteristics.
//!
//! Used to describe outgoing notifications in logs and to check encoded
//! payloads the way a receiving head unit would read them.

use crate::gatt::encoder::{
    CP_FLAG_BALANCE_PRESENT, CP_FLAG_BALANCE_REFERENCE_LEFT, CP_FLAG_CRANK_REVOLUTION_PRESENT,
    CP_FLAG_TORQUE_PRESENT, CP_FLAG_TORQUE_SOURCE_CRANK, CP_FLAG_WHEEL_REVOLUTION_PRESENT,
};
use std::fmt;

/// Parsed Cycling Power Measurement data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CyclingPowerData {
    /// Raw flags field
    pub flags: u16,
    /// Instantaneous power in watts
    pub power_watts: i16,
    /// Pedal power balance in percent (if present)
    pub power_balance_percent: Option<f32>,
    /// Balance is the left pedal's share
    pub balance_reference_left: bool,
    /// Accumulated torque in 1/32 Nm (if present)
    pub accumulated_torque: Option<u16>,
    /// Torque is measured at the crank
    pub torque_source_crank: bool,
    /// Cumulative crank revolutions (if present)
    pub crank_revolutions: Option<u16>,
    /// Last crank event time in 1/1024 s (if present)
    pub last_crank_event_time: Option<u16>,
}

/// Parse a Cycling Power Measurement notification.
///
/// Returns `None` when the payload is shorter than its flags announce.
pub fn parse_cycling_power_measurement(data: &[u8]) -> Option<CyclingPowerData> {
    if data.len() < 4 {
        return None;
    }

    let flags = u16::from_le_bytes([data[0], data[1]]);
    let power = i16::from_le_bytes([data[2], data[3]]);

    let mut result = CyclingPowerData {
        flags,
        power_watts: power,
        balance_reference_left: (flags & CP_FLAG_BALANCE_REFERENCE_LEFT) != 0,
        torque_source_crank: (flags & CP_FLAG_TORQUE_SOURCE_CRANK) != 0,
        ..Default::default()
    };

    let mut offset = 4usize;

    // Pedal Power Balance (bit 0)
    if (flags & CP_FLAG_BALANCE_PRESENT) != 0 {
        if offset + 1 > data.len() {
            return None;
        }
        result.power_balance_percent = Some(f32::from(data[offset]) / 2.0);
        offset += 1;
    }

    // Accumulated Torque (bit 2)
    if (flags & CP_FLAG_TORQUE_PRESENT) != 0 {
        if offset + 2 > data.len() {
            return None;
        }
        result.accumulated_torque = Some(u16::from_le_bytes([data[offset], data[offset + 1]]));
        offset += 2;
    }

    // Wheel Revolution Data (bit 4): u32 revolutions + u16 event time
    if (flags & CP_FLAG_WHEEL_REVOLUTION_PRESENT) != 0 {
        if offset + 6 > data.len() {
            return None;
        }
        offset += 6;
    }

    // Crank Revolution Data (bit 5)
    if (flags & CP_FLAG_CRANK_REVOLUTION_PRESENT) != 0 {
        if offset + 4 > data.len() {
            return None;
        }
        result.crank_revolutions = Some(u16::from_le_bytes([data[offset], data[offset + 1]]));
        result.last_crank_event_time =
            Some(u16::from_le_bytes([data[offset + 2], data[offset + 3]]));
    }

    Some(result)
}

impl fmt::Display for CyclingPowerData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} W", self.power_watts)?;
        if let Some(balance) = self.power_balance_percent {
            write!(f, ", balance {balance:.1}%")?;
        }
        if let Some(torque) = self.accumulated_torque {
            write!(f, ", torque {:.2} Nm", f32::from(torque) / 32.0)?;
        }
        if let (Some(revs), Some(time)) = (self.crank_revolutions, self.last_crank_event_time) {
            write!(f, ", crank {revs} @ {time}/1024s")?;
        }
        Ok(())
    }
}

/// Parsed Heart Rate Measurement data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartRateData {
    /// Heart rate in BPM
    pub heart_rate_bpm: u16,
}

/// Parse a Heart Rate Measurement notification in its UINT8 or UINT16 form.
///
/// Only flag bit 0 (value format) is interpreted.
pub fn parse_heart_rate_measurement(data: &[u8]) -> Option<HeartRateData> {
    let (&flags, value) = data.split_first()?;

    let heart_rate_bpm = if flags & 0x01 != 0 {
        u16::from_le_bytes([*value.first()?, *value.get(1)?])
    } else {
        u16::from(*value.first()?)
    };

    Some(HeartRateData { heart_rate_bpm })
}

impl fmt::Display for HeartRateData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpm", self.heart_rate_bpm)
    }
}

/// Parsed CSC Measurement data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CscData {
    /// Cumulative wheel revolutions and last wheel event time (if present)
    pub wheel: Option<(u32, u16)>,
    /// Cumulative crank revolutions (if present)
    pub crank_revolutions: Option<u16>,
    /// Last crank event time in 1/1024 s (if present)
    pub last_crank_event_time: Option<u16>,
}

/// Parse a CSC Measurement notification.
pub fn parse_csc_measurement(data: &[u8]) -> Option<CscData> {
    let flags = *data.first()?;
    let mut result = CscData::default();
    let mut offset = 1usize;

    // Wheel Revolution Data (bit 0)
    if (flags & 0x01) != 0 {
        if offset + 6 > data.len() {
            return None;
        }
        let revolutions = u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]);
        let time = u16::from_le_bytes([data[offset + 4], data[offset + 5]]);
        result.wheel = Some((revolutions, time));
        offset += 6;
    }

    // Crank Revolution Data (bit 1)
    if (flags & 0x02) != 0 {
        if offset + 4 > data.len() {
            return None;
        }
        result.crank_revolutions = Some(u16::from_le_bytes([data[offset], data[offset + 1]]));
        result.last_crank_event_time =
            Some(u16::from_le_bytes([data[offset + 2], data[offset + 3]]));
    }

    Some(result)
}

impl CscData {
    /// Cadence in RPM between `previous` and this measurement.
    ///
    /// Handles wrap-around of both counters; `None` without a time delta.
    pub fn cadence_since(&self, previous: &CscData) -> Option<f32> {
        let revs = self
            .crank_revolutions?
            .wrapping_sub(previous.crank_revolutions?);
        let ticks = self
            .last_crank_event_time?
            .wrapping_sub(previous.last_crank_event_time?);
        if ticks == 0 {
            return None;
        }
        Some(f32::from(revs) * 60.0 * 1024.0 / f32::from(ticks))
    }
}

impl fmt::Display for CscData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.crank_revolutions, self.last_crank_event_time) {
            (Some(revs), Some(time)) => write!(f, "crank {revs} @ {time}/1024s"),
            _ => write!(f, "no crank data"),
        }
    }
}
