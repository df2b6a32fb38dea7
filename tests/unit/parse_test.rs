//! Unit tests for measurement decoding.

use cycling_sensor_sim::gatt::parse::{
    parse_csc_measurement, parse_cycling_power_measurement, parse_heart_rate_measurement, CscData,
};

#[test]
fn test_parse_heart_rate_u8() {
    // Flags: 0x00 (UINT8 format)
    // HR: 145 BPM
    let data = [0x00, 0x91];
    let result = parse_heart_rate_measurement(&data).unwrap();

    assert_eq!(result.heart_rate_bpm, 145);
    assert_eq!(result.to_string(), "145 bpm");
}

#[test]
fn test_parse_heart_rate_u16() {
    // Flags: 0x01 (UINT16 format)
    // HR: 160 BPM
    let data = [0x01, 0xA0, 0x00];
    let result = parse_heart_rate_measurement(&data).unwrap();

    assert_eq!(result.heart_rate_bpm, 160);
    assert_eq!(result.to_string(), "160 bpm");
}

#[test]
fn test_parse_heart_rate_ignores_other_flags() {
    // Contact and RR bits set, value still read as UINT8
    let data = [0x16, 0x91, 0x20, 0x03];
    let result = parse_heart_rate_measurement(&data).unwrap();

    assert_eq!(result.heart_rate_bpm, 145);
}

#[test]
fn test_parse_heart_rate_empty() {
    assert!(parse_heart_rate_measurement(&[]).is_none());
    assert!(parse_heart_rate_measurement(&[0x00]).is_none());
}

#[test]
fn test_parse_cycling_power_full() {
    // Flags: 0x002F (balance left, torque crank, crank revolution data)
    // Power: 280 W, balance 50 %, torque 0x0100, 7 revs @ 2048
    let data = [0x2F, 0x00, 0x18, 0x01, 0x64, 0x00, 0x01, 0x07, 0x00, 0x00, 0x08];
    let result = parse_cycling_power_measurement(&data).unwrap();

    assert_eq!(result.power_watts, 280);
    assert_eq!(result.power_balance_percent, Some(50.0));
    assert_eq!(result.accumulated_torque, Some(0x0100));
    assert_eq!(result.crank_revolutions, Some(7));
    assert_eq!(result.last_crank_event_time, Some(2048));
    assert_eq!(
        result.to_string(),
        "280 W, balance 50.0%, torque 8.00 Nm, crank 7 @ 2048/1024s"
    );
}

#[test]
fn test_parse_cycling_power_truncated() {
    // Balance flagged but missing
    assert!(parse_cycling_power_measurement(&[0x01, 0x00, 0xC8, 0x00]).is_none());
    // Shorter than flags + power
    assert!(parse_cycling_power_measurement(&[0x00, 0x00, 0xC8]).is_none());
}

#[test]
fn test_parse_cycling_power_negative() {
    let data = [0x00, 0x00, 0xF6, 0xFF];
    let result = parse_cycling_power_measurement(&data).unwrap();

    assert_eq!(result.power_watts, -10);
}

#[test]
fn test_parse_csc_crank_only() {
    // Flags: 0x02, 3 revs @ 1024
    let data = [0x02, 0x03, 0x00, 0x00, 0x04];
    let result = parse_csc_measurement(&data).unwrap();

    assert!(result.wheel.is_none());
    assert_eq!(result.crank_revolutions, Some(3));
    assert_eq!(result.last_crank_event_time, Some(1024));
}

#[test]
fn test_parse_csc_wheel_and_crank() {
    // Flags: 0x03, wheel 1000 revs @ 512, crank 9 revs @ 600
    let data = [
        0x03, 0xE8, 0x03, 0x00, 0x00, 0x00, 0x02, 0x09, 0x00, 0x58, 0x02,
    ];
    let result = parse_csc_measurement(&data).unwrap();

    assert_eq!(result.wheel, Some((1000, 512)));
    assert_eq!(result.crank_revolutions, Some(9));
    assert_eq!(result.last_crank_event_time, Some(600));
}

#[test]
fn test_parse_csc_truncated() {
    assert!(parse_csc_measurement(&[]).is_none());
    assert!(parse_csc_measurement(&[0x02, 0x01, 0x00]).is_none());
}

#[test]
fn test_cadence_across_wrap() {
    let previous = CscData {
        wheel: None,
        crank_revolutions: Some(u16::MAX),
        last_crank_event_time: Some(65024),
    };
    let current = CscData {
        wheel: None,
        crank_revolutions: Some(0),
        last_crank_event_time: Some(512),
    };

    // One revolution in 1024 ticks (1 s)
    let cadence = current.cadence_since(&previous).unwrap();
    assert!((cadence - 60.0).abs() < 0.01);
}

#[test]
fn test_cadence_without_time_delta() {
    let data = CscData {
        wheel: None,
        crank_revolutions: Some(5),
        last_crank_event_time: Some(100),
    };

    assert!(data.cadence_since(&data).is_none());
}
