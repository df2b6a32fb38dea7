//! Unit tests for simulator profiles.

use cycling_sensor_sim::simulator::{
    CadencePolicy, HeartRatePolicy, ProfileError, ProfileName, SimulatorProfile, UniformRange,
};

#[test]
fn test_classic_tables() {
    let profile = SimulatorProfile::classic();

    assert_eq!(profile.target_weights, vec![1, 3, 5, 3, 1]);
    assert_eq!(profile.power_targets, vec![160, 200, 240, 280, 300]);
    assert_eq!(profile.step_length, UniformRange::new(3, 15));
    assert_eq!(profile.power_change, UniformRange::new(1, 3));
    match profile.heart_rate {
        HeartRatePolicy::Indexed { targets, change } => {
            assert_eq!(targets, vec![135, 145, 165, 175, 180]);
            assert_eq!(change, UniformRange::new(1, 5));
        }
        other => panic!("unexpected heart rate policy: {other:?}"),
    }
}

#[test]
fn test_default_profile_is_classic() {
    assert_eq!(ProfileName::default(), ProfileName::Classic);
    assert_eq!(SimulatorProfile::default(), SimulatorProfile::classic());
}

#[test]
fn test_profile_names_round_trip_display() {
    for name in ProfileName::ALL {
        assert_eq!(name.to_string().parse::<ProfileName>(), Ok(name));
    }
}

#[test]
fn test_zero_weights_rejected() {
    let mut profile = SimulatorProfile::classic();
    profile.target_weights = vec![0; 5];

    assert_eq!(profile.validate(), Err(ProfileError::NoTargetWeight));
}

#[test]
fn test_inverted_range_rejected() {
    let mut profile = SimulatorProfile::classic();
    profile.power_change = UniformRange::new(5, 1);

    assert_eq!(
        profile.validate(),
        Err(ProfileError::InvalidRange {
            field: "power_change",
            min: 5,
            max: 1,
        })
    );
}

#[test]
fn test_negative_countdown_rejected() {
    let mut profile = SimulatorProfile::classic();
    profile.step_length = UniformRange::new(-2, 4);

    assert_eq!(profile.validate(), Err(ProfileError::NegativeCountdown));
}

#[test]
fn test_battery_range_rejected() {
    let mut profile = SimulatorProfile::classic();
    profile.battery_level = UniformRange::new(50, 120);

    assert_eq!(profile.validate(), Err(ProfileError::BatteryOutOfRange));
}

#[test]
fn test_unsorted_breakpoints_rejected() {
    let mut profile = SimulatorProfile::coupled();
    profile.heart_rate = HeartRatePolicy::PowerCoupled {
        breakpoints: vec![(200, 140), (100, 120)],
        change_numerator: 1,
        change_denominator: 2,
    };

    assert_eq!(profile.validate(), Err(ProfileError::UnsortedBreakpoints));
}

#[test]
fn test_steps_that_never_move_are_rejected() {
    let mut profile = SimulatorProfile::classic();
    profile.power_change = UniformRange::new(0, 2);
    assert_eq!(
        profile.validate(),
        Err(ProfileError::NonPositiveStep {
            field: "power_change",
            min: 0,
        })
    );

    let mut profile = SimulatorProfile::coupled();
    profile.heart_rate = HeartRatePolicy::PowerCoupled {
        breakpoints: vec![(100, 120), (200, 140)],
        change_numerator: 0,
        change_denominator: 2,
    };
    assert_eq!(profile.validate(), Err(ProfileError::InvalidScale));
}

#[test]
fn test_negative_torque_increment_rejected() {
    let mut profile = SimulatorProfile::full();
    profile.encoder.torque_increment = UniformRange::fixed(-34);

    assert_eq!(
        profile.validate(),
        Err(ProfileError::NegativeIncrement("encoder.torque_increment"))
    );

    profile.encoder.torque_increment = UniformRange::fixed(0);
    assert_eq!(profile.validate(), Ok(()));
}

#[test]
fn test_independent_cadence_table_length() {
    let mut profile = SimulatorProfile::coupled();
    profile.cadence = CadencePolicy::Independent {
        targets: vec![80, 90],
        change: 1,
    };

    assert!(matches!(
        profile.validate(),
        Err(ProfileError::TableLength {
            table: "cadence.targets",
            ..
        })
    ));
}

#[test]
fn test_profile_toml_round_trip() {
    let profile = SimulatorProfile::coupled();

    let text = toml::to_string(&profile).unwrap();
    let parsed: SimulatorProfile = toml::from_str(&text).unwrap();

    assert_eq!(parsed, profile);
}
