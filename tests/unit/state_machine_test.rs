//! Unit tests for the telemetry state machine.

use cycling_sensor_sim::simulator::state::{converge, revolution_interval};
use cycling_sensor_sim::simulator::{
    ProfileError, ScriptedRandom, Simulator, SimulatorProfile, SimulatorState, StdRandom,
};
use std::time::Duration;

#[test]
fn test_initial_state() {
    let profile = SimulatorProfile::classic();
    let state = SimulatorState::new(&profile, &mut StdRandom::seeded(1));

    assert_eq!(state.power, 160);
    assert_eq!(state.power_target, 160);
    assert_eq!(state.heart_rate, 135);
    assert_eq!(state.cadence, 60);
    assert_eq!(state.step_length, 0);
    assert_eq!(state.heart_rate_step_length, 5);
    assert_eq!(state.accumulated_torque, 0);
    assert_eq!(state.accumulated_revolutions, 0);
}

#[test]
fn test_first_tick_rerolls_power_target() {
    let profile = SimulatorProfile::classic();
    let mut state = SimulatorState::new(&profile, &mut StdRandom::seeded(1));

    // Step length 9, bin 2 (240 W), power change 2
    let mut rng = ScriptedRandom::new([9, 2], [2]);
    state.advance(&profile, &mut rng);

    assert_eq!(state.power_target, 240);
    assert_eq!(state.step_length, 9);
    assert_eq!(state.power, 162);
    assert_eq!(state.heart_rate_step_length, 4);
}

#[test]
fn test_power_convergence_is_bounded() {
    let profile = SimulatorProfile::classic();
    let mut rng = StdRandom::seeded(42);
    let mut state = SimulatorState::new(&profile, &mut rng);

    for _ in 0..5000 {
        let before = state.power;
        state.advance(&profile, &mut rng);

        let change = state.power_change;
        assert!((state.power - before).abs() <= change);
        let distance_before = (before - state.power_target).abs();
        let distance_after = (state.power - state.power_target).abs();
        if distance_before >= change {
            assert_eq!(distance_after, distance_before - change);
        } else {
            assert!(distance_after < change);
        }
        // Overshoot stays below the largest power change of 3
        assert!((158..=302).contains(&state.power));
    }
}

#[test]
fn test_heart_rate_convergence_is_bounded() {
    let profile = SimulatorProfile::classic();
    let mut rng = StdRandom::seeded(7);
    let mut state = SimulatorState::new(&profile, &mut rng);

    for _ in 0..5000 {
        let before = state.heart_rate;
        state.advance(&profile, &mut rng);

        assert!((state.heart_rate - before).abs() <= state.heart_rate_change);
        // Overshoot stays below the largest heart-rate change of 5
        assert!((131..=184).contains(&state.heart_rate));
    }
}

#[test]
fn test_target_bins_follow_weights() {
    let profile = SimulatorProfile::classic();
    let mut rng = StdRandom::seeded(3);
    let mut state = SimulatorState::new(&profile, &mut rng);
    let mut counts = [0usize; 5];

    for _ in 0..20_000 {
        let rerolled = state.step_length == 0;
        state.advance(&profile, &mut rng);
        if rerolled {
            counts[state.target_index] += 1;
        }
    }

    assert!(counts[2] > counts[0]);
    assert!(counts[2] > counts[4]);
    assert!(counts[1] > counts[0]);
    assert!(counts[3] > counts[4]);
}

#[test]
fn test_coupled_heart_rate_follows_power() {
    let profile = SimulatorProfile::coupled();
    let mut state = SimulatorState::new(&profile, &mut StdRandom::seeded(1));
    state.step_length = 0;
    state.heart_rate_step_length = 0;

    // Step length 10, power change 4, lag 5; bin 3 (270 W)
    let mut rng = ScriptedRandom::new([10, 4, 5], [3]);
    state.advance(&profile, &mut rng);

    assert_eq!(state.power_target, 270);
    assert_eq!(state.heart_rate_target, 166);
    assert_eq!(state.heart_rate_change, 2);
    assert_eq!(state.cadence_target, 92);
    assert_eq!(state.heart_rate_step_length, 15);
}

#[test]
fn test_seeded_simulators_agree() {
    let mut a = Simulator::new(SimulatorProfile::full(), Box::new(StdRandom::seeded(99))).unwrap();
    let mut b = Simulator::new(SimulatorProfile::full(), Box::new(StdRandom::seeded(99))).unwrap();

    for _ in 0..200 {
        a.advance();
        b.advance();
        assert_eq!(a.heart_rate_measurement(), b.heart_rate_measurement());
        assert_eq!(a.cycling_power_measurement(), b.cycling_power_measurement());
    }
    assert_eq!(a.state(), b.state());
}

#[test]
fn test_simulator_rejects_invalid_profile() {
    let mut profile = SimulatorProfile::classic();
    profile.power_targets.clear();

    let result = Simulator::new(profile, Box::new(StdRandom::seeded(1)));
    assert!(matches!(result, Err(ProfileError::TableLength { .. })));
}

#[test]
fn test_converge_steps_by_full_change() {
    assert_eq!(converge(200, 240, 5), 205);
    assert_eq!(converge(238, 240, 5), 243);
    assert_eq!(converge(240, 200, 5), 235);
    assert_eq!(converge(202, 200, 5), 197);
    assert_eq!(converge(200, 200, 5), 200);
}

#[test]
fn test_one_tick_passes_close_target() {
    let profile = SimulatorProfile::classic();
    let mut state = SimulatorState::new(&profile, &mut StdRandom::seeded(1));
    state.step_length = 100;
    state.heart_rate_step_length = 100;
    state.power = 238;
    state.power_target = 240;
    state.power_change = 5;

    state.advance(&profile, &mut StdRandom::seeded(1));
    assert_eq!(state.power, 243);

    state.advance(&profile, &mut StdRandom::seeded(1));
    assert_eq!(state.power, 238);
}

#[test]
fn test_convergence_reaches_band_within_bound() {
    let profile = SimulatorProfile::classic();
    let mut rng = StdRandom::seeded(12);
    let target = 240;

    for (offset, change) in [(40, 5), (41, 5), (-37, 4), (7, 3), (2, 5), (0, 4), (100, 1), (-9, 3)] {
        let mut state = SimulatorState::new(&profile, &mut rng);
        state.step_length = 1000;
        state.heart_rate_step_length = 1000;
        state.power = target - offset;
        state.power_target = target;
        state.power_change = change;

        let bound = (offset.abs() + change - 1) / change;
        let mut distance = offset.abs();
        for _ in 0..bound {
            state.advance(&profile, &mut rng);
            let next = (state.power - target).abs();
            if distance >= change {
                assert!(next <= distance, "{offset}/{change}: {distance} -> {next}");
            }
            distance = next;
        }
        assert!(distance < change, "{offset}/{change}: {distance} after {bound} ticks");

        // Once inside the band the value never leaves it
        for _ in 0..50 {
            state.advance(&profile, &mut rng);
            assert!((state.power - target).abs() < change.max(1));
        }
        if offset % change == 0 {
            assert_eq!(state.power, target);
        }
    }
}

#[test]
fn test_slow_cadence_pacing() {
    assert_eq!(revolution_interval(30), Duration::from_secs(2));
    assert_eq!(revolution_interval(-5), Duration::from_secs(60));
}
