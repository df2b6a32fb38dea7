//! Telemetry state and the per-tick random walk.

use crate::simulator::profile::{CadencePolicy, HeartRatePolicy, SimulatorProfile};
use crate::simulator::random::{sample_weighted, RandomSource};
use std::time::Duration;

/// Simulated rider and sensor state.
///
/// Mutated only by [`SimulatorState::advance`] and by the encoders that
/// accumulate torque and crank revolutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorState {
    /// Instantaneous power in watts
    pub power: i32,
    pub power_target: i32,
    /// Per-tick power step
    pub power_change: i32,
    /// Heart rate in BPM
    pub heart_rate: i32,
    pub heart_rate_target: i32,
    pub heart_rate_change: i32,
    /// Cadence in RPM
    pub cadence: i32,
    /// Only used by [`CadencePolicy::Independent`]
    pub cadence_target: i32,
    /// Accumulated torque in 1/32 Nm, wrapping
    pub accumulated_torque: u16,
    /// Cumulative crank revolutions, wrapping
    pub accumulated_revolutions: u16,
    /// Last crank event time in 1/1024 s, wrapping
    pub last_revolution_event_time: u16,
    /// Session time of the last crank event
    pub last_revolution_at: Duration,
    /// Ticks until the power target is re-rolled
    pub step_length: u32,
    /// Ticks until the heart-rate target is re-rolled
    pub heart_rate_step_length: u32,
    /// Target bin chosen by the last re-roll
    pub target_index: usize,
    /// Battery percentage, fixed for the session
    pub battery_level: u8,
}

impl SimulatorState {
    /// Initial state for a session.
    ///
    /// Power and heart rate start settled on the first table entries; the
    /// first [`advance`](Self::advance) re-rolls the power target.
    pub fn new(profile: &SimulatorProfile, rng: &mut dyn RandomSource) -> Self {
        let target_index = sample_weighted(rng, &profile.target_weights);
        let power_target = profile.power_targets[0];
        let heart_rate_target = profile.heart_rate.target_for(0, power_target);
        let heart_rate_change = match &profile.heart_rate {
            HeartRatePolicy::Indexed { change, .. } => change.sample(rng),
            HeartRatePolicy::PowerCoupled { .. } => 1,
        };
        let cadence_target = match &profile.cadence {
            CadencePolicy::PowerDriven { .. } => profile.initial_cadence,
            CadencePolicy::Independent { targets, .. } => targets[target_index],
        };
        let battery_level = profile.battery_level.sample(rng).clamp(0, 100) as u8;

        Self {
            power: power_target,
            power_target,
            power_change: 5,
            heart_rate: heart_rate_target,
            heart_rate_target,
            heart_rate_change,
            cadence: profile.initial_cadence,
            cadence_target,
            accumulated_torque: 0,
            accumulated_revolutions: 0,
            last_revolution_event_time: 0,
            last_revolution_at: Duration::ZERO,
            step_length: 0,
            heart_rate_step_length: 5,
            target_index,
            battery_level,
        }
    }

    /// Advance the simulation by one vitals tick.
    pub fn advance(&mut self, profile: &SimulatorProfile, rng: &mut dyn RandomSource) {
        if self.step_length > 0 {
            self.step_length -= 1;
        } else {
            self.reroll_power(profile, rng);
        }

        if self.heart_rate_step_length > 0 {
            self.heart_rate_step_length -= 1;
        } else {
            self.reroll_heart_rate(profile, rng);
        }

        self.power = converge(self.power, self.power_target, self.power_change);
        self.heart_rate = converge(self.heart_rate, self.heart_rate_target, self.heart_rate_change);

        match &profile.cadence {
            CadencePolicy::PowerDriven { min, max, step } => {
                if self.power < self.power_target {
                    self.cadence = (self.cadence + step.sample(rng)).min(*max);
                } else if self.power > self.power_target {
                    self.cadence = (self.cadence - step.sample(rng)).max(*min);
                }
                self.cadence = self.cadence.clamp(*min, *max);
            }
            CadencePolicy::Independent { change, .. } => {
                self.cadence = converge(self.cadence, self.cadence_target, *change);
            }
        }
    }

    fn reroll_power(&mut self, profile: &SimulatorProfile, rng: &mut dyn RandomSource) {
        self.step_length = profile.step_length.sample(rng).max(0) as u32;
        self.target_index = sample_weighted(rng, &profile.target_weights);
        self.power_target = profile.power_targets[self.target_index];
        if let CadencePolicy::Independent { targets, .. } = &profile.cadence {
            self.cadence_target = targets[self.target_index];
        }
        self.power_change = profile.power_change.sample(rng);

        tracing::info!(
            "New step: length {}, power target {} W, power change {}",
            self.step_length,
            self.power_target,
            self.power_change
        );
    }

    fn reroll_heart_rate(&mut self, profile: &SimulatorProfile, rng: &mut dyn RandomSource) {
        let lag = profile.heart_rate_lag.sample(rng).max(0) as u32;
        self.heart_rate_step_length = self.step_length + lag;
        self.heart_rate_target = profile
            .heart_rate
            .target_for(self.target_index, self.power_target);
        self.heart_rate_change = match &profile.heart_rate {
            HeartRatePolicy::Indexed { change, .. } => change.sample(rng),
            HeartRatePolicy::PowerCoupled {
                change_numerator,
                change_denominator,
                ..
            } => (self.power_change * change_numerator / change_denominator).max(1),
        };

        tracing::info!(
            "New heart rate step: length {}, target {} bpm, change {}",
            self.heart_rate_step_length,
            self.heart_rate_target,
            self.heart_rate_change
        );
    }

    /// Session time at which the next crank revolution is due.
    pub fn next_revolution_due(&self) -> Duration {
        self.last_revolution_at + revolution_interval(self.cadence)
    }

    /// Add `delta` (1/32 Nm) to the wrapping torque accumulator.
    pub fn accumulate_torque(&mut self, delta: u16) -> u16 {
        self.accumulated_torque = self.accumulated_torque.wrapping_add(delta);
        self.accumulated_torque
    }

    /// Record one crank revolution at session time `now`.
    pub fn record_revolution(&mut self, now: Duration) {
        self.accumulated_revolutions = self.accumulated_revolutions.wrapping_add(1);
        self.last_revolution_at = now;
        self.last_revolution_event_time = event_time_1024(now);
    }
}

/// Step `current` toward `target` by `change`.
///
/// There is no snapping: a step may pass the target by up to `change - 1`,
/// after which the value oscillates around it within that band.
pub fn converge(current: i32, target: i32, change: i32) -> i32 {
    if current < target {
        current.saturating_add(change)
    } else if current > target {
        current.saturating_sub(change)
    } else {
        current
    }
}

/// Time one crank revolution takes at `cadence` RPM.
///
/// A stalled cadence is paced as 1 RPM.
pub fn revolution_interval(cadence: i32) -> Duration {
    Duration::from_secs_f64(60.0 / f64::from(cadence.max(1)))
}

/// Session time expressed in the 1/1024 s wrapping units of event-time fields.
pub fn event_time_1024(elapsed: Duration) -> u16 {
    let ticks = elapsed.as_secs() * 1024 + u64::from(elapsed.subsec_nanos()) * 1024 / 1_000_000_000;
    (ticks % 65_536) as u16
}
