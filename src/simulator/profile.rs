//! Simulator profiles.
//!
//! A profile fixes everything that differs between simulated products: target
//! tables, step ranges, how heart rate and cadence follow power, jitter, and
//! which optional Cycling Power Measurement fields are reported.

use crate::simulator::random::UniformRange;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in profiles selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    /// Power-driven cadence, indexed heart rate, balance + torque
    #[default]
    Classic,
    /// Independent cadence target, power-coupled heart rate, balance + crank data
    Coupled,
    /// Power-driven cadence with every optional power field enabled
    Full,
}

impl ProfileName {
    /// All built-in profiles.
    pub const ALL: [ProfileName; 3] = [ProfileName::Classic, ProfileName::Coupled, ProfileName::Full];

    /// Build the profile this name refers to.
    pub fn profile(self) -> SimulatorProfile {
        match self {
            ProfileName::Classic => SimulatorProfile::classic(),
            ProfileName::Coupled => SimulatorProfile::coupled(),
            ProfileName::Full => SimulatorProfile::full(),
        }
    }
}

impl std::fmt::Display for ProfileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileName::Classic => write!(f, "classic"),
            ProfileName::Coupled => write!(f, "coupled"),
            ProfileName::Full => write!(f, "full"),
        }
    }
}

impl std::str::FromStr for ProfileName {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(ProfileName::Classic),
            "coupled" => Ok(ProfileName::Coupled),
            "full" => Ok(ProfileName::Full),
            other => Err(ProfileError::UnknownProfile(other.to_string())),
        }
    }
}

/// How heart-rate targets are chosen when the heart-rate countdown expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeartRatePolicy {
    /// Target comes from a table indexed by the current target bin.
    Indexed {
        /// One heart rate per target bin
        targets: Vec<i32>,
        /// Per-tick change, redrawn on every re-roll
        change: UniformRange,
    },
    /// Target follows the power target through a breakpoint table.
    PowerCoupled {
        /// `(min_power, heart_rate)` pairs sorted by power
        breakpoints: Vec<(i32, i32)>,
        /// Heart-rate change is `power_change * change_numerator / change_denominator`
        change_numerator: i32,
        change_denominator: i32,
    },
}

impl HeartRatePolicy {
    /// Heart rate the policy maps `power_target` (or `index`) to.
    pub fn target_for(&self, index: usize, power_target: i32) -> i32 {
        match self {
            HeartRatePolicy::Indexed { targets, .. } => targets[index.min(targets.len() - 1)],
            HeartRatePolicy::PowerCoupled { breakpoints, .. } => breakpoints
                .iter()
                .take_while(|(min_power, _)| power_target >= *min_power)
                .last()
                .or_else(|| breakpoints.first())
                .map(|&(_, heart_rate)| heart_rate)
                .unwrap_or_default(),
        }
    }
}

/// How cadence follows the ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CadencePolicy {
    /// Cadence rises while power is below target and falls while above.
    PowerDriven {
        /// Lowest cadence reached
        min: i32,
        /// Highest cadence reached
        max: i32,
        /// Per-tick cadence step
        step: UniformRange,
    },
    /// Cadence converges toward its own target, chosen with the power target.
    Independent {
        /// One cadence per target bin
        targets: Vec<i32>,
        /// Per-tick cadence change
        change: i32,
    },
}

/// Balance reference reported in the power flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceReference {
    /// Reference unknown (flag bit 1 clear)
    Unknown,
    /// Balance is the left pedal's share (flag bit 1 set)
    #[default]
    Left,
}

/// Source the accumulated torque is measured at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorqueSource {
    /// Wheel based (flag bit 3 clear)
    Wheel,
    /// Crank based (flag bit 3 set)
    #[default]
    Crank,
}

/// Optional Cycling Power Measurement fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerFields {
    /// Report pedal power balance
    pub pedal_power_balance: bool,
    pub balance_reference: BalanceReference,
    /// Report accumulated torque
    pub accumulated_torque: bool,
    pub torque_source: TorqueSource,
    /// Report crank revolution data
    pub crank_revolution_data: bool,
}

impl Default for PowerFields {
    fn default() -> Self {
        Self {
            pedal_power_balance: true,
            balance_reference: BalanceReference::Left,
            accumulated_torque: true,
            torque_source: TorqueSource::Crank,
            crank_revolution_data: false,
        }
    }
}

/// Jitter and per-read deltas applied while encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSettings {
    /// Added to heart rate on every read
    pub heart_rate_jitter: UniformRange,
    /// Added to power on every read
    pub power_jitter: UniformRange,
    /// Balance percentage, reported in 0.5 % units
    pub balance_percent: UniformRange,
    /// Added to accumulated torque on every read (1/32 Nm)
    pub torque_increment: UniformRange,
    pub power_fields: PowerFields,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            heart_rate_jitter: UniformRange::jitter(2),
            power_jitter: UniformRange::jitter(5),
            balance_percent: UniformRange::new(45, 55),
            torque_increment: UniformRange::fixed(34),
            power_fields: PowerFields::default(),
        }
    }
}

/// Complete description of a simulated sensor set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorProfile {
    /// Relative weight of each target bin
    pub target_weights: Vec<u32>,
    /// Power target (watts) of each bin
    pub power_targets: Vec<i32>,
    /// Ticks until the next power target
    pub step_length: UniformRange,
    /// Per-tick power change
    pub power_change: UniformRange,
    /// Extra ticks the heart-rate target lags behind the power target
    pub heart_rate_lag: UniformRange,
    pub heart_rate: HeartRatePolicy,
    pub cadence: CadencePolicy,
    /// Cadence at start-up
    pub initial_cadence: i32,
    /// Battery level drawn once per session
    pub battery_level: UniformRange,
    pub encoder: EncoderSettings,
}

impl Default for SimulatorProfile {
    fn default() -> Self {
        Self::classic()
    }
}

impl SimulatorProfile {
    /// Steady rider on a power meter with balance and torque.
    pub fn classic() -> Self {
        Self {
            target_weights: vec![1, 3, 5, 3, 1],
            power_targets: vec![160, 200, 240, 280, 300],
            step_length: UniformRange::new(3, 15),
            power_change: UniformRange::new(1, 3),
            heart_rate_lag: UniformRange::new(5, 10),
            heart_rate: HeartRatePolicy::Indexed {
                targets: vec![135, 145, 165, 175, 180],
                change: UniformRange::new(1, 5),
            },
            cadence: CadencePolicy::PowerDriven {
                min: 60,
                max: 70,
                step: UniformRange::new(1, 3),
            },
            initial_cadence: 60,
            battery_level: UniformRange::new(50, 99),
            encoder: EncoderSettings::default(),
        }
    }

    /// Heart rate and cadence tied to the power target.
    pub fn coupled() -> Self {
        Self {
            target_weights: vec![1, 3, 5, 3, 1],
            power_targets: vec![150, 190, 230, 270, 320],
            step_length: UniformRange::new(5, 20),
            power_change: UniformRange::new(2, 6),
            heart_rate_lag: UniformRange::new(5, 10),
            heart_rate: HeartRatePolicy::PowerCoupled {
                breakpoints: vec![(0, 120), (180, 138), (220, 152), (260, 166), (300, 178)],
                change_numerator: 1,
                change_denominator: 2,
            },
            cadence: CadencePolicy::Independent {
                targets: vec![78, 84, 88, 92, 96],
                change: 1,
            },
            initial_cadence: 80,
            battery_level: UniformRange::new(50, 99),
            encoder: EncoderSettings {
                heart_rate_jitter: UniformRange::jitter(5),
                power_jitter: UniformRange::jitter(20),
                power_fields: PowerFields {
                    accumulated_torque: false,
                    crank_revolution_data: true,
                    ..PowerFields::default()
                },
                ..EncoderSettings::default()
            },
        }
    }

    /// Every optional power field enabled.
    pub fn full() -> Self {
        Self {
            cadence: CadencePolicy::PowerDriven {
                min: 80,
                max: 100,
                step: UniformRange::new(1, 3),
            },
            initial_cadence: 80,
            encoder: EncoderSettings {
                torque_increment: UniformRange::new(30, 40),
                power_fields: PowerFields {
                    crank_revolution_data: true,
                    ..PowerFields::default()
                },
                ..EncoderSettings::default()
            },
            ..Self::classic()
        }
    }

    /// Number of target bins.
    pub fn bins(&self) -> usize {
        self.target_weights.len()
    }

    /// Check that tables line up and every range is usable.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let bins = self.bins();
        if bins == 0 || self.target_weights.iter().all(|&w| w == 0) {
            return Err(ProfileError::NoTargetWeight);
        }
        check_table("power_targets", self.power_targets.len(), bins)?;

        match &self.heart_rate {
            HeartRatePolicy::Indexed { targets, change } => {
                check_table("heart_rate.targets", targets.len(), bins)?;
                check_step("heart_rate.change", change)?;
            }
            HeartRatePolicy::PowerCoupled {
                breakpoints,
                change_numerator,
                change_denominator,
            } => {
                if breakpoints.is_empty() {
                    return Err(ProfileError::EmptyTable("heart_rate.breakpoints"));
                }
                if breakpoints.windows(2).any(|w| w[0].0 > w[1].0) {
                    return Err(ProfileError::UnsortedBreakpoints);
                }
                if *change_numerator <= 0 || *change_denominator <= 0 {
                    return Err(ProfileError::InvalidScale);
                }
            }
        }

        match &self.cadence {
            CadencePolicy::PowerDriven { min, max, step } => {
                if *min <= 0 || min > max {
                    return Err(ProfileError::InvalidCadenceBounds(*min, *max));
                }
                check_step("cadence.step", step)?;
            }
            CadencePolicy::Independent { targets, change } => {
                check_table("cadence.targets", targets.len(), bins)?;
                if targets.iter().any(|&t| t <= 0) || *change <= 0 {
                    return Err(ProfileError::InvalidCadenceBounds(
                        targets.iter().copied().min().unwrap_or_default(),
                        targets.iter().copied().max().unwrap_or_default(),
                    ));
                }
            }
        }

        check_range("step_length", &self.step_length)?;
        if self.step_length.min < 0 || self.heart_rate_lag.min < 0 {
            return Err(ProfileError::NegativeCountdown);
        }
        check_step("power_change", &self.power_change)?;
        check_range("heart_rate_lag", &self.heart_rate_lag)?;
        check_range("battery_level", &self.battery_level)?;
        if self.battery_level.min < 0 || self.battery_level.max > 100 {
            return Err(ProfileError::BatteryOutOfRange);
        }
        check_range("encoder.heart_rate_jitter", &self.encoder.heart_rate_jitter)?;
        check_range("encoder.power_jitter", &self.encoder.power_jitter)?;
        check_range("encoder.balance_percent", &self.encoder.balance_percent)?;
        check_range("encoder.torque_increment", &self.encoder.torque_increment)?;
        if self.encoder.torque_increment.min < 0 {
            return Err(ProfileError::NegativeIncrement("encoder.torque_increment"));
        }

        Ok(())
    }
}

fn check_table(name: &'static str, len: usize, bins: usize) -> Result<(), ProfileError> {
    if len != bins {
        return Err(ProfileError::TableLength {
            table: name,
            expected: bins,
            actual: len,
        });
    }
    Ok(())
}

fn check_range(name: &'static str, range: &UniformRange) -> Result<(), ProfileError> {
    if !range.is_valid() {
        return Err(ProfileError::InvalidRange {
            field: name,
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}

/// A per-tick step must move toward the target on every draw.
fn check_step(name: &'static str, range: &UniformRange) -> Result<(), ProfileError> {
    check_range(name, range)?;
    if range.min <= 0 {
        return Err(ProfileError::NonPositiveStep {
            field: name,
            min: range.min,
        });
    }
    Ok(())
}

/// Errors found while validating a profile.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Profile needs at least one target bin with non-zero weight")]
    NoTargetWeight,

    #[error("Table {table} has {actual} entries, expected {expected}")]
    TableLength {
        table: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Table {0} is empty")]
    EmptyTable(&'static str),

    #[error("Heart rate breakpoints must be sorted by power")]
    UnsortedBreakpoints,

    #[error("Heart rate change scale needs a positive numerator and denominator")]
    InvalidScale,

    #[error("Step {field} must be positive, lowest draw is {min}")]
    NonPositiveStep { field: &'static str, min: i32 },

    #[error("Increment {0} must not be negative")]
    NegativeIncrement(&'static str),

    #[error("Invalid cadence bounds: {0}..{1}")]
    InvalidCadenceBounds(i32, i32),

    #[error("Invalid range for {field}: {min}..={max}")]
    InvalidRange {
        field: &'static str,
        min: i32,
        max: i32,
    },

    #[error("Countdown ranges must not be negative")]
    NegativeCountdown,

    #[error("Battery level must stay within 0..=100")]
    BatteryOutOfRange,
}
