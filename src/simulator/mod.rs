//! Telemetry simulator: state, profiles and injectable randomness.

pub mod profile;
pub mod random;
pub mod state;

pub use profile::{
    BalanceReference, CadencePolicy, EncoderSettings, HeartRatePolicy, PowerFields, ProfileError,
    ProfileName, SimulatorProfile, TorqueSource,
};
pub use random::{RandomSource, ScriptedRandom, StdRandom, UniformRange};
pub use state::SimulatorState;

use crate::gatt::encoder;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// A profile, its state and the random source driving both.
pub struct Simulator {
    profile: SimulatorProfile,
    state: SimulatorState,
    rng: Box<dyn RandomSource>,
}

impl Simulator {
    /// Validate `profile` and draw the initial state from `rng`.
    pub fn new(
        profile: SimulatorProfile,
        mut rng: Box<dyn RandomSource>,
    ) -> Result<Self, ProfileError> {
        profile.validate()?;
        let state = SimulatorState::new(&profile, rng.as_mut());
        Ok(Self {
            profile,
            state,
            rng,
        })
    }

    /// Use an explicit state, e.g. to resume a scenario in tests.
    pub fn with_state(mut self, state: SimulatorState) -> Self {
        self.state = state;
        self
    }

    pub fn profile(&self) -> &SimulatorProfile {
        &self.profile
    }

    pub fn state(&self) -> &SimulatorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulatorState {
        &mut self.state
    }

    /// One vitals tick of the random walk.
    pub fn advance(&mut self) {
        self.state.advance(&self.profile, self.rng.as_mut());
    }

    pub fn heart_rate_measurement(&mut self) -> Vec<u8> {
        encoder::encode_heart_rate(&self.state, &self.profile.encoder, self.rng.as_mut())
    }

    pub fn cycling_power_measurement(&mut self) -> Vec<u8> {
        encoder::encode_cycling_power(&mut self.state, &self.profile.encoder, self.rng.as_mut())
    }

    /// Record a crank revolution at session time `now` and encode it.
    ///
    /// Callers are expected to wait for [`SimulatorState::next_revolution_due`]
    /// first; [`SimulatorHandle::csc_measurement`] does.
    pub fn csc_measurement(&mut self, now: Duration) -> Vec<u8> {
        encoder::encode_csc(&mut self.state, now)
    }

    pub fn battery_level(&self) -> Vec<u8> {
        encoder::encode_battery_level(&self.state)
    }
}

/// Shared, lockable simulator with a session clock.
///
/// The lock is never held across a sleep, so the vitals tick can advance the
/// state while a crank revolution is being paced.
#[derive(Clone)]
pub struct SimulatorHandle {
    inner: Arc<Mutex<Simulator>>,
    epoch: Instant,
}

impl SimulatorHandle {
    /// Start the session clock now.
    pub fn new(simulator: Simulator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(simulator)),
            epoch: Instant::now(),
        }
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.epoch)
    }

    pub async fn advance(&self) {
        self.inner.lock().await.advance();
    }

    pub async fn heart_rate_measurement(&self) -> Vec<u8> {
        self.inner.lock().await.heart_rate_measurement()
    }

    pub async fn cycling_power_measurement(&self) -> Vec<u8> {
        self.inner.lock().await.cycling_power_measurement()
    }

    /// Wait for the next crank revolution at the current cadence, then encode it.
    ///
    /// The due time is re-read after every wake-up since the vitals tick may
    /// change the cadence while this read is suspended.
    pub async fn csc_measurement(&self) -> Vec<u8> {
        loop {
            let due = {
                let mut simulator = self.inner.lock().await;
                let now = self.elapsed();
                let due = simulator.state().next_revolution_due();
                if now >= due {
                    return simulator.csc_measurement(now);
                }
                due
            };
            tokio::time::sleep_until(self.epoch + due).await;
        }
    }

    pub async fn battery_level(&self) -> Vec<u8> {
        self.inner.lock().await.battery_level()
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> SimulatorState {
        self.inner.lock().await.state().clone()
    }

    /// Copy of the active profile.
    pub async fn profile(&self) -> SimulatorProfile {
        self.inner.lock().await.profile().clone()
    }

    /// Run `f` with exclusive access to the simulator.
    pub async fn with<R>(&self, f: impl FnOnce(&mut Simulator) -> R) -> R {
        let mut simulator = self.inner.lock().await;
        f(&mut simulator)
    }
}
