//! Mock drivetrain devices for hardware-free testing.
//!
//! [`MockActuators`] and [`MockEncoders`] are cheap cloneable handles over
//! shared state, so a test can hand one clone to the controller and keep
//! another to inspect or drive. [`DrivetrainSim`] ties the two together with
//! a simple motor response model, optionally with seeded slip noise.

mod noise;

pub use noise::NoiseGenerator;

use crate::error::Result;
use crate::hardware::{DriveActuators, WheelEncoders};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct ActuatorState {
    left: f64,
    right: f64,
    writes: usize,
}

/// Mock drive actuators recording the last applied per-side power.
#[derive(Clone, Default)]
pub struct MockActuators {
    state: Arc<Mutex<ActuatorState>>,
}

impl MockActuators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last power written (left, right).
    pub fn applied(&self) -> (f64, f64) {
        let state = self.state.lock();
        (state.left, state.right)
    }

    /// Number of writes received.
    pub fn write_count(&self) -> usize {
        self.state.lock().writes
    }
}

impl DriveActuators for MockActuators {
    fn set_power(&mut self, left: f64, right: f64) -> Result<()> {
        let mut state = self.state.lock();
        state.left = left;
        state.right = right;
        state.writes += 1;
        Ok(())
    }
}

/// Mock wheel encoders with externally settable positions.
#[derive(Clone, Default)]
pub struct MockEncoders {
    positions: Arc<Mutex<(f64, f64)>>,
}

impl MockEncoders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both encoder positions (degrees).
    pub fn set_positions(&self, left: f64, right: f64) {
        *self.positions.lock() = (left, right);
    }

    /// Advance both encoder positions by the given deltas (degrees).
    pub fn advance(&self, delta_left: f64, delta_right: f64) {
        let mut positions = self.positions.lock();
        positions.0 += delta_left;
        positions.1 += delta_right;
    }

    /// Read positions without going through the hardware trait.
    pub fn current_positions(&self) -> (f64, f64) {
        *self.positions.lock()
    }
}

impl WheelEncoders for MockEncoders {
    fn positions(&mut self) -> Result<(f64, f64)> {
        Ok(*self.positions.lock())
    }

    fn reset(&mut self) -> Result<()> {
        *self.positions.lock() = (0.0, 0.0);
        Ok(())
    }
}

/// Drivetrain simulator integrating applied power into encoder movement.
///
/// The motor model is a pure velocity response: each wheel turns at
/// `response_rate` encoder degrees per second per unit of applied power.
/// Good enough to close the loop in tests; not a dynamics model.
pub struct DrivetrainSim {
    actuators: MockActuators,
    encoders: MockEncoders,
    response_rate: f64,
    slip_bias: f64,
    slip_stddev: f64,
    noise: Option<NoiseGenerator>,
}

impl DrivetrainSim {
    /// Noise-free simulator with the given motor response
    /// (encoder degrees per second per power unit).
    pub fn new(response_rate: f64) -> Self {
        Self {
            actuators: MockActuators::new(),
            encoders: MockEncoders::new(),
            response_rate,
            slip_bias: 0.0,
            slip_stddev: 0.0,
            noise: None,
        }
    }

    /// Simulator with multiplicative wheel slip noise, seeded for
    /// reproducibility.
    pub fn with_noise(response_rate: f64, slip_bias: f64, slip_stddev: f64, seed: u64) -> Self {
        Self {
            noise: Some(NoiseGenerator::new(seed)),
            slip_bias,
            slip_stddev,
            ..Self::new(response_rate)
        }
    }

    /// Actuator handle to pass to the controller.
    pub fn actuators(&self) -> MockActuators {
        self.actuators.clone()
    }

    /// Encoder handle to pass to the controller.
    pub fn encoders(&self) -> MockEncoders {
        self.encoders.clone()
    }

    /// Advance the simulation by `dt`: integrate the currently applied power
    /// into encoder movement.
    pub fn step(&mut self, dt: Duration) {
        let (left_power, right_power) = self.actuators.applied();
        let dt = dt.as_secs_f64();

        let (left_slip, right_slip) = match &mut self.noise {
            Some(noise) => (
                1.0 + noise.biased_gaussian(self.slip_bias, self.slip_stddev),
                1.0 + noise.biased_gaussian(self.slip_bias, self.slip_stddev),
            ),
            None => (1.0, 1.0),
        };

        self.encoders.advance(
            left_power * self.response_rate * dt * left_slip,
            right_power * self.response_rate * dt * right_slip,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actuators_record_last_write() {
        let mut actuators = MockActuators::new();
        assert_eq!(actuators.applied(), (0.0, 0.0));
        assert_eq!(actuators.write_count(), 0);

        actuators.set_power(40.0, -40.0).unwrap();
        actuators.set_power(50.0, -50.0).unwrap();
        assert_eq!(actuators.applied(), (50.0, -50.0));
        assert_eq!(actuators.write_count(), 2);
    }

    #[test]
    fn test_encoders_reset() {
        let mut encoders = MockEncoders::new();
        encoders.set_positions(123.0, -45.0);
        assert_eq!(encoders.positions().unwrap(), (123.0, -45.0));

        encoders.reset().unwrap();
        assert_eq!(encoders.positions().unwrap(), (0.0, 0.0));
    }

    #[test]
    fn test_sim_integrates_power() {
        let mut sim = DrivetrainSim::new(5.0);
        let mut actuators = sim.actuators();
        actuators.set_power(100.0, -100.0).unwrap();

        // One simulated second in 20 ms steps.
        for _ in 0..50 {
            sim.step(Duration::from_millis(20));
        }

        let (left, right) = sim.encoders().current_positions();
        assert!((left - 500.0).abs() < 1e-6);
        assert!((right + 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_sim_noise_is_reproducible() {
        let run = || {
            let mut sim = DrivetrainSim::with_noise(5.0, 0.01, 0.02, 42);
            let mut actuators = sim.actuators();
            actuators.set_power(80.0, 80.0).unwrap();
            for _ in 0..100 {
                sim.step(Duration::from_millis(20));
            }
            sim.encoders().current_positions()
        };

        assert_eq!(run(), run());
    }
}
