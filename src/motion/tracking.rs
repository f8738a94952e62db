//! Target tracking loop: encoder error to target power via a PD law.

use crate::base::DriveBase;
use crate::error::Result;

/// Ticks with zero encoder movement under drive power before the stale-sensor
/// warning fires (one second at the 20 ms period).
const STALE_TICK_LIMIT: u32 = 50;

/// Target powers below this are not considered "driving" for staleness checks.
const STALE_POWER_FLOOR: f64 = 5.0;

/// Converts encoder error into target power each tick.
///
/// `power = kp * error + kd * (error - previous_error)` per side, with the
/// gain pair taken from the shared state. Previous errors start at zero, so
/// the first tick after a loop (re)start sees the full error as its
/// derivative; the slew-rate limit downstream absorbs the resulting spike.
pub struct TargetTracker {
    prev_error_left: f64,
    prev_error_right: f64,

    /// Last raw encoder readings, for the stale-sensor diagnostic
    last_positions: Option<(f64, f64)>,

    /// Consecutive ticks without encoder movement while power is commanded
    stale_ticks: u32,
}

impl TargetTracker {
    pub fn new() -> Self {
        Self {
            prev_error_left: 0.0,
            prev_error_right: 0.0,
            last_positions: None,
            stale_ticks: 0,
        }
    }

    /// Run one control tick.
    ///
    /// Encoders and targets are sampled inside one critical section so a
    /// concurrent pose reset can never be observed half-applied.
    pub fn tick(&mut self, base: &DriveBase) -> Result<()> {
        let (positions, targets) = {
            let mut encoders = base.encoders.lock();
            (encoders.positions()?, base.state().targets())
        };

        let error_left = targets.0 - positions.0;
        let error_right = targets.1 - positions.1;

        let delta_left = error_left - self.prev_error_left;
        let delta_right = error_right - self.prev_error_right;

        let (kp, kd) = base.state().gains();
        let power_left = kp * error_left + kd * delta_left;
        let power_right = kp * error_right + kd * delta_right;

        base.state().set_target_power(power_left, power_right);

        self.prev_error_left = error_left;
        self.prev_error_right = error_right;

        self.check_stale(base, positions);

        log::trace!(
            "TargetTracker: error L={:.1} R={:.1} -> power L={:.1} R={:.1}",
            error_left,
            error_right,
            power_left,
            power_right
        );

        Ok(())
    }

    /// Health diagnostic for frozen or disconnected encoders.
    ///
    /// A sensor fault still feeds the PD law unchanged (failure handling here
    /// is bounding, not detection); this only logs when the encoders have not
    /// moved for [`STALE_TICK_LIMIT`] ticks while power is being commanded.
    fn check_stale(&mut self, base: &DriveBase, positions: (f64, f64)) {
        if let Some(last) = self.last_positions {
            let moved =
                (positions.0 - last.0).abs() > 0.0 || (positions.1 - last.1).abs() > 0.0;
            let (power_left, power_right) = base.state().target_power();
            let driving =
                power_left.abs() > STALE_POWER_FLOOR || power_right.abs() > STALE_POWER_FLOOR;

            if moved || !driving {
                self.stale_ticks = 0;
            } else {
                self.stale_ticks += 1;
                if self.stale_ticks == STALE_TICK_LIMIT {
                    log::warn!(
                        "TargetTracker: encoders static for {} ticks under drive power \
                         (L={:.0} R={:.0}) - sensor fault?",
                        STALE_TICK_LIMIT,
                        power_left,
                        power_right
                    );
                }
            }
        }
        self.last_positions = Some(positions);
    }
}

impl Default for TargetTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriveConfig;
    use crate::devices::mock::{MockActuators, MockEncoders};

    fn test_base() -> (DriveBase, MockEncoders) {
        let encoders = MockEncoders::new();
        let base = DriveBase::new(DriveConfig::default(), MockActuators::new(), encoders.clone());
        (base, encoders)
    }

    #[test]
    fn test_proportional_term() {
        let (base, _) = test_base();
        base.state().add_targets(100.0, 100.0);
        base.state().set_gains(1.0, 0.0);

        let mut tracker = TargetTracker::new();
        tracker.tick(&base).unwrap();

        assert_eq!(base.state().target_power(), (100.0, 100.0));
    }

    #[test]
    fn test_power_collapses_once_target_reached() {
        let (base, encoders) = test_base();
        base.state().add_targets(100.0, 100.0);
        base.state().set_gains(1.0, 0.0);

        let mut tracker = TargetTracker::new();
        tracker.tick(&base).unwrap();

        // Encoders advance to the target; the next tick sees zero error.
        encoders.set_positions(100.0, 100.0);
        tracker.tick(&base).unwrap();

        let (left, right) = base.state().target_power();
        assert!(left.abs() < 1e-9);
        assert!(right.abs() < 1e-9);
    }

    #[test]
    fn test_derivative_damps_closing_error() {
        let (base, encoders) = test_base();
        base.state().add_targets(100.0, 100.0);
        base.state().set_gains(1.0, 0.5);

        let mut tracker = TargetTracker::new();
        // First tick: error 100, delta 100 (prev starts at zero).
        tracker.tick(&base).unwrap();
        assert_eq!(base.state().target_power(), (150.0, 150.0));

        // Error shrinks to 60: delta -40 opposes the proportional term.
        encoders.set_positions(40.0, 40.0);
        tracker.tick(&base).unwrap();
        assert_eq!(base.state().target_power(), (40.0, 40.0));
    }

    #[test]
    fn test_sides_tracked_independently() {
        let (base, encoders) = test_base();
        base.state().add_targets(50.0, -50.0);
        base.state().set_gains(1.0, 0.0);
        encoders.set_positions(10.0, -20.0);

        let mut tracker = TargetTracker::new();
        tracker.tick(&base).unwrap();

        assert_eq!(base.state().target_power(), (40.0, -30.0));
    }
}
