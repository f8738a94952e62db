//! Power shaping loop: slew-rate ramp, capping, actuator write.

use crate::base::DriveBase;
use crate::error::Result;

/// Ramps and caps target power before writing it to the actuators.
///
/// Applied power can change by at most the configured ramp step per tick,
/// whatever jump the tracking loop just requested; this protects the
/// drivetrain from torque spikes and wheel slip. The ramped value is then
/// clamped to the explicit power cap when one is set, else to the default
/// maximum.
///
/// While the pause flag is set the actuator write is skipped but the ramping
/// and capping bookkeeping still runs, so the applied power keeps tracking
/// the target and resuming needs no re-ramp.
pub struct PowerShaper {
    current_left: f64,
    current_right: f64,
}

impl PowerShaper {
    pub fn new() -> Self {
        Self {
            current_left: 0.0,
            current_right: 0.0,
        }
    }

    /// Run one shaping tick.
    pub fn tick(&mut self, base: &DriveBase) -> Result<()> {
        let (target_left, target_right) = base.state().target_power();
        let step = base.config().limits.ramp_step;

        self.current_left += (target_left - self.current_left).clamp(-step, step);
        self.current_right += (target_right - self.current_right).clamp(-step, step);

        let limit = base
            .state()
            .power_cap()
            .unwrap_or(base.config().limits.max_power);
        self.current_left = self.current_left.clamp(-limit, limit);
        self.current_right = self.current_right.clamp(-limit, limit);

        if !base.state().is_paused() {
            base.actuators
                .lock()
                .set_power(self.current_left, self.current_right)?;
        }

        log::trace!(
            "PowerShaper: applied L={:.1} R={:.1} (target L={:.1} R={:.1})",
            self.current_left,
            self.current_right,
            target_left,
            target_right
        );

        Ok(())
    }

    /// The ramped, capped power last computed (and, unless paused, applied).
    pub fn applied(&self) -> (f64, f64) {
        (self.current_left, self.current_right)
    }
}

impl Default for PowerShaper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriveConfig;
    use crate::devices::mock::{MockActuators, MockEncoders};

    fn test_base(ramp_step: f64) -> (DriveBase, MockActuators) {
        let mut config = DriveConfig::default();
        config.limits.ramp_step = ramp_step;
        let actuators = MockActuators::new();
        let base = DriveBase::new(config, actuators.clone(), MockEncoders::new());
        (base, actuators)
    }

    #[test]
    fn test_ramp_limits_per_tick_change() {
        let (base, actuators) = test_base(15.0);
        base.state().set_target_power(100.0, 100.0);

        let mut shaper = PowerShaper::new();
        let mut previous = 0.0;
        for expected in [15.0, 30.0, 45.0, 60.0, 75.0, 90.0, 100.0, 100.0] {
            shaper.tick(&base).unwrap();
            let (left, right) = shaper.applied();
            assert_eq!(left, expected);
            assert_eq!(right, expected);
            // Monotone approach, never past the target.
            assert!(left >= previous);
            assert!(left <= 100.0);
            previous = left;
        }

        assert_eq!(actuators.applied(), (100.0, 100.0));
    }

    #[test]
    fn test_ramp_applies_to_decreases_too() {
        let (base, _) = test_base(15.0);
        base.state().set_target_power(30.0, 30.0);

        let mut shaper = PowerShaper::new();
        shaper.tick(&base).unwrap();
        shaper.tick(&base).unwrap();
        assert_eq!(shaper.applied(), (30.0, 30.0));

        base.state().set_target_power(-30.0, -30.0);
        shaper.tick(&base).unwrap();
        assert_eq!(shaper.applied(), (15.0, 15.0));
    }

    #[test]
    fn test_explicit_cap_clamps_both_signs() {
        let (base, actuators) = test_base(50.0);
        base.state().set_power_cap(50.0);

        base.state().set_target_power(150.0, -150.0);
        let mut shaper = PowerShaper::new();
        for _ in 0..10 {
            shaper.tick(&base).unwrap();
        }
        assert_eq!(shaper.applied(), (50.0, -50.0));
        assert_eq!(actuators.applied(), (50.0, -50.0));
    }

    #[test]
    fn test_default_max_applies_without_cap() {
        let (base, _) = test_base(50.0);
        base.state().set_target_power(500.0, 500.0);

        let mut shaper = PowerShaper::new();
        for _ in 0..10 {
            shaper.tick(&base).unwrap();
        }
        let max = base.config().limits.max_power;
        assert_eq!(shaper.applied(), (max, max));
    }

    #[test]
    fn test_clearing_cap_restores_default_max() {
        let (base, _) = test_base(50.0);
        base.state().set_power_cap(40.0);
        base.state().set_target_power(200.0, 200.0);

        let mut shaper = PowerShaper::new();
        for _ in 0..5 {
            shaper.tick(&base).unwrap();
        }
        assert_eq!(shaper.applied(), (40.0, 40.0));

        base.state().clear_power_cap();
        for _ in 0..5 {
            shaper.tick(&base).unwrap();
        }
        let max = base.config().limits.max_power;
        assert_eq!(shaper.applied(), (max, max));
    }

    #[test]
    fn test_pause_skips_writes_but_keeps_ramping() {
        let (base, actuators) = test_base(15.0);
        base.state().set_paused(true);
        base.state().set_target_power(60.0, 60.0);

        let mut shaper = PowerShaper::new();
        for _ in 0..4 {
            shaper.tick(&base).unwrap();
        }

        // Converged internally with no actuator writes at all.
        assert_eq!(shaper.applied(), (60.0, 60.0));
        assert_eq!(actuators.write_count(), 0);

        // First tick after resuming writes the already-converged value.
        base.state().set_paused(false);
        shaper.tick(&base).unwrap();
        assert_eq!(actuators.applied(), (60.0, 60.0));
        assert_eq!(actuators.write_count(), 1);
    }
}
