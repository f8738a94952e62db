//! Motion command layer and blocking utilities.
//!
//! Every motion command is a deterministic, non-blocking state update: it adds
//! a signed encoder-degree displacement to the cumulative targets and
//! overwrites the PD gain pair. The two control loops do the rest. The only
//! blocking operations are [`MotionCommander::wait_until_arrived`] and the
//! open-loop fallback [`MotionCommander::timed_drive`].

use crate::base::DriveBase;
use crate::config::Gains;
use crate::error::Result;
use crate::state::Pose;
use log::{debug, info, warn};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of a blocking wait for target arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// Both encoder errors entered the tolerance band.
    Reached,
    /// The cutoff elapsed first.
    TimedOut,
}

/// Issues motion commands against a shared [`DriveBase`].
///
/// Commands compose by addition: issuing two moves back to back accumulates
/// both displacements. The gain pair is overwritten wholesale by each command
/// and governs every subsequent tick until the next command, so a turn issued
/// while a move is still converging retunes that move as well; callers that
/// care should sequence commands with [`wait_until_arrived`](Self::wait_until_arrived).
pub struct MotionCommander {
    base: Arc<DriveBase>,
}

impl MotionCommander {
    pub fn new(base: Arc<DriveBase>) -> Self {
        Self { base }
    }

    /// Move straight by `distance` inches (negative drives backward).
    ///
    /// `gains` of `None` selects the configured drive defaults.
    pub fn move_straight(&self, distance: f64, gains: Option<Gains>) {
        let gains = gains.unwrap_or(self.base.config().gains.drive);
        let delta = distance / self.base.config().geometry.inches_per_degree;
        self.base.state.add_targets(delta, delta);
        self.base.state.set_gains(gains.kp, gains.kd);

        info!(
            "MotionCommander: move {:.1}in ({:+.0} encoder deg, kp={}, kd={})",
            distance, delta, gains.kp, gains.kd
        );
    }

    /// Move straight toward the field coordinate `(x, y)`.
    ///
    /// The bearing to the target is only used to decide between driving
    /// forward and driving backward: if it differs from the current heading
    /// by 90 degrees or more, the base is judged to already be facing away
    /// and the move is issued with reversed sign instead of re-turning.
    ///
    /// Callers must issue a [`turn_toward`](Self::turn_toward) at the same
    /// point first so the heading already approximates the bearing; without
    /// it the forward/reverse decision is meaningless.
    pub fn move_toward(&self, x: f64, y: f64, gains: Option<Gains>) {
        let gains = gains.unwrap_or(self.base.config().gains.drive);
        let pose = self.base.state.pose();
        let dx = x - pose.x;
        let dy = y - pose.y;
        let distance = dx.hypot(dy);

        // Bearing measured from the +y (forward) axis, hence atan2(dx, dy).
        let bearing = dx.atan2(dy);
        let distance = if (bearing - pose.heading).abs() >= FRAC_PI_2 {
            -distance
        } else {
            distance
        };

        let delta = distance / self.base.config().geometry.inches_per_degree;
        self.base.state.add_targets(delta, delta);
        self.base.state.set_gains(gains.kp, gains.kd);

        info!(
            "MotionCommander: move {} to ({:.1}, {:.1}), {:.1}in",
            if distance < 0.0 { "backward" } else { "forward" },
            x,
            y,
            distance.abs()
        );
    }

    /// Turn in place to the absolute heading `angle_deg` (degrees).
    ///
    /// `gains` of `None` selects the configured turn defaults.
    pub fn turn_to_heading(&self, angle_deg: f64, gains: Option<Gains>) {
        let gains = gains.unwrap_or(self.base.config().gains.turn);
        let pose = self.base.state.pose();
        let error = angle_deg.to_radians() - pose.heading;
        self.apply_turn(error, gains);

        info!(
            "MotionCommander: turn to {:.1} deg (error {:.1} deg)",
            angle_deg,
            error.to_degrees()
        );
    }

    /// Turn in place to face the field coordinate `(x, y)`.
    ///
    /// With `reverse` set the rear of the base faces the target instead,
    /// for a subsequent backward [`move_toward`](Self::move_toward).
    pub fn turn_toward(&self, x: f64, y: f64, reverse: bool, gains: Option<Gains>) {
        let gains = gains.unwrap_or(self.base.config().gains.turn);
        let pose = self.base.state.pose();
        let mut bearing = (x - pose.x).atan2(y - pose.y);
        if reverse {
            bearing += PI;
        }

        let error = shortest_rotation(bearing - pose.heading);
        self.apply_turn(error, gains);

        info!(
            "MotionCommander: turn {}toward ({:.1}, {:.1}), {:.1} deg",
            if reverse { "rear " } else { "" },
            x,
            y,
            error.to_degrees()
        );
    }

    /// Turn in place by `angle_deg` degrees relative to the current heading.
    pub fn turn_relative(&self, angle_deg: f64, gains: Option<Gains>) {
        let gains = gains.unwrap_or(self.base.config().gains.turn);
        self.apply_turn(angle_deg.to_radians(), gains);

        info!("MotionCommander: turn {:+.1} deg relative", angle_deg);
    }

    /// Reset the pose to `(x, y, angle_deg)` and zero encoders and targets.
    ///
    /// All three change together: the encoder lock is held across the reset
    /// and the tracking loop samples encoders and targets under that same
    /// lock, so no tick observes a zeroed encoder against a stale target or
    /// vice versa.
    pub fn reset_pose(&self, x: f64, y: f64, angle_deg: f64) -> Result<()> {
        let mut encoders = self.base.encoders.lock();
        encoders.reset()?;
        self.base.state.reset_targets();
        self.base
            .state
            .set_pose(Pose::new(x, y, angle_deg.to_radians()));

        debug!(
            "MotionCommander: pose reset to ({:.1}, {:.1}, {:.1} deg)",
            x, y, angle_deg
        );
        Ok(())
    }

    /// Cap applied power to `limit` in absolute value.
    pub fn set_power_cap(&self, limit: f64) {
        self.base.state.set_power_cap(limit);
        debug!("MotionCommander: power cap {:.0}", limit);
    }

    /// Remove the power cap.
    pub fn clear_power_cap(&self) {
        self.base.state.clear_power_cap();
        debug!("MotionCommander: power cap cleared");
    }

    /// Withhold or resume actuator writes by the power shaping loop.
    pub fn set_paused(&self, paused: bool) {
        self.base.state.set_paused(paused);
        debug!("MotionCommander: paused={}", paused);
    }

    /// Block until both encoder errors are within `tolerance` encoder degrees
    /// or `timeout` elapses, whichever comes first.
    ///
    /// `tolerance` of `None` selects the configured arrival tolerance. Polls
    /// at the control tick period; the two loops keep running concurrently.
    /// On exit one zero-power write is issued directly to the actuators,
    /// bypassing the loops; the shaping loop overwrites it on its next tick,
    /// so callers wanting sustained zero output should pause first.
    pub fn wait_until_arrived(&self, timeout: Duration, tolerance: Option<f64>) -> Result<Arrival> {
        let tolerance = tolerance.unwrap_or(self.base.config().control.arrival_tolerance);
        let period = self.base.config().control.period();
        let start = Instant::now();

        let outcome = loop {
            let (error_left, error_right) = {
                let mut encoders = self.base.encoders.lock();
                let (pos_left, pos_right) = encoders.positions()?;
                let (target_left, target_right) = self.base.state.targets();
                (target_left - pos_left, target_right - pos_right)
            };

            if error_left.abs() <= tolerance && error_right.abs() <= tolerance {
                debug!(
                    "MotionCommander: arrived after {:.0}ms",
                    start.elapsed().as_secs_f64() * 1000.0
                );
                break Arrival::Reached;
            }

            if start.elapsed() >= timeout {
                warn!(
                    "MotionCommander: wait cutoff after {:?} (error L={:.1} R={:.1})",
                    timeout, error_left, error_right
                );
                break Arrival::TimedOut;
            }

            thread::sleep(period);
        };

        self.base.actuators.lock().set_power(0.0, 0.0)?;
        Ok(outcome)
    }

    /// Open-loop fallback: drive with raw powers for `duration`, then stop.
    ///
    /// Pauses the power shaping loop's actuator writes for the duration and
    /// resumes them afterwards; the loop's ramping bookkeeping continues
    /// throughout. Use only when encoder feedback is unavailable or
    /// untrusted.
    pub fn timed_drive(&self, left: f64, right: f64, duration: Duration) -> Result<()> {
        info!(
            "MotionCommander: open-loop drive L={:.0} R={:.0} for {:?}",
            left, right, duration
        );

        self.base.state.set_paused(true);
        let result = self.drive_raw(left, right, duration);
        self.base.state.set_paused(false);
        result
    }

    fn drive_raw(&self, left: f64, right: f64, duration: Duration) -> Result<()> {
        self.base.actuators.lock().set_power(left, right)?;
        thread::sleep(duration);
        self.base.actuators.lock().set_power(0.0, 0.0)?;
        Ok(())
    }

    /// Apply an in-place rotation of `error_rad` as a differential target.
    ///
    /// `arc = error * track_width` inches of differential travel, split half
    /// onto each side with opposite signs.
    fn apply_turn(&self, error_rad: f64, gains: Gains) {
        let geometry = &self.base.config().geometry;
        let diff = error_rad * geometry.track_width / geometry.inches_per_degree;
        self.base.state.add_targets(diff / 2.0, -diff / 2.0);
        self.base.state.set_gains(gains.kp, gains.kd);
    }
}

/// Fold an angular difference into (-pi, pi] so the shorter rotation wins.
#[inline]
fn shortest_rotation(delta: f64) -> f64 {
    if delta > PI {
        delta - TAU
    } else if delta < -PI {
        delta + TAU
    } else {
        delta
    }
}
