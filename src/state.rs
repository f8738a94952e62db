//! Shared control state exchanged between the command layer and the two loops.
//!
//! Every cross-loop field is a single atomic with a single designated writer:
//!
//! - Encoder targets and gains: written by the command layer, read by the
//!   target tracking loop.
//! - Target powers: written by the target tracking loop, read by the power
//!   shaping loop.
//! - Cap/pause/active flags: written by the command layer, read by the loops.
//! - Pose: written by the external position provider (and by pose reset), read
//!   by the command layer.
//!
//! With one writer per field there is never a write/write race; readers may see
//! a value up to one tick stale, which is acceptable at the 20 ms loop period.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Atomic wrapper for f64 values.
/// Uses AtomicU64 with bit reinterpretation.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(val: f64) -> Self {
        Self(AtomicU64::new(val.to_bits()))
    }

    pub fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.0.load(order))
    }

    pub fn store(&self, val: f64, order: Ordering) {
        self.0.store(val.to_bits(), order);
    }
}

/// Robot pose in the field frame.
///
/// `x`/`y` in inches, `heading` in radians measured from the +y (forward)
/// axis. Owned by the external position provider; this controller only reads
/// it, except for the explicit pose reset operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }
}

/// Atomic wrapper for [`Pose`].
///
/// Components are stored as three independent atomics; a reader may observe
/// components from two adjacent provider updates. At the provider's update
/// rate the skew is far below the controller's tolerance.
#[derive(Debug)]
pub struct AtomicPose {
    x: AtomicF64,
    y: AtomicF64,
    heading: AtomicF64,
}

impl AtomicPose {
    pub fn new(pose: Pose) -> Self {
        Self {
            x: AtomicF64::new(pose.x),
            y: AtomicF64::new(pose.y),
            heading: AtomicF64::new(pose.heading),
        }
    }

    pub fn load(&self, order: Ordering) -> Pose {
        Pose {
            x: self.x.load(order),
            y: self.y.load(order),
            heading: self.heading.load(order),
        }
    }

    pub fn store(&self, pose: Pose, order: Ordering) {
        self.x.store(pose.x, order);
        self.y.store(pose.y, order);
        self.heading.store(pose.heading, order);
    }
}

/// Shared state between the command layer and both control loops.
#[derive(Debug)]
pub struct SharedState {
    /// Cumulative target encoder positions (degrees); writer: command layer
    target_encoder_left: AtomicF64,
    target_encoder_right: AtomicF64,

    /// PD gain pair governing the tracking loop; writer: command layer
    kp: AtomicF64,
    kd: AtomicF64,

    /// Target powers computed by the tracking loop; writer: tracking loop
    target_power_left: AtomicF64,
    target_power_right: AtomicF64,

    /// Explicit power cap; writer: command layer
    cap_enabled: AtomicBool,
    cap_limit: AtomicF64,

    /// When set, the shaping loop withholds actuator writes; writer: command layer
    paused: AtomicBool,

    /// Autonomous-mode flag; both loops exit when cleared
    active: AtomicBool,

    /// Current pose; writer: position provider (and pose reset)
    pose: AtomicPose,
}

impl SharedState {
    /// Create shared state with all targets, powers and flags zeroed.
    pub fn new(initial_pose: Pose) -> Self {
        Self {
            target_encoder_left: AtomicF64::new(0.0),
            target_encoder_right: AtomicF64::new(0.0),
            kp: AtomicF64::new(0.0),
            kd: AtomicF64::new(0.0),
            target_power_left: AtomicF64::new(0.0),
            target_power_right: AtomicF64::new(0.0),
            cap_enabled: AtomicBool::new(false),
            cap_limit: AtomicF64::new(0.0),
            paused: AtomicBool::new(false),
            active: AtomicBool::new(false),
            pose: AtomicPose::new(initial_pose),
        }
    }

    /// Get target encoder positions (left, right).
    pub fn targets(&self) -> (f64, f64) {
        (
            self.target_encoder_left.load(Ordering::Acquire),
            self.target_encoder_right.load(Ordering::Acquire),
        )
    }

    /// Add a displacement to both target encoder positions.
    ///
    /// Targets are cumulative: successive commands compose by addition. Only
    /// the command layer writes these fields, so load-then-store is race-free.
    pub fn add_targets(&self, delta_left: f64, delta_right: f64) {
        let left = self.target_encoder_left.load(Ordering::Acquire);
        let right = self.target_encoder_right.load(Ordering::Acquire);
        self.target_encoder_left
            .store(left + delta_left, Ordering::Release);
        self.target_encoder_right
            .store(right + delta_right, Ordering::Release);
    }

    /// Zero both target encoder positions (pose reset).
    pub fn reset_targets(&self) {
        self.target_encoder_left.store(0.0, Ordering::Release);
        self.target_encoder_right.store(0.0, Ordering::Release);
    }

    /// Get the governing PD gain pair (kp, kd).
    pub fn gains(&self) -> (f64, f64) {
        (
            self.kp.load(Ordering::Acquire),
            self.kd.load(Ordering::Acquire),
        )
    }

    /// Overwrite the governing PD gain pair.
    ///
    /// The most recently issued command's gains govern all subsequent ticks,
    /// for both sides and all motion kinds, until the next command.
    pub fn set_gains(&self, kp: f64, kd: f64) {
        self.kp.store(kp, Ordering::Release);
        self.kd.store(kd, Ordering::Release);
    }

    /// Get target powers (left, right).
    pub fn target_power(&self) -> (f64, f64) {
        (
            self.target_power_left.load(Ordering::Acquire),
            self.target_power_right.load(Ordering::Acquire),
        )
    }

    /// Set target powers; called once per tick by the tracking loop.
    pub fn set_target_power(&self, left: f64, right: f64) {
        self.target_power_left.store(left, Ordering::Release);
        self.target_power_right.store(right, Ordering::Release);
    }

    /// Current power cap, if one is set.
    pub fn power_cap(&self) -> Option<f64> {
        if self.cap_enabled.load(Ordering::Acquire) {
            Some(self.cap_limit.load(Ordering::Acquire))
        } else {
            None
        }
    }

    /// Cap applied power to `limit` in absolute value.
    pub fn set_power_cap(&self, limit: f64) {
        self.cap_limit.store(limit, Ordering::Release);
        self.cap_enabled.store(true, Ordering::Release);
    }

    /// Remove the power cap; the default maximum applies again.
    pub fn clear_power_cap(&self) {
        self.cap_enabled.store(false, Ordering::Release);
    }

    /// Check whether actuator writes are withheld.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Set or clear the pause flag.
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    /// Check the autonomous-mode flag; loops poll this once per tick.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Set the autonomous-mode flag.
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }

    /// Get the current pose.
    pub fn pose(&self) -> Pose {
        self.pose.load(Ordering::Acquire)
    }

    /// Update the pose; called by the external position provider.
    pub fn set_pose(&self, pose: Pose) {
        self.pose.store(pose, Ordering::Release);
    }
}
