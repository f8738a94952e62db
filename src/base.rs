//! The drive base context shared by the command layer and both control loops.

use crate::config::DriveConfig;
use crate::hardware::{DriveActuators, WheelEncoders};
use crate::state::{Pose, SharedState};
use parking_lot::Mutex;

/// Context object holding the shared control state, the hardware handles and
/// the configuration.
///
/// One instance is created per run and shared by `Arc` between the
/// [`MotionCommander`](crate::motion::MotionCommander), the two control loops
/// and the host's position provider.
///
/// # Locking
///
/// The hardware handles sit behind blocking mutexes with minimal critical
/// sections. The encoder mutex doubles as the reset barrier: pose reset holds
/// it while zeroing encoders and targets together, and the tracking loop
/// samples encoders and targets under the same lock, so no tick can observe a
/// fresh encoder count against a stale target or vice versa.
pub struct DriveBase {
    pub(crate) state: SharedState,
    pub(crate) actuators: Mutex<Box<dyn DriveActuators>>,
    pub(crate) encoders: Mutex<Box<dyn WheelEncoders>>,
    config: DriveConfig,
}

impl DriveBase {
    /// Create a drive base from configuration and hardware handles.
    ///
    /// The initial pose is the field origin facing forward; the position
    /// provider overwrites it as soon as it starts publishing.
    pub fn new<A, E>(config: DriveConfig, actuators: A, encoders: E) -> Self
    where
        A: DriveActuators + 'static,
        E: WheelEncoders + 'static,
    {
        Self {
            state: SharedState::new(Pose::new(0.0, 0.0, 0.0)),
            actuators: Mutex::new(Box::new(actuators)),
            encoders: Mutex::new(Box::new(encoders)),
            config,
        }
    }

    /// Shared control state.
    ///
    /// The position provider publishes through [`SharedState::set_pose`];
    /// everything else on the state is managed by the commander and the loops.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Controller configuration (immutable for the lifetime of the base).
    pub fn config(&self) -> &DriveConfig {
        &self.config
    }
}
