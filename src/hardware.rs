//! Hardware abstraction traits for the drivetrain.
//!
//! Real drivers (serial, SDK bindings) live with the host; this crate ships
//! mock implementations under [`crate::devices::mock`] for hardware-free
//! testing.

use crate::error::Result;

/// Drive actuator output, one power channel per side.
///
/// Each side of the base is a mirrored pair of motors driven with the same
/// power; implementations fan the per-side value out to both motors.
pub trait DriveActuators: Send {
    /// Apply power to the left and right motor pairs.
    ///
    /// Values are in actuator power units and arrive already ramped and
    /// capped to the configured range.
    fn set_power(&mut self, left: f64, right: f64) -> Result<()>;
}

/// Rotary encoder input, one single-axis encoder per side.
pub trait WheelEncoders: Send {
    /// Read the current encoder positions (left, right) in degrees.
    fn positions(&mut self) -> Result<(f64, f64)>;

    /// Zero both encoder counters.
    fn reset(&mut self) -> Result<()>;
}
