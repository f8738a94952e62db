//! GatiBase - closed-loop motion control for differential-drive robot bases
//!
//! Converts high-level motion commands (move a distance, turn to a heading,
//! move or turn toward a field coordinate) into actuator power through two
//! cooperating fixed-rate control loops over raw encoder feedback:
//!
//! 1. The **target tracking loop** turns encoder error into target power with
//!    a PD law.
//! 2. The **power shaping loop** ramps and caps that power before writing it
//!    to the actuators.
//!
//! Commands, loops and the host's position provider share one
//! [`DriveBase`] context; every cross-loop field is a single-writer atomic.
//!
//! ## Features
//!
//! - `mock` (default): mock devices and a drivetrain simulator for
//!   hardware-free testing
//!
//! ## Quick start
//!
//! ```no_run
//! use gati_base::{DriveBase, DriveConfig, MotionCommander, runtime};
//! use gati_base::devices::mock::DrivetrainSim;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # fn main() -> gati_base::Result<()> {
//! let sim = DrivetrainSim::new(5.0);
//! let base = Arc::new(DriveBase::new(
//!     DriveConfig::default(),
//!     sim.actuators(),
//!     sim.encoders(),
//! ));
//!
//! let loops = runtime::spawn_loops(Arc::clone(&base))?;
//! let commander = MotionCommander::new(Arc::clone(&base));
//!
//! commander.turn_toward(24.0, 24.0, false, None);
//! commander.wait_until_arrived(Duration::from_millis(1500), None)?;
//! commander.move_toward(24.0, 24.0, None);
//! commander.wait_until_arrived(Duration::from_millis(3000), None)?;
//!
//! loops.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod base;
pub mod config;
pub mod devices;
pub mod error;
pub mod hardware;
pub mod motion;
pub mod runtime;
pub mod state;

// Re-export commonly used types
pub use base::DriveBase;
pub use config::{DriveConfig, Gains};
pub use error::{Error, Result};
pub use motion::{Arrival, MotionCommander, PowerShaper, TargetTracker};
pub use runtime::LoopHandles;
pub use state::{Pose, SharedState};
