//! Thread runtime for the two control loops.
//!
//! Spawns one named OS thread per loop. Both tick at the configured fixed
//! period and exit cooperatively: the shared active flag is checked once per
//! tick, so shutdown takes effect within one period. Tick errors are logged
//! and the loop keeps running; failure handling in this controller is
//! bounding and timeouts, not detection and recovery.

use crate::base::DriveBase;
use crate::error::Result;
use crate::motion::{PowerShaper, TargetTracker};
use log::{debug, error};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Handles to the two running control loops.
pub struct LoopHandles {
    tracking: JoinHandle<()>,
    shaping: JoinHandle<()>,
    base: Arc<DriveBase>,
}

/// Start both control loops against the given base.
///
/// Sets the active flag before spawning; the loops run until
/// [`LoopHandles::shutdown`] clears it.
pub fn spawn_loops(base: Arc<DriveBase>) -> Result<LoopHandles> {
    base.state().set_active(true);
    let period = base.config().control.period();

    let tracking = {
        let base = Arc::clone(&base);
        thread::Builder::new()
            .name("target-tracking".to_string())
            .spawn(move || {
                debug!("target tracking loop started");
                let mut tracker = TargetTracker::new();

                while base.state().is_active() {
                    if let Err(e) = tracker.tick(&base) {
                        error!("target tracking tick failed: {}", e);
                    }
                    thread::sleep(period);
                }

                debug!("target tracking loop exiting");
            })?
    };

    let shaping = {
        let base = Arc::clone(&base);
        thread::Builder::new()
            .name("power-shaping".to_string())
            .spawn(move || {
                debug!("power shaping loop started");
                let mut shaper = PowerShaper::new();

                while base.state().is_active() {
                    if let Err(e) = shaper.tick(&base) {
                        error!("power shaping tick failed: {}", e);
                    }
                    thread::sleep(period);
                }

                debug!("power shaping loop exiting");
            })
    };

    let shaping = match shaping {
        Ok(handle) => handle,
        Err(e) => {
            // Roll back the half-started runtime before reporting.
            base.state().set_active(false);
            let _ = tracking.join();
            return Err(e.into());
        }
    };

    Ok(LoopHandles {
        tracking,
        shaping,
        base,
    })
}

impl LoopHandles {
    /// Clear the active flag and join both loop threads.
    pub fn shutdown(self) {
        self.base.state().set_active(false);

        if self.tracking.join().is_err() {
            error!("target tracking thread panicked");
        }
        if self.shaping.join().is_err() {
            error!("power shaping thread panicked");
        }

        debug!("control loops stopped");
    }
}
