//! Device implementations for the hardware seam.
//!
//! Real drivers (serial transports, vendor SDK bindings) live with the host
//! runtime; this crate only ships the mock simulation used for
//! hardware-free testing.

#[cfg(any(test, feature = "mock"))]
pub mod mock;
