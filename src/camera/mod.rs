//! Camera lifecycle and registry
//!
//! The [`CameraRegistry`] owns one [`CameraController`] per configured
//! camera. Controllers run the per-camera state machine and the resolution
//! transition protocol; the registry handles membership, grid order,
//! selection and persistence.

mod controller;
mod registry;


pub use controller::{CameraController, CameraState};
pub use registry::CameraRegistry;
