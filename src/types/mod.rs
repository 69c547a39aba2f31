//! Core value types shared across the crate.
//!
//! This module provides the foundational data structures for multi-camera
//! streaming:
//! - [`CameraId`] is the stable identity of one configured camera
//! - [`Resolution`] is a pixel resolution with aspect-ratio support
//! - [`VideoFrame`] is a decoded frame with zero-copy pixel sharing
//! - [`Size`] and [`Rect`] are the layout engine's geometry primitives
//!
//! All identity and configuration types are serde-serializable so the
//! external config store can persist them in whatever format it chooses.

mod frame;
mod geometry;

pub use frame::VideoFrame;
pub use geometry::{Rect, Size};

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of one configured camera
///
/// Opaque token, unique per camera, stable across restarts (it is persisted
/// with the camera's config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraId(Uuid);

impl CameraId {
    /// Generate a fresh camera id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CameraId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Video resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 1920x1080
    pub const FULL_HD: Resolution = Resolution { width: 1920, height: 1080 };

    /// 1280x720
    pub const HD: Resolution = Resolution { width: 1280, height: 720 };

    /// 640x480
    pub const SD: Resolution = Resolution { width: 640, height: 480 };

    /// Create a new resolution
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 0.0 for a degenerate resolution
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
