//! Decoded frame type flowing from workers to subscribers

use std::sync::Arc;
use std::time::SystemTime;

use super::Resolution;

/// One decoded video frame
///
/// This is the fundamental data unit that flows through the system. Pixel
/// data is shared zero-copy via `Arc`, so cloning a frame for fan-out to
/// multiple subscribers is cheap.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Decoded pixel buffer (zero-copy via Arc)
    pub data: Arc<[u8]>,

    /// Resolution of this frame
    pub resolution: Resolution,

    /// Capture timestamp
    pub timestamp: SystemTime,
}

impl VideoFrame {
    /// Create a new frame with an explicit capture timestamp
    pub fn new(data: Vec<u8>, resolution: Resolution, timestamp: SystemTime) -> Self {
        Self { data: data.into(), resolution, timestamp }
    }

    /// Create a new frame stamped with the current time
    pub fn captured_now(data: Vec<u8>, resolution: Resolution) -> Self {
        Self::new(data, resolution, SystemTime::now())
    }
}
