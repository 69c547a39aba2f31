//! Frame source boundary to the networking collaborator
//!
//! camgrid defines no wire protocol of its own. The embedding application
//! supplies a [`FrameSource`] (RTSP, test double, file playback, ...) and
//! the stream workers drive it.

use async_trait::async_trait;

use crate::Result;
use crate::config::CameraConfig;
use crate::types::{Resolution, VideoFrame};

/// Factory for live camera connections
///
/// One shared source serves every camera; `connect` is called once per
/// worker, with the resolution that worker must deliver. The full handshake
/// (TCP, auth, stream negotiation) belongs in `connect`; camgrid races it
/// against the config's connection timeout.
#[async_trait]
pub trait FrameSource: Send + Sync + 'static {
    /// Open a connection to the camera at the given resolution
    async fn connect(
        &self,
        config: &CameraConfig,
        resolution: Resolution,
    ) -> Result<Box<dyn FrameReader>>;
}

/// One live connection delivering decoded frames in capture order
///
/// Dropping the reader releases the connection.
#[async_trait]
pub trait FrameReader: Send {
    /// Get the next decoded frame
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - new frame available
    /// - `Ok(None)` - source ended; a live camera stream has no normal end,
    ///   so the worker reports this as a stream error
    /// - `Err(e)` - read or protocol failure
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>>;
}
