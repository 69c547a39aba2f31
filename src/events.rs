//! Event delivery to the UI collaborator
//!
//! Everything observable (frames, state changes, registry mutations) goes
//! through one aggregated broadcast channel per registry. Subscribers hold a
//! [`Subscription`]; dropping it ends delivery, there is no disconnect call
//! to get wrong or to call twice.

use futures::Stream;
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use crate::camera::CameraState;
use crate::types::{CameraId, Resolution, VideoFrame};

/// Events observable by the UI collaborator
#[derive(Debug, Clone)]
pub enum CameraEvent {
    /// A decoded frame from a camera's primary worker (not emitted while
    /// the camera is paused)
    Frame { id: CameraId, frame: VideoFrame },

    /// A camera's lifecycle state changed; `error` carries the message when
    /// the new state is [`CameraState::Error`]
    StateChanged { id: CameraId, state: CameraState, error: Option<String> },

    /// A resolution transition completed; the camera now streams at
    /// `resolution`
    ResolutionChanged { id: CameraId, resolution: Resolution },

    /// A candidate worker failed during a resolution transition; non-fatal,
    /// the camera keeps streaming at its previous resolution
    TransitionFailed { id: CameraId, reason: String },

    /// A camera was added to the registry
    Added(CameraId),

    /// A camera was removed from the registry
    Removed(CameraId),

    /// The grid order changed (reorder or swap)
    Reordered,

    /// The selected camera changed
    SelectionChanged(Option<CameraId>),
}

/// Subscription handle for the aggregated event channel
///
/// A slow subscriber that falls behind the channel capacity loses the oldest
/// events (frames dominate the volume); the gap is logged and delivery
/// continues with the newest events.
pub struct Subscription {
    rx: broadcast::Receiver<CameraEvent>,
}

impl Subscription {
    pub(crate) fn new(rx: broadcast::Receiver<CameraEvent>) -> Self {
        Self { rx }
    }

    /// Receive the next event, waiting if none is queued
    ///
    /// Returns `None` once the registry is gone.
    pub async fn recv(&mut self) -> Option<CameraEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "event subscriber lagged, oldest events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive without waiting; `None` when nothing is queued
    pub fn try_recv(&mut self) -> Option<CameraEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!(missed, "event subscriber lagged, oldest events dropped");
                }
                Err(_) => return None,
            }
        }
    }

    /// Convert into a `Stream` of events
    pub fn into_stream(self) -> impl Stream<Item = CameraEvent> {
        BroadcastStream::new(self.rx).filter_map(|result| async move { result.ok() })
    }
}
