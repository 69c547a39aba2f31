//! Stream worker: one connection, one resolution, one task
//!
//! A worker owns exactly one [`FrameReader`] and pumps its frames into the
//! owning controller's event channel. Workers are ephemeral: every start,
//! retry and resolution transition spawns a fresh one. Each carries a
//! [`WorkerId`] so the controller can discard events from workers it has
//! already superseded.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::CameraConfig;
use crate::error::CameraError;
use crate::source::FrameSource;
use crate::types::{Resolution, VideoFrame};

/// Identifies one worker within its controller
///
/// Monotonically increasing per controller; a controller compares the id on
/// every incoming event against its current primary and candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct WorkerId(pub(crate) u64);

/// Events a worker pushes to its controller
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    /// A decoded frame, in capture order
    FrameReady(VideoFrame),

    /// Terminal: connect or read failure; the worker task has ended
    Failed(CameraError),

    /// Terminal: cancellation acknowledged, connection released; no further
    /// events follow
    Stopped,
}

/// Handle to a running worker task
///
/// Owned exclusively by the controller. The handle only requests teardown;
/// the task releases its connection on its own time.
#[derive(Debug)]
pub(crate) struct WorkerHandle {
    pub(crate) id: WorkerId,
    cancel: CancellationToken,
}

impl WorkerHandle {
    /// Request asynchronous teardown; idempotent, never blocks
    pub(crate) fn stop(&self) {
        self.cancel.cancel();
    }
}

/// Spawn a worker task connecting to `config` at `resolution`
///
/// The task emits zero or more `FrameReady` events followed by exactly one
/// terminal `Failed` or `Stopped`. Connection attempts race the config's
/// connect timeout.
pub(crate) fn spawn(
    source: Arc<dyn FrameSource>,
    config: CameraConfig,
    resolution: Resolution,
    id: WorkerId,
    events: mpsc::UnboundedSender<(WorkerId, WorkerEvent)>,
) -> WorkerHandle {
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();

    tokio::spawn(async move {
        run(source, config, resolution, id, events, task_cancel).await;
    });

    WorkerHandle { id, cancel }
}

async fn run(
    source: Arc<dyn FrameSource>,
    config: CameraConfig,
    resolution: Resolution,
    id: WorkerId,
    events: mpsc::UnboundedSender<(WorkerId, WorkerEvent)>,
    cancel: CancellationToken,
) {
    debug!(camera = %config.id, worker = ?id, %resolution, "stream worker started");

    let timeout = config.connect_timeout;
    let mut reader = tokio::select! {
        () = cancel.cancelled() => {
            debug!(camera = %config.id, worker = ?id, "worker cancelled before connect");
            let _ = events.send((id, WorkerEvent::Stopped));
            return;
        }
        result = tokio::time::timeout(timeout, source.connect(&config, resolution)) => {
            match result {
                Ok(Ok(reader)) => reader,
                Ok(Err(error)) => {
                    debug!(camera = %config.id, worker = ?id, %error, "connect failed");
                    let _ = events.send((id, WorkerEvent::Failed(error)));
                    return;
                }
                Err(_) => {
                    debug!(camera = %config.id, worker = ?id, ?timeout, "connect timed out");
                    let _ = events
                        .send((id, WorkerEvent::Failed(CameraError::connect_timeout(timeout))));
                    return;
                }
            }
        }
    };

    loop {
        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = reader.next_frame() => result,
        };

        match result {
            Ok(Some(frame)) => {
                trace!(camera = %config.id, worker = ?id, "frame received");
                if events.send((id, WorkerEvent::FrameReady(frame))).is_err() {
                    debug!(camera = %config.id, worker = ?id, "controller gone, shutting down");
                    return;
                }
            }
            Ok(None) => {
                let _ = events.send((
                    id,
                    WorkerEvent::Failed(CameraError::stream_read("stream ended unexpectedly")),
                ));
                return;
            }
            Err(error) => {
                let _ = events.send((id, WorkerEvent::Failed(error)));
                return;
            }
        }
    }

    // Cancelled: dropping the reader releases the connection.
    drop(reader);
    debug!(camera = %config.id, worker = ?id, "stream worker stopped");
    let _ = events.send((id, WorkerEvent::Stopped));
}
