//! Per-camera lifecycle controller and the resolution-transition protocol
//!
//! Every configured camera gets exactly one [`CameraController`]. All of its
//! mutable state (lifecycle state, the primary worker, an optional
//! transition candidate) lives in one `Mutex` per camera. Control-plane
//! calls and the controller's event pump take the same lock, so the
//! transition swap can never race a concurrent `stop()` or a second
//! `change_resolution()`. The lock is never held across an await point.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, trace, warn};

use crate::config::CameraConfig;
use crate::error::{CameraError, Result};
use crate::events::CameraEvent;
use crate::source::FrameSource;
use crate::types::{CameraId, Resolution, VideoFrame};
use crate::worker::{self, WorkerEvent, WorkerHandle, WorkerId};

/// Lifecycle state of one camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    /// Not streaming
    Stopped,
    /// Connecting; no frame delivered yet
    Starting,
    /// Actively streaming
    Running,
    /// Connection alive, frames not forwarded
    Paused,
    /// Last start or stream attempt failed
    Error,
}

impl fmt::Display for CameraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CameraState::Stopped => "stopped",
            CameraState::Starting => "starting",
            CameraState::Running => "running",
            CameraState::Paused => "paused",
            CameraState::Error => "error",
        };
        f.write_str(name)
    }
}

/// An in-flight resolution transition
///
/// Holds the candidate worker being proven and the resolution it must
/// deliver. Exists iff the camera is Running or Paused with a transition in
/// progress; there is never more than one.
#[derive(Debug)]
struct Transition {
    candidate: WorkerHandle,
    target: Resolution,
}

struct ControllerInner {
    config: CameraConfig,
    state: CameraState,
    /// Externally-reported resolution; always equals the primary worker's
    resolution: Resolution,
    primary: Option<WorkerHandle>,
    transition: Option<Transition>,
    last_error: Option<String>,
    selected: bool,
    next_worker: u64,
}

/// Owns the lifecycle of exactly one logical camera
///
/// Created and destroyed only by the registry. Commands are synchronous and
/// non-blocking; worker teardown always completes asynchronously on the
/// worker's own task.
pub struct CameraController {
    id: CameraId,
    inner: Arc<Mutex<ControllerInner>>,
    source: Arc<dyn FrameSource>,
    worker_tx: mpsc::UnboundedSender<(WorkerId, WorkerEvent)>,
    events: broadcast::Sender<CameraEvent>,
}

fn lock(inner: &Mutex<ControllerInner>) -> MutexGuard<'_, ControllerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CameraController {
    /// Create a controller for `config`, spawning its event pump
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn new(
        config: CameraConfig,
        source: Arc<dyn FrameSource>,
        events: broadcast::Sender<CameraEvent>,
    ) -> Self {
        let id = config.id;
        let resolution = config.resolution;
        let inner = Arc::new(Mutex::new(ControllerInner {
            config,
            state: CameraState::Stopped,
            resolution,
            primary: None,
            transition: None,
            last_error: None,
            selected: false,
            next_worker: 0,
        }));

        let (worker_tx, worker_rx) = mpsc::unbounded_channel();

        let pump_inner = Arc::clone(&inner);
        let pump_events = events.clone();
        tokio::spawn(async move {
            Self::pump(id, pump_inner, worker_rx, pump_events).await;
        });

        Self { id, inner, source, worker_tx, events }
    }

    /// This camera's id
    pub fn id(&self) -> CameraId {
        self.id
    }

    /// A copy of the immutable config
    pub fn config(&self) -> CameraConfig {
        lock(&self.inner).config.clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> CameraState {
        lock(&self.inner).state
    }

    /// Currently streaming resolution
    ///
    /// Starts at the config's target resolution and follows completed
    /// transitions.
    pub fn resolution(&self) -> Resolution {
        lock(&self.inner).resolution
    }

    /// Message of the last error, if the camera is in the Error state
    pub fn last_error(&self) -> Option<String> {
        lock(&self.inner).last_error.clone()
    }

    /// Whether the registry currently has this camera selected
    pub fn is_selected(&self) -> bool {
        lock(&self.inner).selected
    }

    pub(crate) fn set_selected(&self, selected: bool) {
        lock(&self.inner).selected = selected;
    }

    /// Start streaming
    ///
    /// Stopped/Error → Starting; clears any previous error. A no-op while
    /// the camera is already starting, running or paused.
    pub fn start(&self) {
        let mut inner = lock(&self.inner);
        match inner.state {
            CameraState::Stopped | CameraState::Error => {
                inner.last_error = None;
                let resolution = inner.resolution;
                let handle = self.spawn_worker(&mut inner, resolution);
                inner.primary = Some(handle);
                set_state(self.id, &mut inner, CameraState::Starting, &self.events);
                info!(camera = %self.id, "camera starting");
            }
            state => debug!(camera = %self.id, %state, "start ignored"),
        }
    }

    /// Stop streaming
    ///
    /// Both the primary and any transition candidate are told to stop; the
    /// state is Stopped immediately, teardown completes asynchronously.
    pub fn stop(&self) {
        let mut inner = lock(&self.inner);
        if inner.state == CameraState::Stopped {
            debug!(camera = %self.id, "stop ignored, already stopped");
            return;
        }
        if let Some(primary) = inner.primary.take() {
            primary.stop();
        }
        if let Some(transition) = inner.transition.take() {
            transition.candidate.stop();
        }
        inner.last_error = None;
        set_state(self.id, &mut inner, CameraState::Stopped, &self.events);
        info!(camera = %self.id, "camera stopped");
    }

    /// Pause frame forwarding
    ///
    /// The worker keeps running; pausing must not drop the connection.
    /// A no-op unless the camera is Running.
    pub fn pause(&self) {
        let mut inner = lock(&self.inner);
        if inner.state == CameraState::Running {
            set_state(self.id, &mut inner, CameraState::Paused, &self.events);
            debug!(camera = %self.id, "camera paused");
        } else {
            debug!(camera = %self.id, state = %inner.state, "pause ignored");
        }
    }

    /// Resume frame forwarding; a no-op unless the camera is Paused
    pub fn unpause(&self) {
        let mut inner = lock(&self.inner);
        if inner.state == CameraState::Paused {
            set_state(self.id, &mut inner, CameraState::Running, &self.events);
            debug!(camera = %self.id, "camera unpaused");
        } else {
            debug!(camera = %self.id, state = %inner.state, "unpause ignored");
        }
    }

    /// Switch to `target` without interrupting playback
    ///
    /// Spawns a candidate worker at `target` while the primary keeps
    /// streaming. The swap happens only once the candidate has proven it can
    /// deliver frames; a candidate failure leaves the camera untouched at
    /// its current resolution. A second call while a transition is in flight
    /// supersedes the previous candidate; the most recent target wins.
    ///
    /// Only valid while Running or Paused.
    pub fn change_resolution(&self, target: Resolution) -> Result<()> {
        let mut inner = lock(&self.inner);
        match inner.state {
            CameraState::Running | CameraState::Paused => {}
            state => return Err(CameraError::invalid_state("change_resolution", state)),
        }

        if let Some(superseded) = inner.transition.take() {
            debug!(
                camera = %self.id,
                old_target = %superseded.target,
                new_target = %target,
                "superseding in-flight transition"
            );
            superseded.candidate.stop();
        }

        if target == inner.resolution {
            debug!(camera = %self.id, %target, "already at target resolution");
            return Ok(());
        }

        let candidate = self.spawn_worker(&mut inner, target);
        inner.transition = Some(Transition { candidate, target });
        info!(camera = %self.id, %target, "resolution transition started");
        Ok(())
    }

    fn spawn_worker(
        &self,
        inner: &mut ControllerInner,
        resolution: Resolution,
    ) -> WorkerHandle {
        let id = WorkerId(inner.next_worker);
        inner.next_worker += 1;
        worker::spawn(
            Arc::clone(&self.source),
            inner.config.clone(),
            resolution,
            id,
            self.worker_tx.clone(),
        )
    }

    /// Event pump: serializes all worker events under the controller lock
    ///
    /// Ends once the controller and every worker it ever spawned are gone.
    async fn pump(
        id: CameraId,
        inner: Arc<Mutex<ControllerInner>>,
        mut rx: mpsc::UnboundedReceiver<(WorkerId, WorkerEvent)>,
        events: broadcast::Sender<CameraEvent>,
    ) {
        trace!(camera = %id, "controller event pump started");
        while let Some((worker_id, event)) = rx.recv().await {
            let mut guard = lock(&inner);
            apply_worker_event(id, &mut guard, worker_id, event, &events);
        }
        trace!(camera = %id, "controller event pump ended");
    }
}

impl Drop for CameraController {
    fn drop(&mut self) {
        debug!(camera = %self.id, "dropping camera controller");
        let mut inner = lock(&self.inner);
        if let Some(primary) = inner.primary.take() {
            primary.stop();
        }
        if let Some(transition) = inner.transition.take() {
            transition.candidate.stop();
        }
    }
}

impl fmt::Debug for CameraController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("CameraController")
            .field("id", &self.id)
            .field("state", &inner.state)
            .field("resolution", &inner.resolution)
            .field("transition", &inner.transition.is_some())
            .finish()
    }
}

fn set_state(
    id: CameraId,
    inner: &mut ControllerInner,
    state: CameraState,
    events: &broadcast::Sender<CameraEvent>,
) {
    inner.state = state;
    let _ = events.send(CameraEvent::StateChanged {
        id,
        state,
        error: inner.last_error.clone(),
    });
}

fn apply_worker_event(
    id: CameraId,
    inner: &mut ControllerInner,
    worker_id: WorkerId,
    event: WorkerEvent,
    events: &broadcast::Sender<CameraEvent>,
) {
    let from_primary = inner.primary.as_ref().is_some_and(|p| p.id == worker_id);
    let from_candidate =
        inner.transition.as_ref().is_some_and(|t| t.candidate.id == worker_id);

    match event {
        WorkerEvent::FrameReady(frame) => {
            if from_primary {
                if inner.state == CameraState::Starting {
                    inner.last_error = None;
                    set_state(id, inner, CameraState::Running, events);
                    info!(camera = %id, "first frame received, camera running");
                }
                if inner.state == CameraState::Running {
                    let _ = events.send(CameraEvent::Frame { id, frame });
                }
                // Paused: connection stays warm, frame not forwarded.
            } else if from_candidate {
                promote_candidate(id, inner, frame, events);
            } else {
                trace!(camera = %id, worker = ?worker_id, "frame from superseded worker ignored");
            }
        }
        WorkerEvent::Failed(error) => {
            if from_primary {
                // Primary failure is fatal for this camera (and only this
                // camera). An in-flight candidate is discarded unproven.
                inner.primary.take();
                if let Some(transition) = inner.transition.take() {
                    transition.candidate.stop();
                }
                inner.last_error = Some(error.to_string());
                set_state(id, inner, CameraState::Error, events);
                warn!(camera = %id, %error, "primary stream failed");
            } else if from_candidate {
                // Candidate failure is non-fatal: the proven primary keeps
                // streaming at the old resolution.
                inner.transition.take();
                warn!(camera = %id, %error, "resolution transition failed, keeping current stream");
                let _ = events
                    .send(CameraEvent::TransitionFailed { id, reason: error.to_string() });
            } else {
                trace!(camera = %id, worker = ?worker_id, "failure from superseded worker ignored");
            }
        }
        WorkerEvent::Stopped => {
            trace!(camera = %id, worker = ?worker_id, "worker teardown complete");
        }
    }
}

/// The transition swap: the single mutation point of the protocol
///
/// Runs under the controller lock. The candidate has delivered its first
/// frame, so the old primary can be retired with zero visible gap.
fn promote_candidate(
    id: CameraId,
    inner: &mut ControllerInner,
    frame: VideoFrame,
    events: &broadcast::Sender<CameraEvent>,
) {
    let Some(transition) = inner.transition.take() else {
        return;
    };
    if let Some(old_primary) = inner.primary.take() {
        old_primary.stop();
    }
    inner.resolution = transition.target;
    inner.primary = Some(transition.candidate);
    info!(camera = %id, resolution = %transition.target, "resolution transition complete");
    let _ = events.send(CameraEvent::ResolutionChanged { id, resolution: transition.target });

    // The candidate's first frame doubles as the new primary's first frame.
    if inner.state == CameraState::Running {
        let _ = events.send(CameraEvent::Frame { id, frame });
    }
}
