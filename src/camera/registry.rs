//! Camera registry: membership, grid order, selection, persistence
//!
//! The registry is the single entry point for the UI collaborator. It owns
//! every controller, keeps them in grid order, tracks the selected camera
//! and persists the whole set through a [`ConfigStore`]. All methods are
//! synchronous; streaming work happens on the controllers' tasks.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::camera::{CameraController, CameraState};
use crate::config::CameraConfig;
use crate::error::{CameraError, Result};
use crate::events::{CameraEvent, Subscription};
use crate::source::FrameSource;
use crate::store::ConfigStore;
use crate::types::{CameraId, Resolution};

/// Capacity of the aggregated event channel
///
/// Frames dominate the volume; a subscriber more than this many events
/// behind starts losing the oldest ones.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Owns every camera and their grid order
pub struct CameraRegistry {
    /// Controllers in grid order (row-major in the layout)
    controllers: Vec<CameraController>,
    selected: Option<CameraId>,
    source: Arc<dyn FrameSource>,
    store: Box<dyn ConfigStore>,
    events: broadcast::Sender<CameraEvent>,
}

impl CameraRegistry {
    /// Create an empty registry
    ///
    /// Must be called from within a tokio runtime; controllers spawn their
    /// event pumps at creation.
    pub fn new(source: Arc<dyn FrameSource>, store: Box<dyn ConfigStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { controllers: Vec::new(), selected: None, source, store, events }
    }

    /// Subscribe to the aggregated event channel
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.events.subscribe())
    }

    /// Add a camera in the Stopped state, at the end of the grid order
    ///
    /// The config is validated first; a duplicate id is rejected.
    pub fn add(&mut self, config: CameraConfig) -> Result<CameraId> {
        config.validate()?;
        let id = config.id;
        if self.get(id).is_some() {
            return Err(CameraError::config_invalid(format!(
                "camera {id} is already registered"
            )));
        }

        info!(camera = %id, name = %config.name, "camera added");
        let controller =
            CameraController::new(config, Arc::clone(&self.source), self.events.clone());
        self.controllers.push(controller);
        let _ = self.events.send(CameraEvent::Added(id));
        Ok(id)
    }

    /// Remove a camera, stopping it first if it is streaming
    ///
    /// Clears the selection when the removed camera was selected.
    pub fn remove(&mut self, id: CameraId) -> Result<()> {
        let index = self
            .controllers
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| CameraError::unknown_camera(id))?;

        let controller = self.controllers.remove(index);
        if controller.state() != CameraState::Stopped {
            controller.stop();
        }
        drop(controller);

        info!(camera = %id, "camera removed");
        let _ = self.events.send(CameraEvent::Removed(id));

        if self.selected == Some(id) {
            self.selected = None;
            let _ = self.events.send(CameraEvent::SelectionChanged(None));
        }
        Ok(())
    }

    /// Move a camera to `index` in the grid order
    ///
    /// Out-of-range indices clamp to the last position.
    pub fn reorder(&mut self, id: CameraId, index: usize) -> Result<()> {
        let from = self
            .controllers
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| CameraError::unknown_camera(id))?;

        let to = index.min(self.controllers.len().saturating_sub(1));
        if from != to {
            let controller = self.controllers.remove(from);
            self.controllers.insert(to, controller);
            debug!(camera = %id, from, to, "camera reordered");
            let _ = self.events.send(CameraEvent::Reordered);
        }
        Ok(())
    }

    /// Swap two cameras' positions in the grid order
    ///
    /// A no-op when either id is unknown or both name the same camera.
    pub fn swap(&mut self, a: CameraId, b: CameraId) {
        let pos_a = self.controllers.iter().position(|c| c.id() == a);
        let pos_b = self.controllers.iter().position(|c| c.id() == b);
        if let (Some(i), Some(j)) = (pos_a, pos_b) {
            if i != j {
                self.controllers.swap(i, j);
                debug!(camera_a = %a, camera_b = %b, "cameras swapped");
                let _ = self.events.send(CameraEvent::Reordered);
            }
        }
    }

    /// Select a camera, or clear the selection with `None`
    ///
    /// An unknown id clears the selection. Always emits exactly one
    /// `SelectionChanged`, even when the selection is unchanged.
    pub fn select(&mut self, id: Option<CameraId>) {
        let selected = id.filter(|id| self.get(*id).is_some());
        self.selected = selected;
        for controller in &self.controllers {
            controller.set_selected(Some(controller.id()) == selected);
        }
        debug!(camera = ?selected, "selection changed");
        let _ = self.events.send(CameraEvent::SelectionChanged(selected));
    }

    /// Currently selected camera, if any
    pub fn selected(&self) -> Option<CameraId> {
        self.selected
    }

    /// Look up a camera's controller
    pub fn get(&self, id: CameraId) -> Option<&CameraController> {
        self.controllers.iter().find(|c| c.id() == id)
    }

    /// All controllers in grid order
    pub fn get_all(&self) -> &[CameraController] {
        &self.controllers
    }

    /// Camera ids in grid order
    pub fn order(&self) -> Vec<CameraId> {
        self.controllers.iter().map(|c| c.id()).collect()
    }

    /// Grid panels in order, as input for the layout engine
    pub fn panels(&self) -> Vec<(CameraId, Resolution)> {
        self.controllers.iter().map(|c| (c.id(), c.resolution())).collect()
    }

    /// Number of registered cameras
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// Whether the registry has no cameras
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Start streaming on one camera
    pub fn start(&self, id: CameraId) -> Result<()> {
        self.get(id).ok_or_else(|| CameraError::unknown_camera(id))?.start();
        Ok(())
    }

    /// Stop streaming on one camera
    pub fn stop(&self, id: CameraId) -> Result<()> {
        self.get(id).ok_or_else(|| CameraError::unknown_camera(id))?.stop();
        Ok(())
    }

    /// Pause frame forwarding on one camera
    pub fn pause(&self, id: CameraId) -> Result<()> {
        self.get(id).ok_or_else(|| CameraError::unknown_camera(id))?.pause();
        Ok(())
    }

    /// Resume frame forwarding on one camera
    pub fn unpause(&self, id: CameraId) -> Result<()> {
        self.get(id).ok_or_else(|| CameraError::unknown_camera(id))?.unpause();
        Ok(())
    }

    /// Begin a resolution transition on one camera
    pub fn change_resolution(&self, id: CameraId, target: Resolution) -> Result<()> {
        self.get(id)
            .ok_or_else(|| CameraError::unknown_camera(id))?
            .change_resolution(target)
    }

    /// Stop every camera
    pub fn stop_all(&self) {
        info!(cameras = self.controllers.len(), "stopping all cameras");
        for controller in &self.controllers {
            controller.stop();
        }
    }

    /// Persist the camera list (in grid order) and current selection
    pub fn save(&self) -> Result<()> {
        let configs: Vec<_> = self.controllers.iter().map(|c| c.config()).collect();
        self.store.save(&configs, self.selected)?;
        debug!(cameras = configs.len(), "configuration saved");
        Ok(())
    }

    /// Replace the camera set with the persisted one
    ///
    /// All cameras come back Stopped; nothing auto-starts. A failed load or
    /// an invalid persisted config never breaks startup: the failure is
    /// logged and skipped. Emits no per-camera events.
    pub fn load(&mut self) {
        let (configs, selected) = match self.store.load() {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!(%error, "failed to load camera configuration, starting empty");
                (Vec::new(), None)
            }
        };

        self.stop_all();
        self.controllers.clear();
        self.selected = None;

        for config in configs {
            if let Err(error) = config.validate() {
                warn!(camera = %config.id, %error, "skipping invalid persisted camera");
                continue;
            }
            let controller = CameraController::new(
                config,
                Arc::clone(&self.source),
                self.events.clone(),
            );
            self.controllers.push(controller);
        }

        if let Some(id) = selected.filter(|id| self.get(*id).is_some()) {
            self.selected = Some(id);
            for controller in &self.controllers {
                controller.set_selected(controller.id() == id);
            }
        }

        info!(cameras = self.controllers.len(), "camera configuration loaded");
    }
}

impl Drop for CameraRegistry {
    fn drop(&mut self) {
        self.stop_all();
    }
}
