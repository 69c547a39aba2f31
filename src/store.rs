//! Persistence boundary
//!
//! The registry persists its camera list and selection through a
//! [`ConfigStore`]; the on-disk format (and its migrations) is the store's
//! concern. A corrupt or missing store never breaks startup; the registry
//! falls back to an empty camera list.

use std::sync::Mutex;

use crate::Result;
use crate::config::CameraConfig;
use crate::types::CameraId;

/// External storage for camera configs and the last selection
pub trait ConfigStore: Send {
    /// Load the persisted camera list and last selected id
    fn load(&self) -> Result<(Vec<CameraConfig>, Option<CameraId>)>;

    /// Persist the camera list (in grid order) and current selection
    fn save(&self, configs: &[CameraConfig], selected: Option<CameraId>) -> Result<()>;
}

/// In-memory store for tests and ephemeral setups
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<(Vec<CameraConfig>, Option<CameraId>)>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<(Vec<CameraConfig>, Option<CameraId>)> {
        let guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn save(&self, configs: &[CameraConfig], selected: Option<CameraId>) -> Result<()> {
        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = (configs.to_vec(), selected);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        let config = CameraConfig::new("Cam", "10.0.0.1");
        let id = config.id;

        store.save(&[config.clone()], Some(id)).expect("save succeeds");
        let (configs, selected) = store.load().expect("load succeeds");

        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].id, id);
        assert_eq!(selected, Some(id));
    }

    #[test]
    fn empty_store_loads_empty() {
        let store = MemoryStore::new();
        let (configs, selected) = store.load().expect("load succeeds");
        assert!(configs.is_empty());
        assert_eq!(selected, None);
    }
}
