//! End-to-end test of the public API: registry, streaming, layout.
//!
//! Uses a channel-driven frame source so the test controls exactly when
//! each connection delivers frames.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use camgrid::{
    CameraConfig, CameraEvent, CameraRegistry, CameraState, FrameReader, FrameSource,
    MemoryStore, Rect, Resolution, Size, Subscription, layout,
};
use tokio::sync::mpsc;

/// Frame source whose connections stream on demand from the test
struct ChannelSource {
    // Senders for accepted connections, keyed by camera name.
    taps: Mutex<HashMap<String, mpsc::UnboundedSender<Resolution>>>,
    // Announces each accepted connection by camera name.
    announce: mpsc::UnboundedSender<String>,
}

impl ChannelSource {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (announce, connections) = mpsc::unbounded_channel();
        (Arc::new(Self { taps: Mutex::new(HashMap::new()), announce }), connections)
    }

    /// Make the most recent connection for `name` emit one frame
    fn emit(&self, name: &str) {
        let taps = self.taps.lock().unwrap_or_else(PoisonError::into_inner);
        let tap = taps.get(name).expect("camera has connected");
        tap.send(Resolution::FULL_HD).expect("reader alive");
    }
}

/// Wait until the source has accepted a connection for `name`
async fn wait_for_connection(connections: &mut mpsc::UnboundedReceiver<String>, name: &str) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let connected = connections.recv().await.expect("source alive");
            if connected == name {
                return;
            }
        }
    })
    .await
    .expect("timed out waiting for connection")
}

#[async_trait]
impl FrameSource for ChannelSource {
    async fn connect(
        &self,
        config: &CameraConfig,
        resolution: Resolution,
    ) -> camgrid::Result<Box<dyn FrameReader>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.taps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(config.name.clone(), tx);
        let _ = self.announce.send(config.name.clone());
        Ok(Box::new(ChannelReader { resolution, frames: rx }))
    }
}

struct ChannelReader {
    resolution: Resolution,
    frames: mpsc::UnboundedReceiver<Resolution>,
}

#[async_trait]
impl FrameReader for ChannelReader {
    async fn next_frame(&mut self) -> camgrid::Result<Option<camgrid::VideoFrame>> {
        match self.frames.recv().await {
            Some(_) => {
                Ok(Some(camgrid::VideoFrame::captured_now(vec![0u8; 64], self.resolution)))
            }
            None => Ok(None),
        }
    }
}

async fn wait_for_state(
    events: &mut Subscription,
    registry: &CameraRegistry,
    id: camgrid::CameraId,
    wanted: CameraState,
) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = events.recv().await.expect("event channel open");
            if let CameraEvent::StateChanged { id: eid, state, .. } = event {
                if eid == id && state == wanted {
                    return;
                }
            }
        }
    })
    .await
    .expect("timed out waiting for state");
    assert_eq!(registry.get(id).map(|c| c.state()), Some(wanted));
}

#[tokio::test]
async fn grid_viewer_session() {
    let _ = tracing_subscriber::fmt().with_env_filter("camgrid=debug").try_init();

    let (source, mut connections) = ChannelSource::new();
    let mut registry = CameraRegistry::new(
        Arc::clone(&source) as Arc<dyn FrameSource>,
        Box::new(MemoryStore::new()),
    );
    let mut events = registry.subscribe();

    // Build a three-camera wall.
    let front = registry.add(CameraConfig::new("front", "10.0.0.10")).expect("add");
    let back = registry.add(CameraConfig::new("back", "10.0.0.11")).expect("add");
    let gate = registry.add(CameraConfig::new("gate", "10.0.0.12")).expect("add");
    assert_eq!(registry.len(), 3);

    // Three cameras lay out as one row of three.
    let container = Size::new(1920, 1080);
    let rects = layout::layout(&registry.panels(), container, None);
    assert_eq!(rects.len(), 3);
    let bounds = Rect::new(0, 0, 1920, 1080);
    for rect in rects.values() {
        assert!(bounds.contains(rect));
        assert!(rect.width <= 640);
    }

    // Start two of the three; each runs once its stream delivers a frame.
    registry.start(front).expect("start front");
    registry.start(back).expect("start back");
    wait_for_connection(&mut connections, "front").await;
    source.emit("front");
    wait_for_state(&mut events, &registry, front, CameraState::Running).await;
    wait_for_connection(&mut connections, "back").await;
    source.emit("back");
    wait_for_state(&mut events, &registry, back, CameraState::Running).await;
    assert_eq!(registry.get(gate).map(|c| c.state()), Some(CameraState::Stopped));

    // Frames carry the camera id so a renderer can route them to panels.
    source.emit("front");
    let frame_id = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await.expect("event channel open") {
                CameraEvent::Frame { id, .. } => return id,
                _ => continue,
            }
        }
    })
    .await
    .expect("frame arrives");
    assert_eq!(frame_id, front);

    // Fullscreen one camera, then drop back to the grid.
    let full = layout::layout(&registry.panels(), container, Some(back));
    assert_eq!(full[&back], bounds);
    assert!(full[&front].is_hidden());
    assert!(full[&gate].is_hidden());
    let restored = layout::layout(&registry.panels(), container, None);
    assert_eq!(restored, rects);

    // Swapping two cameras swaps their grid cells.
    registry.swap(front, gate);
    let swapped = layout::layout(&registry.panels(), container, None);
    assert_eq!(swapped[&front], rects[&gate]);
    assert_eq!(swapped[&gate], rects[&front]);
    assert_eq!(swapped[&back], rects[&back]);

    // A live resolution change swaps streams only once the new one proves
    // itself; the registry reflects the new resolution afterwards.
    registry.change_resolution(front, Resolution::HD).expect("transition starts");
    wait_for_connection(&mut connections, "front").await;
    source.emit("front"); // the candidate's first frame promotes it
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let CameraEvent::ResolutionChanged { id, resolution } =
                events.recv().await.expect("event channel open")
            {
                assert_eq!(id, front);
                assert_eq!(resolution, Resolution::HD);
                return;
            }
        }
    })
    .await
    .expect("transition completes");
    assert_eq!(registry.get(front).map(|c| c.resolution()), Some(Resolution::HD));

    // Shut the wall down.
    registry.stop_all();
    wait_for_state(&mut events, &registry, front, CameraState::Stopped).await;
    for controller in registry.get_all() {
        assert_eq!(controller.state(), CameraState::Stopped);
    }
}

#[tokio::test]
async fn persistence_survives_a_restart() {
    let (source, _connections) = ChannelSource::new();
    let store = Arc::new(MemoryStore::new());

    struct SharedStore(Arc<MemoryStore>);
    impl camgrid::ConfigStore for SharedStore {
        fn load(
            &self,
        ) -> camgrid::Result<(Vec<CameraConfig>, Option<camgrid::CameraId>)> {
            self.0.load()
        }
        fn save(
            &self,
            configs: &[CameraConfig],
            selected: Option<camgrid::CameraId>,
        ) -> camgrid::Result<()> {
            self.0.save(configs, selected)
        }
    }

    let mut registry = CameraRegistry::new(
        Arc::clone(&source) as Arc<dyn FrameSource>,
        Box::new(SharedStore(Arc::clone(&store))),
    );
    let a = registry
        .add(CameraConfig::new("front", "10.0.0.10").with_resolution(Resolution::SD))
        .expect("add");
    let b = registry.add(CameraConfig::new("back", "10.0.0.11")).expect("add");
    registry.select(Some(b));
    registry.save().expect("save");
    drop(registry);

    let mut restored =
        CameraRegistry::new(source as Arc<dyn FrameSource>, Box::new(SharedStore(store)));
    restored.load();

    assert_eq!(restored.order(), vec![a, b]);
    assert_eq!(restored.selected(), Some(b));
    let config = restored.get(a).map(|c| c.config()).expect("camera restored");
    assert_eq!(config.resolution, Resolution::SD);
    assert_eq!(config.name, "front");
}
