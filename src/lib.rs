//! Multi-camera grid viewer core.
//!
//! Camgrid manages a wall of IP camera streams: per-camera lifecycle,
//! zero-gap resolution transitions and the grid geometry that places each
//! stream on screen. It is UI-agnostic; a rendering layer subscribes to the
//! event channel and draws frames into the rectangles the layout engine
//! hands out.
//!
//! # Features
//!
//! - **Per-camera lifecycle**: start, stop, pause and retry each camera
//!   independently; one camera's failure never touches its neighbors
//! - **Smooth resolution transitions**: a candidate stream is proven before
//!   the visible stream is swapped, so playback never gaps
//! - **Grid layout**: aspect-preserving placement for any camera count,
//!   with fullscreen override and position swapping
//! - **Pluggable boundaries**: bring your own transport ([`FrameSource`])
//!   and persistence ([`ConfigStore`])
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use camgrid::{
//!     CameraConfig, CameraEvent, CameraRegistry, FrameReader, FrameSource,
//!     MemoryStore, Resolution,
//! };
//!
//! struct RtspSource;
//!
//! #[async_trait]
//! impl FrameSource for RtspSource {
//!     async fn connect(
//!         &self,
//!         config: &CameraConfig,
//!         resolution: Resolution,
//!     ) -> camgrid::Result<Box<dyn FrameReader>> {
//!         // Open config.url() at the requested resolution here.
//!         todo!()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> camgrid::Result<()> {
//!     let mut registry =
//!         CameraRegistry::new(Arc::new(RtspSource), Box::new(MemoryStore::new()));
//!     let mut events = registry.subscribe();
//!
//!     let id = registry.add(CameraConfig::new("Front door", "192.168.1.20"))?;
//!     registry.start(id)?;
//!
//!     while let Some(event) = events.recv().await {
//!         if let CameraEvent::Frame { id, frame } = event {
//!             println!("{id}: {} bytes at {}", frame.data.len(), frame.resolution);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod camera;
pub mod config;
mod error;
pub mod events;
pub mod layout;
pub mod source;
pub mod store;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod types;
mod worker;

pub use camera::{CameraController, CameraRegistry, CameraState};
pub use config::CameraConfig;
pub use error::{CameraError, Result};
pub use events::{CameraEvent, Subscription};
pub use source::{FrameReader, FrameSource};
pub use store::{ConfigStore, MemoryStore};
pub use types::{CameraId, Rect, Resolution, Size, VideoFrame};
