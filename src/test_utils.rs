//! Test doubles for the frame source boundary
//!
//! [`ScriptedSource`] is a [`FrameSource`] whose connections are driven from
//! the test body: the test receives a [`ScriptedConnection`] per `connect`
//! call and decides exactly when frames arrive and when the stream fails.
//! Connection release is observable through [`ScriptedConnection::closed`],
//! which is how tests assert "the old primary received exactly one stop
//! request".

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::config::CameraConfig;
use crate::error::CameraError;
use crate::source::{FrameReader, FrameSource};
use crate::types::{Resolution, VideoFrame};
use crate::Result;

/// How the source answers `connect` calls
#[derive(Debug, Clone, Copy)]
pub(crate) enum ConnectMode {
    /// Connect immediately; the test drives the resulting connection
    Accept,
    /// Never finish connecting (for timeout tests)
    Hang,
    /// Reject with an authentication failure
    RefuseAuth,
}

enum ReaderCommand {
    Frame,
    Fail(CameraError),
    End,
}

/// Scripted frame source
pub(crate) struct ScriptedSource {
    mode: ConnectMode,
    connections: mpsc::UnboundedSender<ScriptedConnection>,
}

/// Test-side stream of connections the source has accepted
pub(crate) struct Connections {
    rx: mpsc::UnboundedReceiver<ScriptedConnection>,
}

impl Connections {
    /// Wait for the next `connect` call to land
    pub(crate) async fn next(&mut self) -> ScriptedConnection {
        tokio::time::timeout(std::time::Duration::from_secs(2), self.rx.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("scripted source dropped")
    }

    /// Assert that no further connection attempt arrives within `wait`
    pub(crate) async fn expect_none(&mut self, wait: std::time::Duration) {
        tokio::time::sleep(wait).await;
        assert!(self.rx.try_recv().is_err(), "unexpected connection attempt");
    }
}

/// Handle to one accepted connection, driven by the test
pub(crate) struct ScriptedConnection {
    /// Resolution the worker asked for
    pub(crate) resolution: Resolution,
    commands: mpsc::UnboundedSender<ReaderCommand>,
    alive: CancellationToken,
}

impl ScriptedConnection {
    /// Deliver one frame at the connected resolution
    pub(crate) fn emit_frame(&self) {
        let _ = self.commands.send(ReaderCommand::Frame);
    }

    /// Fail the next read with `error`
    pub(crate) fn fail(&self, error: CameraError) {
        let _ = self.commands.send(ReaderCommand::Fail(error));
    }

    /// End the stream without an explicit error (reader yields `Ok(None)`)
    pub(crate) fn end_stream(&self) {
        let _ = self.commands.send(ReaderCommand::End);
    }

    /// Whether the reader side has been dropped
    pub(crate) fn is_closed(&self) -> bool {
        self.alive.is_cancelled()
    }

    /// Wait until the reader side is dropped (connection released)
    pub(crate) async fn closed(&self) {
        tokio::time::timeout(std::time::Duration::from_secs(2), self.alive.cancelled())
            .await
            .expect("timed out waiting for connection release");
    }
}

impl ScriptedSource {
    /// Create a source plus the test-side connection stream
    pub(crate) fn new(mode: ConnectMode) -> (Arc<Self>, Connections) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { mode, connections: tx }), Connections { rx })
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn connect(
        &self,
        _config: &CameraConfig,
        resolution: Resolution,
    ) -> Result<Box<dyn FrameReader>> {
        match self.mode {
            ConnectMode::Accept => {
                let (tx, rx) = mpsc::unbounded_channel();
                let alive = CancellationToken::new();
                let connection =
                    ScriptedConnection { resolution, commands: tx, alive: alive.clone() };
                let _ = self.connections.send(connection);
                Ok(Box::new(ScriptedReader {
                    resolution,
                    commands: rx,
                    _release: alive.drop_guard(),
                }))
            }
            ConnectMode::Hang => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
            ConnectMode::RefuseAuth => Err(CameraError::auth_failure("bad credentials")),
        }
    }
}

struct ScriptedReader {
    resolution: Resolution,
    commands: mpsc::UnboundedReceiver<ReaderCommand>,
    // Cancels the connection's `alive` token on drop.
    _release: DropGuard,
}

#[async_trait]
impl FrameReader for ScriptedReader {
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        match self.commands.recv().await {
            Some(ReaderCommand::Frame) => {
                Ok(Some(VideoFrame::captured_now(vec![0u8; 16], self.resolution)))
            }
            Some(ReaderCommand::Fail(error)) => Err(error),
            Some(ReaderCommand::End) => Ok(None),
            None => {
                // Test dropped its handle; idle until the worker cancels us.
                futures::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
