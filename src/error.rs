//! Error types for camera streaming and registry operations.
//!
//! ## Error Categories
//!
//! - **Config Errors**: invalid camera configuration, rejected at the
//!   registry boundary before anything changes
//! - **Worker Errors**: connect timeouts, authentication failures and read
//!   errors from a live stream; these put a camera into the `Error` state
//!   when they strike its primary worker, and are absorbed as non-fatal
//!   events when they strike a transition candidate
//! - **Lookup Errors**: operations referencing a removed or nonexistent
//!   camera id
//! - **Store Errors**: failures of the external persistence collaborator
//!
//! ## Recovery and Retry
//!
//! The core performs no automatic retry; errors report whether a retry by
//! the caller could plausibly succeed:
//!
//! ```rust
//! use camgrid::CameraError;
//! use std::time::Duration;
//!
//! let error = CameraError::connect_timeout(Duration::from_secs(20));
//! assert!(error.is_retryable());
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::camera::CameraState;
use crate::types::CameraId;

/// Result type alias for camera operations.
pub type Result<T, E = CameraError> = std::result::Result<T, E>;

/// Main error type for camera operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CameraError {
    #[error("invalid camera config: {reason}")]
    ConfigInvalid { reason: String },

    #[error("connection attempt timed out after {duration:?}")]
    ConnectTimeout { duration: Duration },

    #[error("authentication failed: {reason}")]
    AuthFailure { reason: String },

    #[error("stream read failed: {reason}")]
    StreamRead {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("unknown camera id {id}")]
    UnknownCamera { id: CameraId },

    #[error("{operation} is not valid while camera is {state}")]
    InvalidState { operation: &'static str, state: CameraState },

    #[error("config store error: {reason}")]
    Store {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl CameraError {
    /// Returns whether retrying the operation could plausibly succeed.
    ///
    /// Transient network and store conditions are retryable; configuration,
    /// credential and lookup errors are not; the caller must change
    /// something first.
    pub fn is_retryable(&self) -> bool {
        match self {
            CameraError::ConnectTimeout { .. } => true,
            CameraError::StreamRead { .. } => true,
            CameraError::Store { .. } => true,
            CameraError::ConfigInvalid { .. } => false,
            CameraError::AuthFailure { .. } => false,
            CameraError::UnknownCamera { .. } => false,
            CameraError::InvalidState { .. } => false,
        }
    }

    /// Helper constructor for config validation errors.
    pub fn config_invalid(reason: impl Into<String>) -> Self {
        CameraError::ConfigInvalid { reason: reason.into() }
    }

    /// Helper constructor for connect timeouts.
    pub fn connect_timeout(duration: Duration) -> Self {
        CameraError::ConnectTimeout { duration }
    }

    /// Helper constructor for authentication failures.
    pub fn auth_failure(reason: impl Into<String>) -> Self {
        CameraError::AuthFailure { reason: reason.into() }
    }

    /// Helper constructor for stream read errors.
    pub fn stream_read(reason: impl Into<String>) -> Self {
        CameraError::StreamRead { reason: reason.into(), source: None }
    }

    /// Helper constructor for stream read errors with a source.
    pub fn stream_read_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        CameraError::StreamRead { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for unknown camera ids.
    pub fn unknown_camera(id: CameraId) -> Self {
        CameraError::UnknownCamera { id }
    }

    /// Helper constructor for operations illegal in the current state.
    pub fn invalid_state(operation: &'static str, state: CameraState) -> Self {
        CameraError::InvalidState { operation, state }
    }

    /// Helper constructor for store errors.
    pub fn store_error(reason: impl Into<String>) -> Self {
        CameraError::Store { reason: reason.into(), source: None }
    }

    /// Helper constructor for store errors with a source.
    pub fn store_error_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        CameraError::Store { reason: reason.into(), source: Some(source) }
    }
}
