//! Camera domain — public API.
//!
//! This module owns all camera functionality: the capability probe, the
//! webview hardware bridge, the two capture strategies, and the manager
//! state machine that fronts them. External code should only use what is
//! exported here; in particular, nothing outside this domain ever holds a
//! stream handle.

pub mod bridge;
pub mod device;
pub mod manager;
pub mod strategy;

pub use bridge::{PendingBridge, WebviewMediaDevices};
pub use device::{probe, CameraDescriptor, DeviceProfile, DeviceType, FacingMode, MediaDevices};
pub use manager::{CameraManager, CameraSnapshot, CameraStatus};
pub use strategy::{CaptureMode, RenderTargets};

use crate::card::Side;
use thiserror::Error;
use tokio::sync::Mutex;

/// Camera failures. Session-terminal: the manager parks in Error and the
/// user starts fresh — permission refusals in particular are never retried
/// mechanically.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera found")]
    NoCameraFound,

    #[error("failed to acquire video stream: {0}")]
    StreamAcquisitionFailed(String),

    #[error("no stream bound")]
    NotActive,

    #[error("camera not ready for capture")]
    NotReady,
}

/// An encoded still frozen from the stream. Ownership moves to the scan
/// pipeline, which handles storage and OCR submission.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub side: Side,
}

/// Tauri managed state wrapping the manager. The mutex is load-bearing:
/// holding the single manager behind one lock is what makes "at most one
/// live capture session process-wide" true.
pub struct CameraState {
    pub manager: Mutex<CameraManager>,
}

impl CameraState {
    pub fn new(manager: CameraManager) -> Self {
        Self {
            manager: Mutex::new(manager),
        }
    }
}
