//! Camera manager — the capture state machine.
//!
//! Single owner of the active strategy and, through it, the hardware
//! stream. Nothing else in the crate holds a stream handle: leaked camera
//! lights come from exactly one place, and that place is here.
//!
//! States: Uninitialized → Initializing → Active ⇄ Capturing → Stopped
//! (restartable); any state → Error on failure.

use super::device::{probe, DeviceProfile, MediaDevices};
use super::strategy::{select_strategy, CaptureMode, CaptureStrategy, RenderTargets};
use super::{CameraError, CapturedImage};
use crate::card::Side;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraStatus {
    Uninitialized,
    Initializing,
    Active,
    Capturing,
    Stopped,
    Error,
}

/// Observable manager state for the frontend and for tests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSnapshot {
    pub state: CameraStatus,
    pub mode: Option<CaptureMode>,
    pub target: Option<Side>,
    pub strategy_active: bool,
}

pub struct CameraManager {
    devices: Arc<dyn MediaDevices>,
    profile: Option<DeviceProfile>,
    strategy: Option<Box<dyn CaptureStrategy>>,
    status: CameraStatus,
    target: Option<Side>,
}

impl CameraManager {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self {
            devices,
            profile: None,
            strategy: None,
            status: CameraStatus::Uninitialized,
            target: None,
        }
    }

    /// The device profile, probed on first use and frozen for the session.
    pub async fn profile(&mut self) -> &DeviceProfile {
        if self.profile.is_none() {
            self.profile = Some(probe(self.devices.as_ref()).await);
        }
        self.profile.as_ref().unwrap()
    }

    /// Start (or switch) a capture session for one card side.
    ///
    /// Selects the strategy on first use and keeps it for the whole
    /// session. Starting the side that is already active is a no-op;
    /// starting the other side stops the previous session first. Any
    /// failure releases partial resources and parks the machine in Error —
    /// a fresh user-initiated start is the only way out.
    pub async fn start_camera(
        &mut self,
        side: Side,
        targets: &RenderTargets,
    ) -> Result<(), CameraError> {
        let profile = self.profile().await.clone();
        if !profile.has_camera {
            log::warn!("[CAMERA] Start refused — no camera in device profile");
            self.status = CameraStatus::Error;
            return Err(CameraError::NoCameraFound);
        }

        if self.status == CameraStatus::Active && self.target == Some(side) {
            return Ok(());
        }

        if self.strategy.is_none() {
            self.strategy = Some(select_strategy(&profile, Arc::clone(&self.devices)));
        }
        let strategy = self.strategy.as_mut().unwrap();

        // One live hardware session process-wide: switching sides tears the
        // old stream down before the new one opens.
        if strategy.is_active() && self.target != Some(side) {
            log::info!(
                "[CAMERA] Switching side {:?} → {}, stopping previous session",
                self.target,
                side
            );
            strategy.stop().await;
        }

        self.status = CameraStatus::Initializing;
        log::info!("[CAMERA] Starting {:?} session for {} side", strategy.mode(), side);

        match strategy.start(side, targets).await {
            Ok(()) => {
                self.status = CameraStatus::Active;
                self.target = Some(side);
                Ok(())
            }
            Err(e) => {
                log::error!("[CAMERA] Start failed: {}", e);
                strategy.stop().await;
                self.status = CameraStatus::Error;
                self.target = None;
                Err(e)
            }
        }
    }

    /// Freeze the current frame. Only valid while Active with a live
    /// strategy; transitions through Capturing and back.
    pub async fn take_photo(&mut self) -> Result<CapturedImage, CameraError> {
        if self.status != CameraStatus::Active {
            return Err(CameraError::NotReady);
        }
        let strategy = self.strategy.as_mut().ok_or(CameraError::NotReady)?;
        if !strategy.is_active() {
            return Err(CameraError::NotReady);
        }

        self.status = CameraStatus::Capturing;
        match strategy.capture().await {
            Ok(image) => {
                self.status = CameraStatus::Active;
                log::info!(
                    "[CAMERA] Captured {} bytes ({}) for {} side",
                    image.bytes.len(),
                    image.mime,
                    image.side
                );
                Ok(image)
            }
            Err(e) => {
                // A failed freeze means the stream is gone or wedged; don't
                // leave it half-open behind an Active status.
                log::error!("[CAMERA] Capture failed: {}", e);
                strategy.stop().await;
                self.status = CameraStatus::Error;
                self.target = None;
                Err(e)
            }
        }
    }

    /// Stop the session and release the hardware. Callable from any state,
    /// any number of times; the stream is released before this returns.
    pub async fn stop_camera(&mut self) {
        if let Some(strategy) = self.strategy.as_mut() {
            strategy.stop().await;
        }
        self.status = CameraStatus::Stopped;
        self.target = None;
        log::info!("[CAMERA] Stopped");
    }

    /// Pure observer.
    pub fn status(&self) -> CameraSnapshot {
        CameraSnapshot {
            state: self.status,
            mode: self.strategy.as_ref().map(|s| s.mode()),
            target: self.target,
            strategy_active: self
                .strategy
                .as_ref()
                .map(|s| s.is_active())
                .unwrap_or(false),
        }
    }
}
