//! Capture strategies — how a stream is acquired, rendered and frozen.
//!
//! Two environments, two strategies behind one trait:
//!
//! - `WebStrategy` — desktop. Stream bound to the embedded preview element
//!   in the main window; the user frames the card and clicks capture.
//! - `MobileFullscreenStrategy` — phone/tablet. Rear camera preferred, the
//!   stream fills a dedicated fullscreen surface, capture is a single tap.
//!
//! The choice is made once per session from the device profile; callers
//! never branch on device type anywhere else.

use super::device::{
    DeviceProfile, DeviceType, FacingMode, MediaDevices, RenderSurface, StreamConstraints,
    StreamHandle,
};
use super::{CameraError, CapturedImage};
use crate::card::Side;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Which strategy variant is live — surfaced through the manager status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureMode {
    Web,
    MobileFullscreen,
}

/// Render destinations supplied by the caller. The strategy decides which
/// one it uses and whether the surface is fullscreen.
#[derive(Debug, Clone)]
pub struct RenderTargets {
    /// Window label + element id of the embedded preview (desktop).
    pub preview_window: String,
    pub preview_element: String,
    /// Window label of the fullscreen capture surface (mobile).
    pub fullscreen_window: String,
}

impl Default for RenderTargets {
    fn default() -> Self {
        Self {
            preview_window: "main".to_string(),
            preview_element: "camera-preview".to_string(),
            fullscreen_window: "camera-capture".to_string(),
        }
    }
}

/// Uniform capture contract. Exactly one strategy instance is live at a
/// time, owned by the manager.
#[async_trait]
pub trait CaptureStrategy: Send + Sync {
    fn mode(&self) -> CaptureMode;

    /// True while a hardware stream is bound.
    fn is_active(&self) -> bool;

    /// Acquire and bind a stream for `side`. No-op success when already
    /// active for the same side; switching sides releases the old stream
    /// first.
    async fn start(&mut self, side: Side, targets: &RenderTargets) -> Result<(), CameraError>;

    /// Freeze the current frame into an encoded still.
    async fn capture(&mut self) -> Result<CapturedImage, CameraError>;

    /// Release all hardware tracks. Safe to call when already stopped.
    async fn stop(&mut self);
}

/// Pick the strategy for a profile. Desktop gets the embedded preview;
/// mobile and tablet get the fullscreen flow.
pub fn select_strategy(
    profile: &DeviceProfile,
    devices: Arc<dyn MediaDevices>,
) -> Box<dyn CaptureStrategy> {
    match profile.device_type {
        DeviceType::Desktop => Box::new(WebStrategy::new(devices)),
        DeviceType::Mobile | DeviceType::Tablet => {
            Box::new(MobileFullscreenStrategy::new(devices))
        }
    }
}

// ── Shared stream plumbing ───────────────────────────────────────────

/// Stream state both strategies share: acquisition with facing fallback,
/// frame freeze, release.
struct StreamSlot {
    devices: Arc<dyn MediaDevices>,
    stream: Option<StreamHandle>,
    side: Option<Side>,
}

impl StreamSlot {
    fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self {
            devices,
            stream: None,
            side: None,
        }
    }

    /// Open with the preferred facing, falling back to any camera when the
    /// preference cannot be satisfied. Permission refusals do not fall back
    /// — retrying would just re-prompt the user.
    async fn acquire(
        &mut self,
        preferred: FacingMode,
        width: u32,
        height: u32,
    ) -> Result<StreamHandle, CameraError> {
        let constraints = StreamConstraints {
            facing: preferred,
            width,
            height,
        };
        match self.devices.open_stream(&constraints).await {
            Ok(stream) => Ok(stream),
            Err(CameraError::PermissionDenied) => Err(CameraError::PermissionDenied),
            Err(e) if preferred != FacingMode::Unknown => {
                log::warn!(
                    "[CAMERA] {:?} camera unavailable ({}), falling back to any",
                    preferred,
                    e
                );
                self.devices
                    .open_stream(&StreamConstraints {
                        facing: FacingMode::Unknown,
                        width,
                        height,
                    })
                    .await
            }
            Err(e) => Err(e),
        }
    }

    async fn freeze(&self) -> Result<(Vec<u8>, String), CameraError> {
        let stream = self.stream.as_ref().ok_or(CameraError::NotActive)?;
        let frame = self.devices.grab_frame(stream).await?;
        Ok((frame.bytes, frame.mime))
    }

    async fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.devices.close_stream(stream).await;
        }
        self.side = None;
    }
}

// ── Desktop: embedded preview, explicit capture ──────────────────────

pub struct WebStrategy {
    slot: StreamSlot,
}

impl WebStrategy {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self {
            slot: StreamSlot::new(devices),
        }
    }
}

#[async_trait]
impl CaptureStrategy for WebStrategy {
    fn mode(&self) -> CaptureMode {
        CaptureMode::Web
    }

    fn is_active(&self) -> bool {
        self.slot.stream.is_some()
    }

    async fn start(&mut self, side: Side, targets: &RenderTargets) -> Result<(), CameraError> {
        if self.slot.stream.is_some() && self.slot.side == Some(side) {
            log::debug!("[CAMERA] Web strategy already active for {}", side);
            return Ok(());
        }
        self.slot.release().await;

        // Webcams are front-facing by construction; the preference only
        // matters on machines with more than one camera attached.
        let stream = self.slot.acquire(FacingMode::Front, 1280, 720).await?;
        let surface = RenderSurface {
            window: targets.preview_window.clone(),
            element: targets.preview_element.clone(),
            fullscreen: false,
        };
        if let Err(e) = self.slot.devices.bind_preview(&stream, &surface).await {
            self.slot.devices.close_stream(stream).await;
            return Err(e);
        }

        self.slot.stream = Some(stream);
        self.slot.side = Some(side);
        log::info!("[CAMERA] Web strategy active for {} side", side);
        Ok(())
    }

    async fn capture(&mut self) -> Result<CapturedImage, CameraError> {
        let side = self.slot.side.ok_or(CameraError::NotActive)?;
        let (bytes, mime) = self.slot.freeze().await?;
        Ok(CapturedImage { bytes, mime, side })
    }

    async fn stop(&mut self) {
        self.slot.release().await;
    }
}

// ── Mobile: fullscreen surface, rear camera, tap to capture ──────────

pub struct MobileFullscreenStrategy {
    slot: StreamSlot,
}

impl MobileFullscreenStrategy {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self {
            slot: StreamSlot::new(devices),
        }
    }
}

#[async_trait]
impl CaptureStrategy for MobileFullscreenStrategy {
    fn mode(&self) -> CaptureMode {
        CaptureMode::MobileFullscreen
    }

    fn is_active(&self) -> bool {
        self.slot.stream.is_some()
    }

    async fn start(&mut self, side: Side, targets: &RenderTargets) -> Result<(), CameraError> {
        if self.slot.stream.is_some() && self.slot.side == Some(side) {
            log::debug!("[CAMERA] Fullscreen strategy already active for {}", side);
            return Ok(());
        }
        self.slot.release().await;

        // Card shots want the rear camera and as many pixels as the sensor
        // will give — OCR quality tracks capture resolution directly.
        let stream = self.slot.acquire(FacingMode::Back, 1920, 1080).await?;
        let surface = RenderSurface {
            window: targets.fullscreen_window.clone(),
            element: "camera-viewport".to_string(),
            fullscreen: true,
        };
        if let Err(e) = self.slot.devices.bind_preview(&stream, &surface).await {
            self.slot.devices.close_stream(stream).await;
            return Err(e);
        }

        self.slot.stream = Some(stream);
        self.slot.side = Some(side);
        log::info!("[CAMERA] Fullscreen strategy active for {} side", side);
        Ok(())
    }

    async fn capture(&mut self) -> Result<CapturedImage, CameraError> {
        let side = self.slot.side.ok_or(CameraError::NotActive)?;
        let (bytes, mime) = self.slot.freeze().await?;
        Ok(CapturedImage { bytes, mime, side })
    }

    async fn stop(&mut self) {
        self.slot.release().await;
    }
}
