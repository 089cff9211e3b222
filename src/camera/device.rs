//! Device boundary — capability probe and the media-hardware trait.
//!
//! Everything below the `MediaDevices` trait belongs to the environment
//! (webview `getUserMedia`, permissions, hardware): the trait is the whole
//! surface this crate relies on, so tests swap in a scripted backend and the
//! capture state machine never touches real hardware.

use super::CameraError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long the capability probe may block. Enumeration that does not
/// answer in time is treated the same as "no camera".
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    Front,
    Back,
    Unknown,
}

/// One camera the environment exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDescriptor {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "facing_unknown")]
    pub facing: FacingMode,
}

fn facing_unknown() -> FacingMode {
    FacingMode::Unknown
}

/// Stable per-session device classification. Computed once by `probe`,
/// immutable afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    pub device_type: DeviceType,
    pub has_camera: bool,
    pub cameras: Vec<CameraDescriptor>,
}

impl DeviceProfile {
    /// The closed-fail profile: desktop, no camera.
    pub fn fallback() -> Self {
        Self {
            device_type: DeviceType::Desktop,
            has_camera: false,
            cameras: Vec::new(),
        }
    }
}

/// What the environment reports about itself, used for classification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentReport {
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub viewport_width: u32,
}

/// Stream request parameters. `facing` is a preference ("ideal"), not a
/// requirement — acquisition falls back to any camera.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConstraints {
    pub facing: FacingMode,
    pub width: u32,
    pub height: u32,
}

/// Opaque handle to an open hardware stream. The environment owns the real
/// resource; holders must eventually pass the handle to `close_stream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamHandle(pub u64);

/// Where a live stream should render its preview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSurface {
    pub window: String,
    pub element: String,
    pub fullscreen: bool,
}

/// One still frame pulled off a stream.
#[derive(Debug, Clone)]
pub struct FrameData {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// The hardware boundary. May suspend indefinitely inside `open_stream`
/// while the environment shows a permission prompt; everything else is
/// bounded by the implementation.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn environment(&self) -> Result<EnvironmentReport, CameraError>;
    async fn enumerate_devices(&self) -> Result<Vec<CameraDescriptor>, CameraError>;
    async fn open_stream(&self, constraints: &StreamConstraints)
        -> Result<StreamHandle, CameraError>;
    async fn bind_preview(
        &self,
        stream: &StreamHandle,
        surface: &RenderSurface,
    ) -> Result<(), CameraError>;
    async fn grab_frame(&self, stream: &StreamHandle) -> Result<FrameData, CameraError>;
    /// Release the stream's tracks. Infallible and idempotent by contract.
    async fn close_stream(&self, stream: StreamHandle);
}

// ── Classification rules ─────────────────────────────────────────────

/// Deterministic device classification from the user agent, with a
/// narrow-viewport fallback when the UA is inconclusive.
pub fn classify_device(user_agent: &str, viewport_width: u32) -> DeviceType {
    let ua = user_agent.to_lowercase();

    if ua.contains("ipad") || ua.contains("tablet") {
        return DeviceType::Tablet;
    }
    // Android tablets advertise "android" without "mobile".
    if ua.contains("android") {
        return if ua.contains("mobile") {
            DeviceType::Mobile
        } else {
            DeviceType::Tablet
        };
    }
    if ["iphone", "ipod", "windows phone", "mobile"]
        .iter()
        .any(|m| ua.contains(m))
    {
        return DeviceType::Mobile;
    }
    if viewport_width > 0 && viewport_width <= 768 {
        return DeviceType::Mobile;
    }
    DeviceType::Desktop
}

/// Infer facing from a device label when the environment did not say.
pub fn facing_from_label(label: &str) -> FacingMode {
    let label = label.to_lowercase();
    if ["back", "rear", "environment"].iter().any(|m| label.contains(m)) {
        FacingMode::Back
    } else if ["front", "user", "facetime"].iter().any(|m| label.contains(m)) {
        FacingMode::Front
    } else {
        FacingMode::Unknown
    }
}

/// Probe the environment once. Never fails: any error, timeout, or missing
/// capability collapses to the desktop/no-camera fallback profile.
pub async fn probe(devices: &dyn MediaDevices) -> DeviceProfile {
    let override_type = device_type_override();

    let probed = tokio::time::timeout(PROBE_TIMEOUT, async {
        let env = devices.environment().await?;
        let cameras = devices.enumerate_devices().await?;
        Ok::<_, CameraError>((env, cameras))
    })
    .await;

    match probed {
        Ok(Ok((env, mut cameras))) => {
            for cam in &mut cameras {
                if cam.facing == FacingMode::Unknown {
                    cam.facing = facing_from_label(&cam.label);
                }
            }
            let device_type = override_type
                .unwrap_or_else(|| classify_device(&env.user_agent, env.viewport_width));
            let profile = DeviceProfile {
                device_type,
                has_camera: !cameras.is_empty(),
                cameras,
            };
            log::info!(
                "[CAMERA] Probe: {:?}, {} camera(s)",
                profile.device_type,
                profile.cameras.len()
            );
            profile
        }
        Ok(Err(e)) => {
            log::warn!("[CAMERA] Probe failed ({}), assuming no camera", e);
            DeviceProfile {
                device_type: override_type.unwrap_or(DeviceType::Desktop),
                ..DeviceProfile::fallback()
            }
        }
        Err(_) => {
            log::warn!(
                "[CAMERA] Probe timed out after {:?}, assuming no camera",
                PROBE_TIMEOUT
            );
            DeviceProfile {
                device_type: override_type.unwrap_or(DeviceType::Desktop),
                ..DeviceProfile::fallback()
            }
        }
    }
}

/// `DEVICE_TYPE` env override, mirroring how the provider override works.
fn device_type_override() -> Option<DeviceType> {
    match std::env::var("DEVICE_TYPE").ok()?.to_lowercase().as_str() {
        "desktop" => Some(DeviceType::Desktop),
        "mobile" => Some(DeviceType::Mobile),
        "tablet" => Some(DeviceType::Tablet),
        other => {
            if !other.is_empty() {
                log::warn!("[CAMERA] Ignoring unknown DEVICE_TYPE {:?}", other);
            }
            None
        }
    }
}
