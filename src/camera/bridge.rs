//! Webview media bridge — the production `MediaDevices` implementation.
//!
//! Hardware camera access lives in the webview (`getUserMedia` and friends);
//! this side drives it over a request/response event protocol:
//!
//!   Rust  — emit "camera-bridge-request" { id, op, params }
//!   JS    — perform the operation, invoke `camera_bridge_response(id, …)`
//!   Rust  — match the id against the pending map, wake the waiter
//!
//! `open` carries no timeout: a pending permission prompt can legitimately
//! sit unanswered for minutes and must not be failed from this side. The
//! query ops are bounded so a dead webview degrades to "no camera" instead
//! of a hang.

use super::device::{
    CameraDescriptor, EnvironmentReport, FrameData, MediaDevices, RenderSurface,
    StreamConstraints, StreamHandle, PROBE_TIMEOUT,
};
use super::CameraError;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tauri::Emitter;
use tokio::sync::oneshot;

const FRAME_TIMEOUT: Duration = Duration::from_secs(10);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(3);

/// Request envelope emitted to the webview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct BridgeRequest {
    id: u64,
    op: &'static str,
    params: serde_json::Value,
}

/// Error shape the webview reports — DOMException name + message.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeFault {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

type BridgeReply = Result<serde_json::Value, BridgeFault>;

/// In-flight bridge requests, registered as Tauri managed state so the
/// response command can find its waiter.
pub struct PendingBridge {
    pending: Mutex<HashMap<u64, oneshot::Sender<BridgeReply>>>,
    next_id: AtomicU64,
}

impl PendingBridge {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn register(&self) -> (u64, oneshot::Receiver<BridgeReply>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(id, tx);
        (id, rx)
    }

    fn forget(&self, id: u64) {
        self.pending.lock().unwrap().remove(&id);
    }

    /// Deliver a webview reply to its waiter. Unknown ids (late replies
    /// after a timeout) are dropped with a debug log.
    pub fn resolve(&self, id: u64, reply: BridgeReply) {
        match self.pending.lock().unwrap().remove(&id) {
            Some(tx) => {
                let _ = tx.send(reply);
            }
            None => log::debug!("[BRIDGE] Dropping reply for unknown request {}", id),
        }
    }
}

impl Default for PendingBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// `MediaDevices` over the webview bridge.
pub struct WebviewMediaDevices {
    app: tauri::AppHandle,
}

impl WebviewMediaDevices {
    pub fn new(app: tauri::AppHandle) -> Self {
        Self { app }
    }

    async fn request(
        &self,
        op: &'static str,
        params: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<serde_json::Value, CameraError> {
        let pending = {
            use tauri::Manager;
            self.app.state::<PendingBridge>()
        };
        let (id, rx) = pending.register();

        let envelope = BridgeRequest { id, op, params };
        if let Err(e) = self.app.emit("camera-bridge-request", &envelope) {
            pending.forget(id);
            return Err(CameraError::StreamAcquisitionFailed(format!(
                "bridge emit failed: {}",
                e
            )));
        }

        let reply = match timeout {
            Some(bound) => match tokio::time::timeout(bound, rx).await {
                Ok(received) => received,
                Err(_) => {
                    pending.forget(id);
                    log::warn!("[BRIDGE] {} timed out after {:?}", op, bound);
                    return Err(CameraError::StreamAcquisitionFailed(format!(
                        "{} timed out",
                        op
                    )));
                }
            },
            None => rx.await,
        };

        match reply {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(fault)) => Err(map_media_fault(&fault)),
            Err(_) => Err(CameraError::StreamAcquisitionFailed(
                "bridge channel closed".to_string(),
            )),
        }
    }
}

/// DOMException names onto camera errors. Anything unrecognized is a
/// generic acquisition failure carrying the original text.
fn map_media_fault(fault: &BridgeFault) -> CameraError {
    match fault.name.as_str() {
        "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
            CameraError::PermissionDenied
        }
        "NotFoundError" | "DevicesNotFoundError" | "OverconstrainedError" => {
            CameraError::NoCameraFound
        }
        _ => CameraError::StreamAcquisitionFailed(format!(
            "{}: {}",
            fault.name, fault.message
        )),
    }
}

#[async_trait]
impl MediaDevices for WebviewMediaDevices {
    async fn environment(&self) -> Result<EnvironmentReport, CameraError> {
        let value = self
            .request("environment", serde_json::Value::Null, Some(PROBE_TIMEOUT))
            .await?;
        serde_json::from_value(value)
            .map_err(|e| CameraError::StreamAcquisitionFailed(format!("bad environment: {}", e)))
    }

    async fn enumerate_devices(&self) -> Result<Vec<CameraDescriptor>, CameraError> {
        let value = self
            .request("enumerate", serde_json::Value::Null, Some(PROBE_TIMEOUT))
            .await?;
        serde_json::from_value(value)
            .map_err(|e| CameraError::StreamAcquisitionFailed(format!("bad device list: {}", e)))
    }

    async fn open_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<StreamHandle, CameraError> {
        // Unbounded: the user may be staring at a permission prompt.
        let value = self
            .request("open", serde_json::json!({ "constraints": constraints }), None)
            .await?;
        let id = value
            .get("streamId")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| {
                CameraError::StreamAcquisitionFailed("open reply missing streamId".to_string())
            })?;
        Ok(StreamHandle(id))
    }

    async fn bind_preview(
        &self,
        stream: &StreamHandle,
        surface: &RenderSurface,
    ) -> Result<(), CameraError> {
        self.request(
            "bind",
            serde_json::json!({ "streamId": stream.0, "surface": surface }),
            Some(FRAME_TIMEOUT),
        )
        .await
        .map(|_| ())
    }

    async fn grab_frame(&self, stream: &StreamHandle) -> Result<FrameData, CameraError> {
        let value = self
            .request(
                "frame",
                serde_json::json!({ "streamId": stream.0 }),
                Some(FRAME_TIMEOUT),
            )
            .await?;

        let encoded = value
            .get("base64")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                CameraError::StreamAcquisitionFailed("frame reply missing data".to_string())
            })?;
        let mime = value
            .get("mime")
            .and_then(|v| v.as_str())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| {
                CameraError::StreamAcquisitionFailed(format!("frame decode failed: {}", e))
            })?;
        Ok(FrameData { bytes, mime })
    }

    async fn close_stream(&self, stream: StreamHandle) {
        // Best effort — a webview that cannot answer has already dropped
        // its tracks with the page.
        if let Err(e) = self
            .request(
                "close",
                serde_json::json!({ "streamId": stream.0 }),
                Some(CLOSE_TIMEOUT),
            )
            .await
        {
            log::warn!("[BRIDGE] close_stream({}) not confirmed: {}", stream.0, e);
        }
    }
}
