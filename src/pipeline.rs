//! Scan pipeline commands.
//!
//! The multi-step orchestration lives here, one command per user gesture:
//! - start_camera / stop_camera: capture session lifecycle
//! - capture_photo / upload_side_image: produce a side image
//! - scan_side: image → OCR → segmentation → classification → merge
//! - reparse_side: re-run everything after OCR from the retained raw text
//!
//! Each side owns its lifecycle; both may be in flight at once. The only
//! cross-side contention point is the record mutex inside apply_text.

use crate::camera::{CameraState, DeviceType, RenderTargets};
use crate::card::{
    classify_fields, merge_fields, ParseStatus, ScanState, Side, SideSnapshot, StoredCapture,
};
use crate::ocr::{self, OcrClient};
use crate::storage::CaptureStore;
use base64::Engine;
use serde::Serialize;
use tauri::{Emitter, Manager};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatusEvent {
    pub side: Side,
    pub status: ParseStatus,
}

/// What a capture or upload hands back to the frontend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReply {
    pub side: Side,
    pub path: Option<String>,
    /// data: URL for the preview <img>.
    pub preview: String,
}

fn emit_status(app: &tauri::AppHandle, side: Side, status: ParseStatus) {
    let _ = app.emit("scan-status", ScanStatusEvent { side, status });
}

async fn set_status(app: &tauri::AppHandle, scan: &ScanState, side: Side, status: ParseStatus) {
    scan.side(side).lock().await.parse_status = status;
    emit_status(app, side, status);
}

// ── Camera session ───────────────────────────────────────────────────

/// Tauri command: start (or switch) the capture session for a card side.
///
/// Probes the device on first use; mobile profiles get the fullscreen
/// capture window opened before the stream binds to it.
#[tauri::command]
pub async fn start_camera(
    app: tauri::AppHandle,
    camera: tauri::State<'_, CameraState>,
    side: Side,
) -> Result<crate::camera::CameraSnapshot, String> {
    let mut manager = camera.manager.lock().await;

    let profile = manager.profile().await.clone();
    if profile.device_type != DeviceType::Desktop {
        ensure_capture_window(&app)?;
    }

    manager
        .start_camera(side, &RenderTargets::default())
        .await
        .map_err(|e| e.to_string())?;
    Ok(manager.status())
}

/// Tauri command: stop the capture session and release the hardware.
#[tauri::command]
pub async fn stop_camera(
    app: tauri::AppHandle,
    camera: tauri::State<'_, CameraState>,
) -> Result<(), String> {
    camera.manager.lock().await.stop_camera().await;
    if let Some(window) = app.get_webview_window("camera-capture") {
        let _ = window.destroy();
    }
    Ok(())
}

fn ensure_capture_window(app: &tauri::AppHandle) -> Result<(), String> {
    if app.get_webview_window("camera-capture").is_some() {
        return Ok(());
    }
    tauri::WebviewWindowBuilder::new(
        app,
        "camera-capture",
        tauri::WebviewUrl::App("camera.html".into()),
    )
    .title("Card Lens Camera")
    .fullscreen(true)
    .decorations(false)
    .build()
    .map_err(|e| format!("Failed to create capture window: {}", e))?;
    Ok(())
}

// ── Image ingestion ──────────────────────────────────────────────────

/// Tauri command: freeze a frame for the active session's side.
#[tauri::command]
pub async fn capture_photo(
    app: tauri::AppHandle,
    camera: tauri::State<'_, CameraState>,
    scan: tauri::State<'_, ScanState>,
) -> Result<CaptureReply, String> {
    let start = std::time::Instant::now();
    let image = {
        let mut manager = camera.manager.lock().await;
        manager.take_photo().await.map_err(|e| e.to_string())?
    };
    log::info!(
        "[PIPELINE] Capture: {} bytes in {}ms",
        image.bytes.len(),
        start.elapsed().as_millis()
    );
    ingest(&app, &scan, image.side, image.bytes, image.mime).await
}

/// Tauri command: ingest a picked/uploaded image for a side.
///
/// Accepts raw base64 or a full data: URL, as file pickers produce either.
#[tauri::command]
pub async fn upload_side_image(
    app: tauri::AppHandle,
    scan: tauri::State<'_, ScanState>,
    side: Side,
    data: String,
    mime: Option<String>,
) -> Result<CaptureReply, String> {
    let (encoded, data_url_mime) = match data.split_once(";base64,") {
        Some((head, body)) => (body, head.strip_prefix("data:").map(|m| m.to_string())),
        None => (data.as_str(), None),
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| format!("Bad image data: {}", e))?;
    let mime = mime
        .or(data_url_mime)
        .unwrap_or_else(|| "image/jpeg".to_string());
    ingest(&app, &scan, side, bytes, mime).await
}

/// Shared ingestion path: persist, reset the side lifecycle, hand back a
/// preview. A new image always voids the side's previous parse.
async fn ingest(
    app: &tauri::AppHandle,
    scan: &ScanState,
    side: Side,
    bytes: Vec<u8>,
    mime: String,
) -> Result<CaptureReply, String> {
    let path = match CaptureStore::from_app_data() {
        Some(store) => match store.save(side, &bytes, &mime) {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("[STORAGE] Keeping {} capture in memory only: {}", side, e);
                None
            }
        },
        None => None,
    };

    let preview = format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    );

    let capture = StoredCapture { bytes, mime, path };
    let reply = CaptureReply {
        side,
        path: capture.path.as_ref().map(|p| p.display().to_string()),
        preview,
    };
    scan.side(side).lock().await.reset_with_image(capture);
    emit_status(app, side, ParseStatus::None);
    Ok(reply)
}

// ── Scan / parse ─────────────────────────────────────────────────────

/// Tauri command: run the full pipeline for one side.
#[tauri::command]
pub async fn scan_side(
    app: tauri::AppHandle,
    scan: tauri::State<'_, ScanState>,
    side: Side,
) -> Result<SideSnapshot, String> {
    run_scan(&app, &scan, side).await
}

/// Tauri command: manual parse — reuse the retained raw OCR text without
/// calling the engine again. Falls back to the full scan when this side
/// has no text yet.
#[tauri::command]
pub async fn reparse_side(
    app: tauri::AppHandle,
    scan: tauri::State<'_, ScanState>,
    side: Side,
) -> Result<SideSnapshot, String> {
    let retained = scan.side(side).lock().await.ocr_text.clone();
    match retained {
        Some(text) => {
            log::info!("[PIPELINE] Re-parsing {} side from retained text", side);
            set_status(&app, &scan, side, ParseStatus::Parsing).await;
            apply_text(&app, &scan, side, &text).await;
            Ok(scan.snapshot(side).await)
        }
        None => run_scan(&app, &scan, side).await,
    }
}

async fn run_scan(
    app: &tauri::AppHandle,
    scan: &ScanState,
    side: Side,
) -> Result<SideSnapshot, String> {
    let pipeline_start = std::time::Instant::now();

    let bytes = {
        let guard = scan.side(side).lock().await;
        guard
            .image
            .as_ref()
            .map(|i| i.bytes.clone())
            .ok_or_else(|| format!("No image for {} side — capture first", side))?
    };

    set_status(app, scan, side, ParseStatus::Parsing).await;

    // Stage 1: remote OCR
    let ocr_start = std::time::Instant::now();
    let client = OcrClient::from_env();
    let text = match client.recognize(&bytes).await {
        Ok(text) => text,
        Err(e) => {
            log::error!("[PIPELINE] OCR failed for {} side: {}", side, e);
            set_status(app, scan, side, ParseStatus::Error).await;
            return Err(e.to_string());
        }
    };
    log::info!(
        "[PIPELINE] OCR: {} chars in {}ms",
        text.chars().count(),
        ocr_start.elapsed().as_millis()
    );

    // Retain raw text before parsing — the manual-parse path feeds on it
    // even if a later stage goes sideways.
    scan.side(side).lock().await.ocr_text = Some(text.clone());

    // Stage 2: segmentation → classification → merge
    apply_text(app, scan, side, &text).await;

    log::info!(
        "[PIPELINE] {} side complete in {}ms",
        side,
        pipeline_start.elapsed().as_millis()
    );
    Ok(scan.snapshot(side).await)
}

/// Segmentation + classification + merge for one side's raw text.
///
/// Given the same text twice this is a no-op the second time: the merge
/// policy refuses to overwrite anything the first pass filled.
async fn apply_text(app: &tauri::AppHandle, scan: &ScanState, side: Side, text: &str) {
    let parse_start = std::time::Instant::now();
    let outcome = ocr::parse_fields(text, side);
    let mut fields = outcome.fields;
    classify_fields(&mut fields);
    log::info!(
        "[PIPELINE] Segmentation+classification: {} field(s) in {}ms",
        fields.len(),
        parse_start.elapsed().as_millis()
    );

    {
        // Single-writer discipline: every merge (front or back, scan or
        // re-parse) serializes on this lock.
        let mut record = scan.record.lock().await;
        merge_fields(&mut record, &fields);
        match side {
            Side::Front => record.front_ocr_text = Some(text.to_string()),
            Side::Back => record.back_ocr_text = Some(text.to_string()),
        }
        let _ = app.emit("record-updated", record.clone());
    }

    set_status(app, scan, side, ParseStatus::Success).await;
}
