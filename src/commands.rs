//! Simple Tauri command handlers.
//!
//! Thin wrappers that bridge frontend invoke() calls to Rust — read state,
//! tweak a field, relay a bridge reply. Multi-step orchestration lives in
//! pipeline.rs instead.

use crate::camera::bridge::{BridgeFault, PendingBridge};
use crate::camera::{CameraSnapshot, CameraState, DeviceProfile};
use crate::card::{CardRecord, ScanState, Side, SideSnapshot};
use crate::records::RecordsClient;
use tauri::Emitter;

/// Tauri command: deliver a webview reply to a pending bridge request.
///
/// The webview answers every "camera-bridge-request" event through this
/// command; exactly one of `result` / `error` is set.
#[tauri::command]
pub fn camera_bridge_response(
    pending: tauri::State<'_, PendingBridge>,
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<BridgeFault>,
) {
    let reply = match (result, error) {
        (_, Some(fault)) => Err(fault),
        (Some(value), None) => Ok(value),
        (None, None) => Ok(serde_json::Value::Null),
    };
    pending.resolve(id, reply);
}

/// Tauri command: the probed device profile (probes on first call).
#[tauri::command]
pub async fn get_device_profile(
    camera: tauri::State<'_, CameraState>,
) -> Result<DeviceProfile, String> {
    Ok(camera.manager.lock().await.profile().await.clone())
}

/// Tauri command: current camera state machine snapshot.
#[tauri::command]
pub async fn get_camera_status(
    camera: tauri::State<'_, CameraState>,
) -> Result<CameraSnapshot, String> {
    Ok(camera.manager.lock().await.status())
}

/// Tauri command: the in-memory record being assembled.
#[tauri::command]
pub async fn get_record(scan: tauri::State<'_, ScanState>) -> Result<CardRecord, String> {
    Ok(scan.record.lock().await.clone())
}

/// Tauri command: one side's scan lifecycle snapshot.
#[tauri::command]
pub async fn get_side_state(
    scan: tauri::State<'_, ScanState>,
    side: Side,
) -> Result<SideSnapshot, String> {
    Ok(scan.snapshot(side).await)
}

/// Tauri command: user edit of a single record field.
///
/// Edits go through the same record lock as merges, so a merge finishing
/// mid-edit can't resurrect an overwritten value.
#[tauri::command]
pub async fn set_record_field(
    app: tauri::AppHandle,
    scan: tauri::State<'_, ScanState>,
    key: String,
    value: String,
) -> Result<(), String> {
    let mut record = scan.record.lock().await;
    if !record.set(&key, value) {
        return Err(format!("Unknown field: {}", key));
    }
    let _ = app.emit("record-updated", record.clone());
    Ok(())
}

/// Tauri command: drop the in-memory record and both side lifecycles.
#[tauri::command]
pub async fn reset_scan(
    app: tauri::AppHandle,
    scan: tauri::State<'_, ScanState>,
) -> Result<(), String> {
    scan.clear().await;
    let _ = app.emit("record-updated", CardRecord::default());
    log::info!("[PIPELINE] Scan state reset");
    Ok(())
}

// ── Persistence collaborator ─────────────────────────────────────────

/// Tauri command: save the assembled record through the records API.
///
/// Routes to create or update on the presence of a server id; the reply
/// (with identity and timestamps) replaces the in-memory record.
#[tauri::command]
pub async fn save_record(
    app: tauri::AppHandle,
    scan: tauri::State<'_, ScanState>,
) -> Result<CardRecord, String> {
    let client = RecordsClient::from_env().map_err(|e| e.to_string())?;

    let record = scan.record.lock().await.clone();
    if record.name.trim().is_empty() && record.name_en.trim().is_empty() {
        return Err("Record needs a name before saving".to_string());
    }

    let front = scan.side(Side::Front).lock().await.image.clone();
    let back = scan.side(Side::Back).lock().await.image.clone();

    let saved = match record.id {
        Some(id) => client
            .update(id, &record, front.as_ref(), back.as_ref())
            .await,
        None => client.create(&record, front.as_ref(), back.as_ref()).await,
    }
    .map_err(|e| e.to_string())?;

    log::info!("[RECORDS] Saved record id={:?}", saved.id);
    *scan.record.lock().await = saved.clone();
    let _ = app.emit("record-updated", saved.clone());
    Ok(saved)
}

/// Tauri command: load a stored record into the editor.
#[tauri::command]
pub async fn load_record(
    app: tauri::AppHandle,
    scan: tauri::State<'_, ScanState>,
    id: i64,
) -> Result<CardRecord, String> {
    let client = RecordsClient::from_env().map_err(|e| e.to_string())?;
    let record = client.get(id).await.map_err(|e| e.to_string())?;
    *scan.record.lock().await = record.clone();
    let _ = app.emit("record-updated", record.clone());
    Ok(record)
}

/// Tauri command: all stored records.
#[tauri::command]
pub async fn list_records() -> Result<Vec<CardRecord>, String> {
    let client = RecordsClient::from_env().map_err(|e| e.to_string())?;
    client.list().await.map_err(|e| e.to_string())
}

/// Tauri command: delete a stored record.
#[tauri::command]
pub async fn delete_record(id: i64) -> Result<(), String> {
    let client = RecordsClient::from_env().map_err(|e| e.to_string())?;
    client.delete(id).await.map_err(|e| e.to_string())
}
