//! Settings panel Tauri commands.
//!
//! Runtime configuration rides on environment variables, seeded from
//! .env.local / .env at startup:
//! - OCR_URL / OCR_TIMEOUT_SECS / OCR_VERIFY_SSL — the OCR engine
//! - CARDS_API_URL — the records persistence API
//! - DEVICE_TYPE — probe override for the capture strategy choice

use crate::ocr::OcrClient;

/// Tauri command: current scan configuration for the settings panel.
#[tauri::command]
pub fn get_scan_config() -> Result<serde_json::Value, String> {
    let client = OcrClient::from_env();
    Ok(serde_json::json!({
        "ocrUrl": client.url(),
        "ocrTimeoutSecs": std::env::var("OCR_TIMEOUT_SECS").ok(),
        "ocrVerifySsl": std::env::var("OCR_VERIFY_SSL").ok(),
        "cardsApiUrl": std::env::var("CARDS_API_URL").ok(),
        "deviceOverride": std::env::var("DEVICE_TYPE").ok(),
    }))
}

/// Tauri command: point the scanner at a different OCR engine.
#[tauri::command]
pub fn set_ocr_endpoint(url: String) -> Result<(), String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!("Not an HTTP(S) URL: {}", url));
    }
    std::env::set_var("OCR_URL", &url);
    log::info!("[SETTINGS] OCR endpoint set to: {}", url);
    Ok(())
}

/// Tauri command: OCR request timeout in seconds.
#[tauri::command]
pub fn set_ocr_timeout(secs: u64) -> Result<(), String> {
    if secs == 0 {
        return Err("Timeout must be at least 1 second".to_string());
    }
    std::env::set_var("OCR_TIMEOUT_SECS", secs.to_string());
    log::info!("[SETTINGS] OCR timeout set to: {}s", secs);
    Ok(())
}

/// Tauri command: point the app at a records API.
#[tauri::command]
pub fn set_records_endpoint(url: String) -> Result<(), String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!("Not an HTTP(S) URL: {}", url));
    }
    std::env::set_var("CARDS_API_URL", &url);
    log::info!("[SETTINGS] Records endpoint set to: {}", url);
    Ok(())
}

/// Tauri command: force the device classification (or clear the override
/// with an empty string). Takes effect on the next probe — the profile is
/// frozen per session by design.
#[tauri::command]
pub fn set_device_override(device: String) -> Result<(), String> {
    let device = device.to_lowercase();
    match device.as_str() {
        "" => {
            std::env::remove_var("DEVICE_TYPE");
            log::info!("[SETTINGS] Device override cleared");
        }
        "desktop" | "mobile" | "tablet" => {
            std::env::set_var("DEVICE_TYPE", &device);
            log::info!("[SETTINGS] Device override set to: {}", device);
        }
        other => {
            return Err(format!(
                "Invalid device type: {}. Use desktop, mobile or tablet.",
                other
            ))
        }
    }
    Ok(())
}

/// Tauri command: probe the configured OCR engine with a tiny test image.
#[tauri::command]
pub async fn test_ocr_endpoint() -> Result<bool, String> {
    Ok(OcrClient::from_env().test_endpoint().await)
}
