//! Card Lens — Tauri application entry point.
//!
//! This is the app shell that wires together all domains and commands.
//! No business logic lives here — only module declarations, plugin
//! registration, state management, and the command registry.
//!
//! Commands are split across:
//!   - commands.rs           — simple one-step commands (state reads, field edits, records CRUD)
//!   - pipeline.rs           — multi-step orchestration (camera session, scan, re-parse)
//!   - settings_commands.rs  — endpoint and device-override configuration

pub mod camera;
pub mod card;
mod commands;
pub mod ocr;
mod pipeline;
pub mod records;
pub mod settings_commands;
pub mod storage;

use camera::{CameraManager, CameraState, PendingBridge, WebviewMediaDevices};
use card::ScanState;
use std::sync::Arc;
use tauri::Manager;

/// Entry point — called by Tauri runtime.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Load .env.local → .env from the project root.
    // Uses CARGO_MANIFEST_DIR (compile-time path) to reliably find the
    // project root regardless of the binary's working directory.
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));

    'env_load: for env_file in [".env.local", ".env"] {
        let path = manifest_dir.join(env_file);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    env_logger::init();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(PendingBridge::new())
        .manage(ScanState::new())
        .invoke_handler(tauri::generate_handler![
            // Simple commands (commands.rs)
            commands::camera_bridge_response,
            commands::get_device_profile,
            commands::get_camera_status,
            commands::get_record,
            commands::get_side_state,
            commands::set_record_field,
            commands::reset_scan,
            commands::save_record,
            commands::load_record,
            commands::list_records,
            commands::delete_record,
            // Pipeline commands (pipeline.rs)
            pipeline::start_camera,
            pipeline::stop_camera,
            pipeline::capture_photo,
            pipeline::upload_side_image,
            pipeline::scan_side,
            pipeline::reparse_side,
            // Settings commands (settings_commands.rs)
            settings_commands::get_scan_config,
            settings_commands::set_ocr_endpoint,
            settings_commands::set_ocr_timeout,
            settings_commands::set_records_endpoint,
            settings_commands::set_device_override,
            settings_commands::test_ocr_endpoint,
        ])
        .setup(|app| {
            log::info!("Card Lens starting up");

            // The camera manager needs an app handle for the webview media
            // bridge, so it is managed here rather than before setup.
            let devices = Arc::new(WebviewMediaDevices::new(app.handle().clone()));
            app.manage(CameraState::new(CameraManager::new(devices)));

            log::info!("Main window ready — waiting for the first scan");
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("Error running Card Lens");
}
