//! DEVICE_TYPE override — isolated in its own test binary because it
//! mutates process environment, which would race the other probe tests.

mod camera_helpers;

use camera_helpers::MockMediaDevices;
use card_lens_lib::camera::device::probe;
use card_lens_lib::camera::{CameraManager, CaptureMode, DeviceType, RenderTargets};
use card_lens_lib::card::Side;
use std::sync::Arc;

#[tokio::test]
async fn override_beats_user_agent_classification() {
    std::env::set_var("DEVICE_TYPE", "mobile");

    // Desktop UA and desktop viewport, but the override wins.
    let devices = MockMediaDevices::desktop();
    let profile = probe(&devices).await;
    assert_eq!(profile.device_type, DeviceType::Mobile);
    assert!(profile.has_camera);

    // And the strategy choice follows the overridden profile.
    let mut manager = CameraManager::new(Arc::new(MockMediaDevices::desktop()));
    manager
        .start_camera(Side::Front, &RenderTargets::default())
        .await
        .expect("start");
    assert_eq!(manager.status().mode, Some(CaptureMode::MobileFullscreen));

    std::env::remove_var("DEVICE_TYPE");
}
