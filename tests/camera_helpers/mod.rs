//! Shared test backend: a scripted MediaDevices implementation.
//!
//! Lets the capture state machine run end-to-end with no webview and no
//! hardware. Failure modes are switches; every open/close is recorded so
//! tests can assert on stream accounting.

// Shared across test binaries; not every binary uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use card_lens_lib::camera::device::{
    CameraDescriptor, EnvironmentReport, FrameData, MediaDevices, RenderSurface,
    StreamConstraints, StreamHandle,
};
use card_lens_lib::camera::{CameraError, FacingMode};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

const DESKTOP_UA: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15";
const PHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";

pub struct MockMediaDevices {
    pub user_agent: String,
    pub viewport_width: u32,
    pub cameras: Vec<CameraDescriptor>,
    pub fail_enumerate: bool,
    /// Flippable mid-test: the user answering a permission prompt.
    deny_permission: AtomicBool,
    /// Opening a stream with this facing preference fails (device missing).
    pub fail_facing: Option<FacingMode>,
    next_stream: AtomicU64,
    open_streams: Mutex<HashSet<u64>>,
    open_requests: Mutex<Vec<FacingMode>>,
}

impl MockMediaDevices {
    pub fn desktop() -> Self {
        Self::new(
            DESKTOP_UA,
            1440,
            vec![camera("cam0", "FaceTime HD Camera", FacingMode::Front)],
        )
    }

    pub fn phone() -> Self {
        Self::new(
            PHONE_UA,
            390,
            vec![
                camera("cam0", "Front Camera", FacingMode::Front),
                camera("cam1", "Back Camera", FacingMode::Back),
            ],
        )
    }

    pub fn new(user_agent: &str, viewport_width: u32, cameras: Vec<CameraDescriptor>) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            viewport_width,
            cameras,
            fail_enumerate: false,
            deny_permission: AtomicBool::new(false),
            fail_facing: None,
            next_stream: AtomicU64::new(1),
            open_streams: Mutex::new(HashSet::new()),
            open_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_deny_permission(&self, deny: bool) {
        self.deny_permission.store(deny, Ordering::SeqCst);
    }

    /// Streams currently open — the leak detector.
    pub fn active_streams(&self) -> usize {
        self.open_streams.lock().unwrap().len()
    }

    /// Facing preference of every open_stream call, in order.
    pub fn open_requests(&self) -> Vec<FacingMode> {
        self.open_requests.lock().unwrap().clone()
    }
}

pub fn camera(id: &str, label: &str, facing: FacingMode) -> CameraDescriptor {
    CameraDescriptor {
        id: id.to_string(),
        label: label.to_string(),
        facing,
    }
}

#[async_trait]
impl MediaDevices for MockMediaDevices {
    async fn environment(&self) -> Result<EnvironmentReport, CameraError> {
        Ok(EnvironmentReport {
            user_agent: self.user_agent.clone(),
            viewport_width: self.viewport_width,
        })
    }

    async fn enumerate_devices(&self) -> Result<Vec<CameraDescriptor>, CameraError> {
        if self.fail_enumerate {
            return Err(CameraError::StreamAcquisitionFailed(
                "enumeration unsupported".to_string(),
            ));
        }
        Ok(self.cameras.clone())
    }

    async fn open_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<StreamHandle, CameraError> {
        self.open_requests.lock().unwrap().push(constraints.facing);
        if self.deny_permission.load(Ordering::SeqCst) {
            return Err(CameraError::PermissionDenied);
        }
        if self.fail_facing == Some(constraints.facing) {
            return Err(CameraError::NoCameraFound);
        }
        let id = self.next_stream.fetch_add(1, Ordering::SeqCst);
        self.open_streams.lock().unwrap().insert(id);
        Ok(StreamHandle(id))
    }

    async fn bind_preview(
        &self,
        stream: &StreamHandle,
        _surface: &RenderSurface,
    ) -> Result<(), CameraError> {
        if self.open_streams.lock().unwrap().contains(&stream.0) {
            Ok(())
        } else {
            Err(CameraError::NotActive)
        }
    }

    async fn grab_frame(&self, stream: &StreamHandle) -> Result<FrameData, CameraError> {
        if !self.open_streams.lock().unwrap().contains(&stream.0) {
            return Err(CameraError::NotActive);
        }
        Ok(FrameData {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10],
            mime: "image/jpeg".to_string(),
        })
    }

    async fn close_stream(&self, stream: StreamHandle) {
        self.open_streams.lock().unwrap().remove(&stream.0);
    }
}
