//! Card domain — public API.
//!
//! Owns the bilingual record schema, script classification, the merge
//! policy, and the shared scan state (one record + two independent side
//! lifecycles). External code should only use what is exported here.

pub mod classify;
pub mod merge;
pub mod schema;

pub use classify::{classify_fields, classify_fields_with, contains_cjk, ScriptPredicate};
pub use merge::{merge_fields, MergeOutcome};
pub use schema::{CardRecord, ParsedFields, Side};

use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Lifecycle of one side's parse, independent of the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    #[default]
    None,
    Parsing,
    Success,
    Error,
}

/// A captured or uploaded image held for one card side.
#[derive(Debug, Clone)]
pub struct StoredCapture {
    pub bytes: Vec<u8>,
    pub mime: String,
    /// On-disk copy, when the capture store accepted it.
    pub path: Option<PathBuf>,
}

/// Per-side scan lifecycle: the image, the raw OCR text fetched for it,
/// and the parse status. Reset whenever a new image arrives for the side.
#[derive(Debug, Default)]
pub struct SideParseState {
    pub image: Option<StoredCapture>,
    pub ocr_text: Option<String>,
    pub parse_status: ParseStatus,
}

impl SideParseState {
    /// Replace the side's image and restart its lifecycle.
    pub fn reset_with_image(&mut self, capture: StoredCapture) {
        self.image = Some(capture);
        self.ocr_text = None;
        self.parse_status = ParseStatus::None;
    }
}

/// Serializable view of a side for the frontend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideSnapshot {
    pub side: Side,
    pub has_image: bool,
    pub image_path: Option<String>,
    pub ocr_text: Option<String>,
    pub parse_status: ParseStatus,
}

/// Shared scan state: the single in-memory record plus both side lifecycles.
///
/// Front and back pipelines run concurrently; every merge goes through
/// `record`'s mutex, which is the single-writer discipline that prevents a
/// lost update when both sides finish near-simultaneously.
pub struct ScanState {
    pub record: Mutex<CardRecord>,
    front: Mutex<SideParseState>,
    back: Mutex<SideParseState>,
}

impl ScanState {
    pub fn new() -> Self {
        Self {
            record: Mutex::new(CardRecord::default()),
            front: Mutex::new(SideParseState::default()),
            back: Mutex::new(SideParseState::default()),
        }
    }

    pub fn side(&self, side: Side) -> &Mutex<SideParseState> {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }

    pub async fn snapshot(&self, side: Side) -> SideSnapshot {
        let guard = self.side(side).lock().await;
        SideSnapshot {
            side,
            has_image: guard.image.is_some(),
            image_path: guard
                .image
                .as_ref()
                .and_then(|i| i.path.as_ref())
                .map(|p| p.display().to_string()),
            ocr_text: guard.ocr_text.clone(),
            parse_status: guard.parse_status,
        }
    }

    /// Drop the record and both sides — used after a successful save.
    pub async fn clear(&self) {
        *self.record.lock().await = CardRecord::default();
        *self.front.lock().await = SideParseState::default();
        *self.back.lock().await = SideParseState::default();
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}
