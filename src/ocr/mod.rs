//! OCR domain — remote text extraction + field segmentation.
//!
//! Two halves: `client` talks to the external OCR engine over HTTP, and
//! `parse`/`keymap`/`extract` turn whatever text comes back into canonical
//! record fields. External code should only use what is exported here.

pub mod client;
pub mod extract;
pub mod keymap;
pub mod parse;

pub use client::OcrClient;
pub use parse::{parse_fields, ParseMethod, ParseOutcome};

use thiserror::Error;

/// Failures on the OCR path. Service problems mark a single card side as
/// failed; they never abort the other side or touch the record.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("OCR payload malformed: {0}")]
    MalformedPayload(String),

    #[error("image not decodable: {0}")]
    BadImage(String),
}
