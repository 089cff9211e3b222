//! Records domain — client for the external persistence API.
//!
//! The record CRUD service is a collaborator, not part of this app: this
//! client is a straight sink/source for CardRecord over the multipart form
//! API (`POST/PUT {base}/` with one form field per content slot, plus the
//! side images and raw OCR text). No schema logic lives here.

use crate::card::{CardRecord, StoredCapture};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("records API not configured — set CARDS_API_URL")]
    NotConfigured,

    #[error("records API unavailable: {0}")]
    Unavailable(String),

    #[error("records API returned {0}")]
    Status(u16),
}

pub struct RecordsClient {
    base: String,
    client: reqwest::Client,
}

impl RecordsClient {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            base,
            client: reqwest::Client::new(),
        }
    }

    /// Build from `CARDS_API_URL`. Errors (rather than defaulting) when the
    /// collaborator is not configured — there is no sensible default host.
    pub fn from_env() -> Result<Self, RecordsError> {
        match std::env::var("CARDS_API_URL") {
            Ok(base) if !base.trim().is_empty() => Ok(Self::new(base)),
            _ => Err(RecordsError::NotConfigured),
        }
    }

    pub async fn list(&self) -> Result<Vec<CardRecord>, RecordsError> {
        let response = self
            .client
            .get(format!("{}/", self.base))
            .send()
            .await
            .map_err(|e| RecordsError::Unavailable(e.to_string()))?;
        Self::json_of(response).await
    }

    pub async fn get(&self, id: i64) -> Result<CardRecord, RecordsError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base, id))
            .send()
            .await
            .map_err(|e| RecordsError::Unavailable(e.to_string()))?;
        Self::json_of(response).await
    }

    /// Create a record; the reply carries the server-assigned identity and
    /// timestamps.
    pub async fn create(
        &self,
        record: &CardRecord,
        front: Option<&StoredCapture>,
        back: Option<&StoredCapture>,
    ) -> Result<CardRecord, RecordsError> {
        let form = Self::record_form(record, front, back)?;
        let response = self
            .client
            .post(format!("{}/", self.base))
            .multipart(form)
            .send()
            .await
            .map_err(|e| RecordsError::Unavailable(e.to_string()))?;
        Self::json_of(response).await
    }

    pub async fn update(
        &self,
        id: i64,
        record: &CardRecord,
        front: Option<&StoredCapture>,
        back: Option<&StoredCapture>,
    ) -> Result<CardRecord, RecordsError> {
        let form = Self::record_form(record, front, back)?;
        let response = self
            .client
            .put(format!("{}/{}", self.base, id))
            .multipart(form)
            .send()
            .await
            .map_err(|e| RecordsError::Unavailable(e.to_string()))?;
        Self::json_of(response).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), RecordsError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.base, id))
            .send()
            .await
            .map_err(|e| RecordsError::Unavailable(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(RecordsError::Status(response.status().as_u16()))
        }
    }

    fn record_form(
        record: &CardRecord,
        front: Option<&StoredCapture>,
        back: Option<&StoredCapture>,
    ) -> Result<reqwest::multipart::Form, RecordsError> {
        let mut form = reqwest::multipart::Form::new();

        for key in CardRecord::content_keys() {
            if let Some(value) = record.get(key) {
                if !value.trim().is_empty() {
                    form = form.text(key, value.to_string());
                }
            }
        }
        if let Some(text) = &record.front_ocr_text {
            form = form.text("front_ocr_text", text.clone());
        }
        if let Some(text) = &record.back_ocr_text {
            form = form.text("back_ocr_text", text.clone());
        }

        for (field, capture) in [("front_image", front), ("back_image", back)] {
            if let Some(capture) = capture {
                let part = reqwest::multipart::Part::bytes(capture.bytes.clone())
                    .file_name(format!("{}.jpg", field))
                    .mime_str(&capture.mime)
                    .map_err(|e| RecordsError::Unavailable(e.to_string()))?;
                form = form.part(field, part);
            }
        }

        Ok(form)
    }

    async fn json_of<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RecordsError> {
        let status = response.status();
        if !status.is_success() {
            return Err(RecordsError::Status(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|e| RecordsError::Unavailable(format!("bad response body: {}", e)))
    }
}
