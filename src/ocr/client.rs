//! Remote OCR engine client.
//!
//! The engine is an external HTTP collaborator: POST a JPEG, get back raw
//! text (`{ success, text }`). Captures are re-encoded to baseline RGB JPEG
//! first — the engine rejects PNGs with alpha and exotic webcam formats.

use super::OcrError;
use serde::Deserialize;
use std::time::Duration;

/// Default engine endpoint; override with `OCR_URL`.
const DEFAULT_OCR_URL: &str = "https://local_llm.star-bit.io/api/card";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct EngineResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, alias = "result")]
    text: String,
}

pub struct OcrClient {
    url: String,
    client: reqwest::Client,
}

impl OcrClient {
    pub fn new(url: impl Into<String>, timeout_secs: u64, verify_ssl: bool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            // The default engine sits behind a self-signed cert on LAN
            // deployments; verification is opt-in via OCR_VERIFY_SSL.
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .unwrap_or_default();
        Self { url: url.into(), client }
    }

    /// Build a client from `OCR_URL` / `OCR_TIMEOUT_SECS` / `OCR_VERIFY_SSL`.
    pub fn from_env() -> Self {
        let url = std::env::var("OCR_URL").unwrap_or_else(|_| DEFAULT_OCR_URL.to_string());
        let timeout = std::env::var("OCR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let verify_ssl = std::env::var("OCR_VERIFY_SSL")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self::new(url, timeout, verify_ssl)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Extract raw text from an image via the remote engine.
    pub async fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let jpeg = reencode_jpeg(image_bytes)?;
        let start = std::time::Instant::now();

        let part = reqwest::multipart::Part::bytes(jpeg)
            .file_name("card.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| OcrError::ServiceUnavailable(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| OcrError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[OCR] Engine returned {}: {}", status, body);
            return Err(OcrError::ServiceUnavailable(format!(
                "engine returned {}",
                status
            )));
        }

        let parsed: EngineResponse = response
            .json()
            .await
            .map_err(|e| OcrError::MalformedPayload(e.to_string()))?;

        if !parsed.success && parsed.text.is_empty() {
            return Err(OcrError::ServiceUnavailable(
                "engine reported failure".to_string(),
            ));
        }

        log::info!(
            "[OCR] Extracted {} chars in {}ms",
            parsed.text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(parsed.text)
    }

    /// Connectivity probe for the settings panel: send a tiny blank card
    /// and check the engine answers at all.
    pub async fn test_endpoint(&self) -> bool {
        let blank = image::RgbImage::from_pixel(16, 16, image::Rgb([255, 255, 255]));
        let mut jpeg = Vec::new();
        if image::DynamicImage::ImageRgb8(blank)
            .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .is_err()
        {
            return false;
        }
        let ok = self.recognize(&jpeg).await.is_ok();
        log::info!("[OCR] Endpoint test {} — ok: {}", self.url, ok);
        ok
    }
}

/// Decode whatever the capture produced and re-encode as RGB JPEG.
fn reencode_jpeg(image_bytes: &[u8]) -> Result<Vec<u8>, OcrError> {
    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| OcrError::BadImage(e.to_string()))?;
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
    let mut jpeg = Vec::new();
    rgb.write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
        .map_err(|e| OcrError::BadImage(e.to_string()))?;
    Ok(jpeg)
}
