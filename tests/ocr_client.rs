//! OCR client behavior: offline failure mapping, plus a live round trip
//! against a configured engine (self-skipping, like the other integration
//! tests that need external services).

use card_lens_lib::ocr::{OcrClient, OcrError};

fn tiny_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(32, 32, image::Rgb([240, 240, 240]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .expect("encode");
    bytes
}

#[tokio::test]
async fn garbage_bytes_fail_before_any_network_io() {
    // Port 9 (discard) on localhost — must never be reached.
    let client = OcrClient::new("http://127.0.0.1:9/api/card", 1, true);
    let err = client.recognize(b"not an image").await.expect_err("bad image");
    assert!(matches!(err, OcrError::BadImage(_)), "got: {:?}", err);
}

#[tokio::test]
async fn unreachable_engine_maps_to_service_unavailable() {
    let client = OcrClient::new("http://127.0.0.1:9/api/card", 1, true);
    let err = client
        .recognize(&tiny_jpeg())
        .await
        .expect_err("nothing listens there");
    assert!(
        matches!(err, OcrError::ServiceUnavailable(_)),
        "got: {:?}",
        err
    );
}

#[tokio::test]
async fn live_engine_round_trip() {
    // Only runs when an engine is explicitly configured.
    let url = match std::env::var("OCR_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => {
            eprintln!("SKIP: No OCR_URL configured");
            return;
        }
    };

    let client = OcrClient::new(&url, 30, false);
    eprintln!("[TEST] Sending test card to {} ...", url);
    let start = std::time::Instant::now();

    match client.recognize(&tiny_jpeg()).await {
        Ok(text) => {
            eprintln!(
                "[TEST] Engine answered in {}ms — {} chars",
                start.elapsed().as_millis(),
                text.chars().count()
            );
        }
        Err(e) => panic!("Engine at {} failed: {}", url, e),
    }
}
