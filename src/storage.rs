//! Capture store — captured stills on disk.
//!
//! Filenames are content-addressed (side prefix + SHA-256 head), so
//! re-capturing an identical frame lands on the same file and nothing ever
//! needs cleanup logic beyond deleting the directory. Store failures are
//! not pipeline failures: scanning continues in-memory with a warning.

use crate::card::Side;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub struct CaptureStore {
    dir: PathBuf,
}

impl CaptureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the per-user app data directory. None when the platform
    /// reports no such directory (headless CI).
    pub fn from_app_data() -> Option<Self> {
        let dir = dirs::data_local_dir()?.join("card-lens").join("captures");
        Some(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the capture and return its path.
    pub fn save(&self, side: Side, bytes: &[u8], mime: &str) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let digest = Sha256::digest(bytes);
        let hash = digest
            .iter()
            .take(6)
            .map(|b| format!("{:02x}", b))
            .collect::<String>();
        let path = self
            .dir
            .join(format!("{}_{}.{}", side, hash, extension_for(mime)));

        if !path.exists() {
            std::fs::write(&path, bytes)?;
        }
        log::info!(
            "[STORAGE] {} capture → {} ({} bytes)",
            side,
            path.display(),
            bytes.len()
        );
        Ok(path)
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}
