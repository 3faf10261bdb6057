use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::{BoothError, BoothResult};

/// Runtime configuration for the booth: storage locations, caps and encoder settings.
///
/// Every field has a default, so a config file only needs the keys it wants to change.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoothConfig {
    /// JSON file backing the persisted gallery.
    pub gallery_path: PathBuf,
    /// Retention cap; the oldest entries beyond it are dropped after each append.
    pub gallery_capacity: usize,
    /// Maximum photos in one collage selection.
    pub max_selection: usize,
    /// Minimum gallery size before a collage session can open.
    pub min_photos: usize,
    /// JPEG quality (1..=100) for captured photos and collages.
    pub jpeg_quality: u8,
    /// Directory that downloads are written into.
    pub export_dir: PathBuf,
    /// Decode worker threads; `None` uses the rayon default.
    pub decode_threads: Option<usize>,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            gallery_path: PathBuf::from("photobooth-gallery.json"),
            gallery_capacity: 20,
            max_selection: 9,
            min_photos: 2,
            jpeg_quality: 90,
            export_dir: PathBuf::from("."),
            decode_threads: None,
        }
    }
}

impl BoothConfig {
    /// Read a JSON config file, then apply `PHOTOBOOTH_*` environment overrides.
    pub fn load(path: &Path) -> BoothResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| BoothError::config(format!("parse '{}': {e}", path.display())))?;
        let cfg = cfg.with_env_overrides(|k| std::env::var(k).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> BoothResult<Self> {
        let cfg = Self::default().with_env_overrides(|k| std::env::var(k).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides resolved through `lookup`.
    ///
    /// Recognized keys: `PHOTOBOOTH_GALLERY`, `PHOTOBOOTH_EXPORT_DIR`, `PHOTOBOOTH_JPEG_QUALITY`,
    /// `PHOTOBOOTH_DECODE_THREADS`. Unparseable numeric values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("PHOTOBOOTH_GALLERY").filter(|v| !v.is_empty()) {
            self.gallery_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("PHOTOBOOTH_EXPORT_DIR").filter(|v| !v.is_empty()) {
            self.export_dir = PathBuf::from(v);
        }
        if let Some(q) = lookup("PHOTOBOOTH_JPEG_QUALITY").and_then(|v| v.parse::<u8>().ok()) {
            self.jpeg_quality = q;
        }
        if let Some(n) = lookup("PHOTOBOOTH_DECODE_THREADS")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            self.decode_threads = Some(n);
        }
        self
    }

    /// Reject values that would make the booth unusable.
    pub fn validate(&self) -> BoothResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(BoothError::config(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.gallery_capacity == 0 {
            return Err(BoothError::config("gallery_capacity must be >= 1"));
        }
        if self.max_selection == 0 {
            return Err(BoothError::config("max_selection must be >= 1"));
        }
        if self.min_photos == 0 {
            return Err(BoothError::config("min_photos must be >= 1"));
        }
        if self.decode_threads == Some(0) {
            return Err(BoothError::config("decode_threads must be >= 1 when set"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
