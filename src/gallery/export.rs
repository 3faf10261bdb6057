use std::path::{Path, PathBuf};

use anyhow::Context;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    assets::{filter::CaptureFilter, raster::EncodedRaster},
    foundation::error::{BoothError, BoothResult},
    gallery::store::GalleryEntry,
};

/// Destination for finished images (the download surface).
pub trait Exporter {
    /// Store `raster` under `filename`.
    fn export(&mut self, raster: &EncodedRaster, filename: &str) -> BoothResult<()>;
}

/// Writes exports as files in one directory.
#[derive(Clone, Debug)]
pub struct DirExporter {
    dir: PathBuf,
}

impl DirExporter {
    /// Export into `dir`, creating it on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Exporter for DirExporter {
    fn export(&mut self, raster: &EncodedRaster, filename: &str) -> BoothResult<()> {
        check_filename(filename)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create export dir {}", self.dir.display()))?;
        let path = self.dir.join(filename);
        std::fs::write(&path, raster.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = raster.len(), "exported");
        Ok(())
    }
}

/// Keeps exports in memory, in export order.
#[derive(Clone, Debug, Default)]
pub struct MemoryExporter {
    files: Vec<(String, EncodedRaster)>,
}

impl MemoryExporter {
    /// Empty exporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(filename, raster)` pair exported so far.
    pub fn files(&self) -> &[(String, EncodedRaster)] {
        &self.files
    }
}

impl Exporter for MemoryExporter {
    fn export(&mut self, raster: &EncodedRaster, filename: &str) -> BoothResult<()> {
        check_filename(filename)?;
        self.files.push((filename.to_string(), raster.clone()));
        Ok(())
    }
}

fn check_filename(filename: &str) -> BoothResult<()> {
    if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
        return Err(BoothError::Other(anyhow::anyhow!(
            "export filename must be a bare file name, got '{filename}'"
        )));
    }
    Ok(())
}

/// `YYYY-MM-DDTHH-MM-SS` in UTC: an ISO-8601 stamp truncated to seconds with `:` swapped for `-`.
pub fn file_stamp(at: OffsetDateTime) -> BoothResult<String> {
    at.to_offset(UtcOffset::UTC)
        .format(time::macros::format_description!(
            "[year]-[month]-[day]T[hour]-[minute]-[second]"
        ))
        .map_err(|e| BoothError::Other(anyhow::anyhow!("format file stamp: {e}")))
}

/// `photo-collage-<stamp>.jpg`
pub fn collage_filename(at: OffsetDateTime) -> BoothResult<String> {
    Ok(format!("photo-collage-{}.jpg", file_stamp(at)?))
}

/// `photo-booth_<stamp>[_<filter>].jpg` for a freshly captured still.
pub fn capture_filename(at: OffsetDateTime, filter: CaptureFilter) -> BoothResult<String> {
    Ok(format!(
        "photo-booth_{}{}.jpg",
        file_stamp(at)?,
        filter_suffix(filter.name())
    ))
}

/// `<photo|collage>-booth_<stamp>[_<filter>].jpg` for a stored gallery entry.
///
/// The stamp comes from the entry id, which is its creation time in epoch milliseconds.
pub fn gallery_item_filename(entry: &GalleryEntry) -> BoothResult<String> {
    let nanos = i128::from(entry.id) * 1_000_000;
    let at = OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|e| {
        BoothError::gallery(format!("entry id {} is not a valid timestamp: {e}", entry.id))
    })?;
    Ok(format!(
        "{}-booth_{}{}.jpg",
        entry.kind(),
        file_stamp(at)?,
        filter_suffix(&entry.filter)
    ))
}

fn filter_suffix(filter: &str) -> String {
    if filter.is_empty() || filter == CaptureFilter::None.name() {
        String::new()
    } else {
        format!("_{filter}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gallery/export.rs"]
mod tests;
