use std::path::{Path, PathBuf};

use anyhow::Context;
use time::OffsetDateTime;

use crate::{
    assets::{filter::CaptureFilter, raster::EncodedRaster},
    foundation::error::{BoothError, BoothResult},
    layout::engine::Layout,
};

/// Gallery entry identifier: a unix-epoch millisecond stamp, unique and increasing per gallery.
pub type EntryId = u64;

/// Default retention cap.
pub const DEFAULT_CAPACITY: usize = 20;

/// Filter label recorded on collage entries.
pub const COLLAGE_FILTER: &str = "collage";

/// One persisted gallery item.
///
/// The JSON shape (`id`, `src`, `timestamp`, `filter`, `isCollage`, `layout`, `photoCount`) is
/// shared with galleries written by the browser booth, so existing files load unchanged.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    /// Unique id.
    pub id: EntryId,
    /// Encoded image as a `data:` URI.
    pub src: String,
    /// Human-readable capture time.
    pub timestamp: String,
    /// Capture filter name, or `"collage"`.
    pub filter: String,
    /// Set on collage entries.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_collage: bool,
    /// Layout a collage was rendered with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    /// Number of photos selected for a collage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_count: Option<usize>,
}

impl GalleryEntry {
    /// Entry for a captured still.
    pub fn photo(
        id: EntryId,
        raster: &EncodedRaster,
        filter: CaptureFilter,
        at: OffsetDateTime,
    ) -> BoothResult<Self> {
        Ok(Self {
            id,
            src: raster.to_data_uri(),
            timestamp: display_timestamp(at)?,
            filter: filter.name().to_string(),
            is_collage: false,
            layout: None,
            photo_count: None,
        })
    }

    /// Entry for a rendered collage.
    pub fn collage(
        id: EntryId,
        raster: &EncodedRaster,
        layout: Layout,
        photo_count: usize,
        at: OffsetDateTime,
    ) -> BoothResult<Self> {
        Ok(Self {
            id,
            src: raster.to_data_uri(),
            timestamp: display_timestamp(at)?,
            filter: COLLAGE_FILTER.to_string(),
            is_collage: true,
            layout: Some(layout),
            photo_count: Some(photo_count),
        })
    }

    /// Decode `src` back into an encoded raster.
    pub fn raster(&self) -> BoothResult<EncodedRaster> {
        EncodedRaster::from_data_uri(&self.src)
    }

    /// `"collage"` or `"photo"`.
    pub fn kind(&self) -> &'static str {
        if self.is_collage { "collage" } else { "photo" }
    }
}

/// Persisted list of captured stills and collages, most recent first.
///
/// Mutations take `&mut self`; a gallery has one writer at a time.
pub trait Gallery {
    /// All entries, most recent first.
    fn entries(&self) -> &[GalleryEntry];

    /// Prepend `entry` and drop anything past the retention cap.
    fn append(&mut self, entry: GalleryEntry) -> BoothResult<()>;

    /// Remove the entry with `id` and return it.
    fn remove(&mut self, id: EntryId) -> BoothResult<GalleryEntry>;

    /// Look up one entry.
    fn get(&self, id: EntryId) -> Option<&GalleryEntry> {
        self.entries().iter().find(|e| e.id == id)
    }

    /// Number of stored entries.
    fn len(&self) -> usize {
        self.entries().len()
    }

    /// `true` when nothing is stored.
    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Allocate an id for a new entry: the current millisecond clock, bumped past every stored id.
    fn next_id(&self) -> EntryId {
        next_id_after(self.entries(), now_ms())
    }
}

/// Volatile gallery, for tests and one-shot tools.
#[derive(Clone, Debug)]
pub struct MemoryGallery {
    entries: Vec<GalleryEntry>,
    capacity: usize,
}

impl MemoryGallery {
    /// Empty gallery holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Gallery seeded with `entries` (most recent first), truncated to `capacity`.
    pub fn with_entries(mut entries: Vec<GalleryEntry>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        entries.truncate(capacity);
        Self { entries, capacity }
    }
}

impl Default for MemoryGallery {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Gallery for MemoryGallery {
    fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    fn append(&mut self, entry: GalleryEntry) -> BoothResult<()> {
        self.entries = prepended(&self.entries, entry, self.capacity)?;
        Ok(())
    }

    fn remove(&mut self, id: EntryId) -> BoothResult<GalleryEntry> {
        let (rest, removed) = without(&self.entries, id)?;
        self.entries = rest;
        Ok(removed)
    }
}

/// Gallery persisted as a JSON array in one file.
///
/// Every mutation rewrites the whole file through a sibling temp file and a rename, and the
/// in-memory list only changes once the write has landed.
#[derive(Debug)]
pub struct FileGallery {
    path: PathBuf,
    entries: Vec<GalleryEntry>,
    capacity: usize,
}

impl FileGallery {
    /// Open the gallery at `path`; a missing file is an empty gallery.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> BoothResult<Self> {
        let path = path.as_ref().to_path_buf();
        let capacity = capacity.max(1);
        let mut entries: Vec<GalleryEntry> = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                BoothError::gallery(format!("parse gallery '{}': {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read gallery '{}'", path.display()))
                    .into());
            }
        };
        entries.truncate(capacity);
        tracing::debug!(entries = entries.len(), "gallery loaded");
        Ok(Self {
            path,
            entries,
            capacity,
        })
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit(&mut self, entries: Vec<GalleryEntry>) -> BoothResult<()> {
        write_atomically(&self.path, &entries)?;
        self.entries = entries;
        Ok(())
    }
}

impl Gallery for FileGallery {
    fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    fn append(&mut self, entry: GalleryEntry) -> BoothResult<()> {
        let id = entry.id;
        let next = prepended(&self.entries, entry, self.capacity)?;
        self.commit(next)?;
        tracing::info!(id, entries = self.entries.len(), "gallery entry saved");
        Ok(())
    }

    fn remove(&mut self, id: EntryId) -> BoothResult<GalleryEntry> {
        let (rest, removed) = without(&self.entries, id)?;
        self.commit(rest)?;
        tracing::info!(id, "gallery entry removed");
        Ok(removed)
    }
}

fn prepended(
    entries: &[GalleryEntry],
    entry: GalleryEntry,
    capacity: usize,
) -> BoothResult<Vec<GalleryEntry>> {
    if entries.iter().any(|e| e.id == entry.id) {
        return Err(BoothError::gallery(format!(
            "gallery already holds an entry with id {}",
            entry.id
        )));
    }
    let mut next = Vec::with_capacity(entries.len() + 1);
    next.push(entry);
    next.extend(entries.iter().cloned());
    if next.len() > capacity {
        tracing::debug!(dropped = next.len() - capacity, "gallery over capacity");
        next.truncate(capacity);
    }
    Ok(next)
}

fn without(entries: &[GalleryEntry], id: EntryId) -> BoothResult<(Vec<GalleryEntry>, GalleryEntry)> {
    let pos = entries
        .iter()
        .position(|e| e.id == id)
        .ok_or_else(|| BoothError::gallery(format!("no gallery entry with id {id}")))?;
    let mut rest = entries.to_vec();
    let removed = rest.remove(pos);
    Ok((rest, removed))
}

fn write_atomically(path: &Path, entries: &[GalleryEntry]) -> BoothResult<()> {
    let json = serde_json::to_vec(entries).context("serialize gallery")?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    std::fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

fn next_id_after(entries: &[GalleryEntry], now_ms: u64) -> EntryId {
    match entries.iter().map(|e| e.id).max() {
        Some(last) => now_ms.max(last + 1),
        None => now_ms,
    }
}

/// Milliseconds since the unix epoch.
pub fn now_ms() -> u64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos / 1_000_000).unwrap_or(0)
}

/// Local wall-clock time, or UTC when the local offset cannot be determined.
pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `M/D/YYYY, h:mm:ss AM` rendering used for entry timestamps.
pub fn display_timestamp(at: OffsetDateTime) -> BoothResult<String> {
    let fmt = time::macros::format_description!(
        "[month padding:none]/[day padding:none]/[year], [hour repr:12 padding:none]:[minute]:[second] [period]"
    );
    at.format(fmt)
        .map_err(|e| BoothError::Other(anyhow::anyhow!("format timestamp: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/gallery/store.rs"]
mod tests;
