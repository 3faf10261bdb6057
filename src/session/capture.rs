use crate::{
    assets::{
        filter::{CaptureFilter, filter_raster},
        raster::EncodedRaster,
    },
    foundation::error::BoothResult,
    gallery::store::{Gallery, GalleryEntry, now_local},
};

/// Filter a captured still, encode it as JPEG and store it at the front of `gallery`.
///
/// Stands in for the camera shutter: `raw` is any supported raster, not a live frame.
#[tracing::instrument(skip(raw, gallery), fields(bytes = raw.len()))]
pub fn capture_still<G: Gallery + ?Sized>(
    raw: &EncodedRaster,
    filter: CaptureFilter,
    jpeg_quality: u8,
    gallery: &mut G,
) -> BoothResult<GalleryEntry> {
    let jpeg = filter_raster(raw, filter, jpeg_quality)?;
    let entry = GalleryEntry::photo(gallery.next_id(), &jpeg, filter, now_local())?;
    gallery.append(entry.clone())?;
    tracing::info!(id = entry.id, %filter, "photo captured");
    Ok(entry)
}

#[cfg(test)]
#[path = "../../tests/unit/session/capture.rs"]
mod tests;
