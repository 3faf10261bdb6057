use super::*;
use crate::layout::engine::Layout;

fn at() -> OffsetDateTime {
    time::macros::datetime!(2026-03-07 09:05:03 +02:00)
}

fn raster() -> EncodedRaster {
    EncodedRaster::from_bytes(vec![0xff, 0xd8, 0xff, 0xe0, 0, 1])
}

#[test]
fn file_stamp_is_utc_iso_without_colons() {
    assert_eq!(file_stamp(at()).unwrap(), "2026-03-07T07-05-03");
}

#[test]
fn collage_and_capture_filenames() {
    assert_eq!(
        collage_filename(at()).unwrap(),
        "photo-collage-2026-03-07T07-05-03.jpg"
    );
    assert_eq!(
        capture_filename(at(), CaptureFilter::None).unwrap(),
        "photo-booth_2026-03-07T07-05-03.jpg"
    );
    assert_eq!(
        capture_filename(at(), CaptureFilter::Cyberpunk).unwrap(),
        "photo-booth_2026-03-07T07-05-03_cyberpunk.jpg"
    );
}

#[test]
fn gallery_item_filename_uses_kind_and_filter() {
    // 2024-03-09T16:00:00Z
    let id = 1_710_000_000_000;
    let photo = GalleryEntry::photo(id, &raster(), CaptureFilter::Vintage, at()).unwrap();
    assert_eq!(
        gallery_item_filename(&photo).unwrap(),
        "photo-booth_2024-03-09T16-00-00_vintage.jpg"
    );

    let plain = GalleryEntry::photo(id, &raster(), CaptureFilter::None, at()).unwrap();
    assert_eq!(
        gallery_item_filename(&plain).unwrap(),
        "photo-booth_2024-03-09T16-00-00.jpg"
    );

    let collage = GalleryEntry::collage(id, &raster(), Layout::Grid2x2, 4, at()).unwrap();
    assert_eq!(
        gallery_item_filename(&collage).unwrap(),
        "collage-booth_2024-03-09T16-00-00_collage.jpg"
    );
}

#[test]
fn memory_exporter_records_in_order() {
    let mut ex = MemoryExporter::new();
    ex.export(&raster(), "a.jpg").unwrap();
    ex.export(&raster(), "b.jpg").unwrap();
    let names: Vec<_> = ex.files().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["a.jpg", "b.jpg"]);
}

#[test]
fn path_like_filenames_are_rejected() {
    let mut ex = MemoryExporter::new();
    assert!(ex.export(&raster(), "../x.jpg").is_err());
    assert!(ex.export(&raster(), "").is_err());
    assert!(ex.files().is_empty());
}

#[test]
fn dir_exporter_writes_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let mut ex = DirExporter::new(dir.path().join("out"));
    ex.export(&raster(), "c.jpg").unwrap();
    let bytes = std::fs::read(dir.path().join("out").join("c.jpg")).unwrap();
    assert_eq!(bytes, raster().as_bytes());
}
