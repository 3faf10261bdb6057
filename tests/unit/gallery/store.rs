use super::*;

fn at() -> OffsetDateTime {
    time::macros::datetime!(2026-03-07 14:05:09 UTC)
}

fn raster() -> EncodedRaster {
    EncodedRaster::from_bytes(vec![0xff, 0xd8, 0xff, 0xe0, 1, 2, 3])
}

fn photo(id: EntryId) -> GalleryEntry {
    GalleryEntry::photo(id, &raster(), CaptureFilter::Sepia, at()).unwrap()
}

#[test]
fn display_timestamp_matches_locale_string_shape() {
    assert_eq!(display_timestamp(at()).unwrap(), "3/7/2026, 2:05:09 PM");
    let morning = time::macros::datetime!(2026-11-21 00:00:01 UTC);
    assert_eq!(display_timestamp(morning).unwrap(), "11/21/2026, 12:00:01 AM");
}

#[test]
fn photo_entry_json_omits_collage_fields() {
    let json = serde_json::to_value(photo(7)).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["filter"], "sepia");
    assert!(json["src"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
    assert!(json.get("isCollage").is_none());
    assert!(json.get("photoCount").is_none());
}

#[test]
fn collage_entry_uses_browser_field_names() {
    let e = GalleryEntry::collage(9, &raster(), Layout::Strip, 3, at()).unwrap();
    let json = serde_json::to_value(&e).unwrap();
    assert_eq!(json["isCollage"], true);
    assert_eq!(json["layout"], "strip");
    assert_eq!(json["photoCount"], 3);
    assert_eq!(json["filter"], "collage");
    assert_eq!(e.kind(), "collage");

    let back: GalleryEntry = serde_json::from_value(json).unwrap();
    assert_eq!(back, e);
    assert_eq!(back.raster().unwrap(), raster());
}

#[test]
fn loads_entries_written_by_the_browser_booth() {
    let json = r#"[
        {"id":1710000000001,"src":"data:image/jpeg;base64,/9j/","timestamp":"3/9/2024, 4:00:00 PM","filter":"collage","isCollage":true,"layout":"polaroid","photoCount":5},
        {"id":1710000000000,"src":"data:image/jpeg;base64,/9j/","timestamp":"3/9/2024, 3:59:00 PM","filter":"none"}
    ]"#;
    let entries: Vec<GalleryEntry> = serde_json::from_str(json).unwrap();
    assert_eq!(entries[0].layout, Some(Layout::Polaroid));
    assert_eq!(entries[0].photo_count, Some(5));
    assert!(!entries[1].is_collage);
    assert_eq!(entries[1].kind(), "photo");
}

#[test]
fn append_prepends_and_caps_at_capacity() {
    let mut g = MemoryGallery::default();
    for id in 1..=25 {
        g.append(photo(id)).unwrap();
    }
    assert_eq!(g.len(), DEFAULT_CAPACITY);
    assert_eq!(g.entries()[0].id, 25);
    assert_eq!(g.entries()[19].id, 6);
    assert!(g.get(5).is_none());
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut g = MemoryGallery::new(5);
    g.append(photo(1)).unwrap();
    assert!(matches!(g.append(photo(1)), Err(BoothError::Gallery(_))));
    assert_eq!(g.len(), 1);
}

#[test]
fn remove_returns_entry_and_unknown_id_errors() {
    let mut g = MemoryGallery::with_entries(vec![photo(3), photo(2), photo(1)], 20);
    assert_eq!(g.remove(2).unwrap().id, 2);
    let ids: Vec<_> = g.entries().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![3, 1]);
    assert!(matches!(g.remove(2), Err(BoothError::Gallery(_))));
}

#[test]
fn next_id_is_strictly_increasing() {
    let entries = vec![photo(u64::MAX / 2)];
    assert_eq!(next_id_after(&entries, 5), u64::MAX / 2 + 1);
    assert_eq!(next_id_after(&[], 5), 5);
    assert_eq!(next_id_after(&[photo(3)], 10), 10);

    let mut g = MemoryGallery::default();
    let mut last = 0;
    for _ in 0..5 {
        let id = g.next_id();
        assert!(id > last);
        g.append(photo(id)).unwrap();
        last = id;
    }
}

#[test]
fn file_gallery_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("gallery.json");

    let mut g = FileGallery::open(&path, 3).unwrap();
    assert!(g.is_empty());
    for id in 1..=4 {
        g.append(photo(id)).unwrap();
    }
    g.remove(3).unwrap();

    let reopened = FileGallery::open(&path, 3).unwrap();
    let ids: Vec<_> = reopened.entries().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![4, 2]);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn file_gallery_rejects_corrupt_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gallery.json");
    std::fs::write(&path, b"{not json").unwrap();
    assert!(matches!(
        FileGallery::open(&path, 20),
        Err(BoothError::Gallery(_))
    ));
}
