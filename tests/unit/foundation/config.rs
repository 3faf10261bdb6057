use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |k| map.get(k).cloned()
}

#[test]
fn defaults_match_booth_behavior() {
    let cfg = BoothConfig::default();
    assert_eq!(cfg.gallery_capacity, 20);
    assert_eq!(cfg.max_selection, 9);
    assert_eq!(cfg.min_photos, 2);
    assert_eq!(cfg.jpeg_quality, 90);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg: BoothConfig = serde_json::from_str(r#"{ "max_selection": 4 }"#).unwrap();
    assert_eq!(cfg.max_selection, 4);
    assert_eq!(cfg.gallery_capacity, 20);
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(serde_json::from_str::<BoothConfig>(r#"{ "max_selction": 4 }"#).is_err());
}

#[test]
fn env_overrides_apply_and_ignore_garbage() {
    let cfg = BoothConfig::default().with_env_overrides(lookup(&[
        ("PHOTOBOOTH_GALLERY", "/tmp/g.json"),
        ("PHOTOBOOTH_JPEG_QUALITY", "75"),
        ("PHOTOBOOTH_DECODE_THREADS", "zero"),
    ]));
    assert_eq!(cfg.gallery_path, PathBuf::from("/tmp/g.json"));
    assert_eq!(cfg.jpeg_quality, 75);
    assert_eq!(cfg.decode_threads, None);
    assert_eq!(cfg.export_dir, PathBuf::from("."));
}

#[test]
fn validate_rejects_out_of_range_values() {
    let cfg = BoothConfig {
        jpeg_quality: 0,
        ..BoothConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(BoothError::Config(_))));

    let cfg = BoothConfig {
        gallery_capacity: 0,
        ..BoothConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = BoothConfig {
        decode_threads: Some(0),
        ..BoothConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("booth.json");
    std::fs::write(&path, r#"{ "gallery_capacity": 5, "jpeg_quality": 80 }"#).unwrap();
    let cfg = BoothConfig::load(&path).unwrap();
    assert_eq!(cfg.gallery_capacity, 5);

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(BoothConfig::load(&path), Err(BoothError::Config(_))));
}
