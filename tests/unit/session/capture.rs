use super::*;
use crate::{assets::raster::encode_png, foundation::error::BoothError, gallery::store::MemoryGallery};

#[test]
fn capture_stores_filtered_jpeg_first() {
    let raw = encode_png(&image::RgbaImage::from_pixel(
        6,
        4,
        image::Rgba([200, 40, 40, 255]),
    ))
    .unwrap();
    let mut g = MemoryGallery::default();

    let first = capture_still(&raw, CaptureFilter::None, 90, &mut g).unwrap();
    let second = capture_still(&raw, CaptureFilter::Grayscale, 90, &mut g).unwrap();
    assert!(second.id > first.id);
    assert_eq!(g.entries()[0].filter, "grayscale");

    let stored = g.entries()[0].raster().unwrap();
    assert_eq!(stored.format(), Some(image::ImageFormat::Jpeg));
    let px = image::load_from_memory(stored.as_bytes())
        .unwrap()
        .to_rgb8()
        .get_pixel(3, 2)
        .0;
    let spread = px.iter().max().unwrap() - px.iter().min().unwrap();
    assert!(spread <= 4, "grayscale pixel {px:?}");
}

#[test]
fn capture_rejects_garbage() {
    let mut g = MemoryGallery::default();
    let raw = EncodedRaster::from_bytes(b"not an image".to_vec());
    assert!(matches!(
        capture_still(&raw, CaptureFilter::Sepia, 90, &mut g),
        Err(BoothError::Decode(_))
    ));
    assert!(g.is_empty());
}
