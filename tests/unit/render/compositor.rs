use super::*;
use crate::layout::engine::{Layout, compute_rects_on};

fn solid(width: u32, height: u32, c: Rgba8) -> DecodedImage {
    let px = c.to_premul();
    DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(px.repeat(width as usize * height as usize)),
    }
}

fn date() -> time::Date {
    time::macros::date!(2026 - 03 - 07)
}

fn assert_close(got: Rgba8, want: Rgba8) {
    let d = |a: u8, b: u8| (i32::from(a) - i32::from(b)).abs();
    assert!(
        d(got.r, want.r) <= 2 && d(got.g, want.g) <= 2 && d(got.b, want.b) <= 2,
        "got {got:?}, want {want:?}"
    );
}

#[test]
fn photos_fill_their_rects_and_padding_stays_background() {
    let plan = compute_rects_on(Layout::Grid2x2, 2, date()).unwrap();
    let red = Rgba8::opaque(255, 0, 0);
    let blue = Rgba8::opaque(0, 0, 255);
    let images = vec![solid(4, 4, red), solid(10, 3, blue)];

    let surface = Compositor::default().render(&plan, &images).unwrap();
    assert_eq!(surface.canvas(), Canvas::new(800, 800));
    assert_close(surface.pixel(200, 200).unwrap(), red);
    assert_close(surface.pixel(600, 200).unwrap(), blue);
    // Unfilled cells and padding keep the white background.
    assert_close(surface.pixel(200, 600).unwrap(), Rgba8::WHITE);
    assert_close(surface.pixel(5, 5).unwrap(), Rgba8::WHITE);
    assert_close(surface.pixel(400, 200).unwrap(), Rgba8::WHITE);
}

#[test]
fn fewer_images_than_placements_is_an_error() {
    let plan = compute_rects_on(Layout::Strip, 3, date()).unwrap();
    let images = vec![solid(2, 2, Rgba8::WHITE)];
    assert!(Compositor::default().render(&plan, &images).is_err());
}

#[test]
fn extra_images_are_ignored() {
    let plan = compute_rects_on(Layout::Grid2x2, 5, date()).unwrap();
    let colors = [
        Rgba8::opaque(255, 0, 0),
        Rgba8::opaque(0, 255, 0),
        Rgba8::opaque(0, 0, 255),
        Rgba8::opaque(255, 255, 0),
        Rgba8::opaque(0, 0, 0),
    ];
    let images: Vec<_> = colors.iter().map(|c| solid(2, 2, *c)).collect();
    let surface = Compositor::default().render(&plan, &images).unwrap();
    assert_close(surface.pixel(600, 600).unwrap(), colors[3]);
}

#[test]
fn polaroid_draws_card_border_and_photo() {
    let plan = compute_rects_on(Layout::Polaroid, 1, date()).unwrap();
    let green = Rgba8::opaque(0, 200, 0);
    let surface = Compositor::default()
        .render(&plan, &[solid(8, 8, green)])
        .unwrap();

    // Card at (20,20)-(200,240), photo at (30,30)-(190,190).
    assert_close(surface.pixel(110, 110).unwrap(), green);
    assert_close(surface.pixel(20, 120).unwrap(), Rgba8::opaque(0xdd, 0xdd, 0xdd));
    assert_close(surface.pixel(199, 120).unwrap(), Rgba8::opaque(0xdd, 0xdd, 0xdd));
    assert_close(surface.pixel(25, 200).unwrap(), Rgba8::WHITE);
    assert_close(surface.pixel(500, 500).unwrap(), Rgba8::WHITE);
}

#[test]
fn custom_background_is_used() {
    let plan = compute_rects_on(Layout::Grid3x3, 1, date()).unwrap();
    let settings = CompositorSettings {
        background: Rgba8::opaque(10, 20, 30),
        draw_captions: false,
    };
    let surface = Compositor::new(settings)
        .render(&plan, &[solid(1, 1, Rgba8::WHITE)])
        .unwrap();
    assert_eq!(surface.pixel(899, 899), Some(Rgba8::opaque(10, 20, 30)));
}

#[test]
fn placeholder_uses_muted_background() {
    let surface = Compositor::default()
        .render_placeholder(Canvas::new(800, 600))
        .unwrap();
    assert_eq!(surface.canvas(), Canvas::new(800, 600));
    assert_eq!(surface.pixel(5, 5), Some(PLACEHOLDER_BACKGROUND));
    assert_eq!(surface.pixel(795, 595), Some(PLACEHOLDER_BACKGROUND));
}
