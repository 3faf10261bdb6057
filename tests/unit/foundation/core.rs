use super::*;

#[test]
fn canvas_contains_rect_boundaries() {
    let canvas = Canvas::new(100, 50);
    assert!(canvas.contains_rect(Rect::new(0.0, 0.0, 100.0, 50.0)));
    assert!(canvas.contains_rect(Rect::new(10.0, 10.0, 20.0, 20.0)));
    assert!(!canvas.contains_rect(Rect::new(90.0, 0.0, 101.0, 10.0)));
    assert!(!canvas.contains_rect(Rect::new(-1.0, 0.0, 10.0, 10.0)));
}

#[test]
fn premul_keeps_opaque_channels() {
    assert_eq!(Rgba8::opaque(12, 200, 7).to_premul(), [12, 200, 7, 255]);
    let half = Rgba8 {
        r: 200,
        g: 100,
        b: 0,
        a: 128,
    };
    assert_eq!(half.to_premul(), [100, 50, 0, 128]);
}

#[test]
fn hex_is_lowercase_six_digits() {
    assert_eq!(Rgba8::opaque(0xdd, 0xdd, 0xdd).to_hex(), "#dddddd");
    assert_eq!(Rgba8::opaque(0, 10, 255).to_hex(), "#000aff");
}
