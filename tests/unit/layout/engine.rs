use super::*;

fn date() -> time::Date {
    time::macros::date!(2026 - 03 - 07)
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

#[test]
fn layout_ids_roundtrip_and_unknown_is_rejected() {
    for l in Layout::ALL {
        assert_eq!(l.id().parse::<Layout>().unwrap(), l);
        assert_eq!(serde_json::to_string(&l).unwrap(), format!("\"{}\"", l.id()));
    }
    assert!(matches!(
        "mosaic".parse::<Layout>(),
        Err(BoothError::UnknownLayout(id)) if id == "mosaic"
    ));
    assert!("Grid2x2".parse::<Layout>().is_err());
}

#[test]
fn canvas_size_is_fixed_and_idempotent() {
    let expected = [(800, 800), (900, 900), (1200, 400), (800, 600)];
    for (l, (w, h)) in Layout::ALL.into_iter().zip(expected) {
        let a = canvas_size(l);
        let b = canvas_size(l);
        assert_eq!(a, b);
        assert_eq!((a.width, a.height), (w, h));
    }
}

#[test]
fn rect_counts_are_capped_per_layout() {
    for l in Layout::ALL {
        for k in 1..=12 {
            let plan = compute_rects_on(l, k, date()).unwrap();
            let expected = l.max_items().map_or(k, |m| k.min(m));
            assert_eq!(plan.placements.len(), expected, "{l} k={k}");
            for (i, p) in plan.placements.iter().enumerate() {
                assert_eq!(p.index, i);
            }
        }
    }
}

#[test]
fn rects_stay_on_canvas_and_never_overlap() {
    for l in Layout::ALL {
        for k in 1..=16 {
            let plan = compute_rects_on(l, k, date()).unwrap();
            let rects: Vec<Rect> = plan.rects().collect();
            for (i, r) in rects.iter().enumerate() {
                assert!(plan.canvas.contains_rect(*r), "{l} k={k} rect {i} {r:?}");
                assert!(r.width() > 0.0 && r.height() > 0.0);
                for other in &rects[i + 1..] {
                    assert!(!overlaps(*r, *other), "{l} k={k} {r:?} vs {other:?}");
                }
            }
        }
    }
}

#[test]
fn zero_items_is_invalid_selection() {
    for l in Layout::ALL {
        assert!(matches!(
            compute_rects_on(l, 0, date()),
            Err(BoothError::InvalidSelection(_))
        ));
    }
}

#[test]
fn item_count_rejects_negative_and_fractional() {
    assert!(matches!(
        ItemCount::try_from(-1i64),
        Err(BoothError::InvalidSelection(_))
    ));
    assert!(ItemCount::try_from(0i64).is_err());
    assert!(ItemCount::try_from(2.5f64).is_err());
    assert!(ItemCount::try_from(f64::NAN).is_err());
    assert!(ItemCount::try_from(-3.0f64).is_err());
    assert_eq!(ItemCount::try_from(3.0f64).unwrap().get(), 3);
    assert_eq!(ItemCount::try_from(7i64).unwrap().get(), 7);
}

#[test]
fn grid2x2_cells_are_inset_by_ten() {
    let plan = compute_rects_on(Layout::Grid2x2, 5, date()).unwrap();
    let rects: Vec<Rect> = plan.rects().collect();
    assert_eq!(
        rects,
        vec![
            Rect::new(10.0, 10.0, 390.0, 390.0),
            Rect::new(410.0, 10.0, 790.0, 390.0),
            Rect::new(10.0, 410.0, 390.0, 790.0),
            Rect::new(410.0, 410.0, 790.0, 790.0),
        ]
    );
}

#[test]
fn grid3x3_uses_row_major_order_with_padding_eight() {
    let plan = compute_rects_on(Layout::Grid3x3, 9, date()).unwrap();
    assert_eq!(plan.canvas, Canvas::new(900, 900));
    assert_eq!(plan.placements[0].rect, Rect::new(8.0, 8.0, 292.0, 292.0));
    assert_eq!(plan.placements[5].rect, Rect::new(608.0, 308.0, 892.0, 592.0));
    assert_eq!(plan.placements[7].rect, Rect::new(308.0, 608.0, 592.0, 892.0));
}

#[test]
fn strip_columns_follow_item_count() {
    let plan = compute_rects_on(Layout::Strip, 3, date()).unwrap();
    assert_eq!(plan.canvas, Canvas::new(1200, 400));
    let rects: Vec<Rect> = plan.rects().collect();
    assert_eq!(
        rects,
        vec![
            Rect::new(5.0, 5.0, 395.0, 395.0),
            Rect::new(405.0, 5.0, 795.0, 395.0),
            Rect::new(805.0, 5.0, 1195.0, 395.0),
        ]
    );

    let plan = compute_rects_on(Layout::Strip, 9, date()).unwrap();
    assert_eq!(plan.placements.len(), 6);
    assert_eq!(plan.placements[5].rect, Rect::new(1005.0, 5.0, 1195.0, 395.0));
}

#[test]
fn polaroid_grid_and_decorations() {
    let plan = compute_rects_on(Layout::Polaroid, 5, date()).unwrap();
    // ceil(sqrt(5)) = 3 columns, 2 rows.
    assert_eq!(plan.canvas, Canvas::new(800, 600));
    let p4 = &plan.placements[4];
    assert_eq!(p4.rect, Rect::new(230.0, 270.0, 390.0, 430.0));

    let deco = p4.decoration.as_ref().unwrap();
    assert_eq!(deco.card, Rect::new(220.0, 260.0, 400.0, 480.0));
    assert_eq!(deco.background, Rgba8::WHITE);
    assert_eq!(deco.border, Rgba8::opaque(0xdd, 0xdd, 0xdd));
    assert_eq!(deco.border_width, 2.0);
    assert_eq!(deco.caption.text, "3/7/2026");
    assert_eq!(deco.caption.anchor, Point::new(310.0, 465.0));
}

#[test]
fn polaroid_canvas_grows_to_fit_overflow() {
    let plan = compute_rects_on(Layout::Polaroid, 9, date()).unwrap();
    assert_eq!(plan.canvas, Canvas::new(800, 740));
    for p in &plan.placements {
        let card = p.decoration.as_ref().unwrap().card;
        assert!(plan.canvas.contains_rect(card.inflate(1.0, 1.0)));
    }

    let plan = compute_rects_on(Layout::Polaroid, 20, date()).unwrap();
    assert_eq!(plan.placements.len(), 20);
    assert_eq!(plan.canvas, Canvas::new(1020, 980));
}

#[test]
fn grid_layouts_have_no_decorations() {
    for l in [Layout::Grid2x2, Layout::Grid3x3, Layout::Strip] {
        let plan = compute_rects_on(l, 3, date()).unwrap();
        assert!(plan.placements.iter().all(|p| p.decoration.is_none()));
    }
}

#[test]
fn ceil_sqrt_matches_float_definition() {
    for n in 1..200usize {
        let expected = (n as f64).sqrt().ceil() as usize;
        assert_eq!(ceil_sqrt(n), expected, "n={n}");
    }
}
