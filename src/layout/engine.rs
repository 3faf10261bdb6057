use time::macros::format_description;

use crate::foundation::{
    core::{Canvas, Point, Rect, Rgba8},
    error::{BoothError, BoothResult},
};

/// Fixed collage layouts.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// 2x2 grid on an 800x800 canvas.
    #[default]
    Grid2x2,
    /// 3x3 grid on a 900x900 canvas.
    Grid3x3,
    /// Single row of up to 6 photos on a 1200x400 canvas.
    Strip,
    /// Near-square grid of polaroid cards; unbounded item count.
    Polaroid,
}

const POLAROID_CARD_W: f64 = 180.0;
const POLAROID_CARD_H: f64 = 220.0;
const POLAROID_PHOTO: f64 = 160.0;
const POLAROID_PHOTO_INSET: f64 = 10.0;
const POLAROID_GUTTER: f64 = 20.0;
const POLAROID_CAPTION_FROM_BOTTOM: f64 = 15.0;
const STRIP_MAX_COLUMNS: usize = 6;

impl Layout {
    /// Every layout, in menu order.
    pub const ALL: [Layout; 4] = [Self::Grid2x2, Self::Grid3x3, Self::Strip, Self::Polaroid];

    /// Wire identifier (`grid2x2`, `grid3x3`, `strip`, `polaroid`).
    pub fn id(self) -> &'static str {
        match self {
            Self::Grid2x2 => "grid2x2",
            Self::Grid3x3 => "grid3x3",
            Self::Strip => "strip",
            Self::Polaroid => "polaroid",
        }
    }

    /// Nominal canvas for this layout, used for preview sizing.
    ///
    /// Polaroid plans may grow beyond this; see [`compute_rects`].
    pub fn canvas_size(self) -> Canvas {
        match self {
            Self::Grid2x2 => Canvas::new(800, 800),
            Self::Grid3x3 => Canvas::new(900, 900),
            Self::Strip => Canvas::new(1200, 400),
            Self::Polaroid => Canvas::new(800, 600),
        }
    }

    /// Maximum number of items placed; `None` when unbounded.
    pub fn max_items(self) -> Option<usize> {
        match self {
            Self::Grid2x2 => Some(4),
            Self::Grid3x3 => Some(9),
            Self::Strip => Some(STRIP_MAX_COLUMNS),
            Self::Polaroid => None,
        }
    }

    /// Number of items that will actually be placed for `item_count` inputs.
    pub fn placed_count(self, item_count: usize) -> usize {
        self.max_items()
            .map_or(item_count, |max| item_count.min(max))
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Layout {
    type Err = BoothError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.id() == s)
            .ok_or_else(|| BoothError::unknown_layout(s))
    }
}

/// Validated, positive item count.
///
/// Only needed at boundaries where counts arrive as signed or floating-point numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemCount(usize);

impl ItemCount {
    /// Validate a `usize` count (rejects zero).
    pub fn new(n: usize) -> BoothResult<Self> {
        if n == 0 {
            return Err(BoothError::invalid_selection("item count must be >= 1"));
        }
        Ok(Self(n))
    }

    /// The count as `usize`.
    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for ItemCount {
    type Error = BoothError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let n = usize::try_from(value).map_err(|_| {
            BoothError::invalid_selection(format!("item count must be >= 1, got {value}"))
        })?;
        Self::new(n)
    }
}

impl TryFrom<f64> for ItemCount {
    type Error = BoothError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(BoothError::invalid_selection(format!(
                "item count must be an integer, got {value}"
            )));
        }
        if value < 1.0 || value > usize::MAX as f64 {
            return Err(BoothError::invalid_selection(format!(
                "item count must be >= 1, got {value}"
            )));
        }
        Self::new(value as usize)
    }
}

/// Text drawn on a decorated card.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Caption {
    /// Caption text.
    pub text: String,
    /// Baseline anchor; text is horizontally centered on `anchor.x`.
    pub anchor: Point,
    /// Text color.
    pub color: Rgba8,
    /// Font size in pixels.
    pub font_size_px: f64,
}

/// Layout-specific non-photo elements drawn behind a placement.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decoration {
    /// Outer card rectangle; the photo rect sits inside it.
    pub card: Rect,
    /// Card fill.
    pub background: Rgba8,
    /// Border stroke color.
    pub border: Rgba8,
    /// Border stroke width, centered on the card edge.
    pub border_width: f64,
    /// Caption near the bottom of the card.
    pub caption: Caption,
}

/// Destination for the item at `index` in selection order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Selection index this placement receives.
    pub index: usize,
    /// Destination rectangle the image is stretched into.
    pub rect: Rect,
    /// Optional card decoration (polaroid only).
    pub decoration: Option<Decoration>,
}

/// Result of laying out `n` items.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutPlan {
    /// Layout used.
    pub layout: Layout,
    /// Canvas the placements live on.
    pub canvas: Canvas,
    /// Placements in selection order.
    pub placements: Vec<Placement>,
}

impl LayoutPlan {
    /// Destination rectangles in selection order.
    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.placements.iter().map(|p| p.rect)
    }
}

/// Nominal canvas size for `layout`.
pub fn canvas_size(layout: Layout) -> Canvas {
    layout.canvas_size()
}

/// Lay out `item_count` items, captioning decorated cards with today's date.
pub fn compute_rects(layout: Layout, item_count: usize) -> BoothResult<LayoutPlan> {
    let today = time::OffsetDateTime::now_local()
        .unwrap_or_else(|_| time::OffsetDateTime::now_utc())
        .date();
    compute_rects_on(layout, item_count, today)
}

/// Lay out `item_count` items with captions for `date`.
///
/// Grid and strip layouts place at most [`Layout::max_items`] items and drop the rest. Polaroid
/// places every item and grows the canvas past its nominal size so that every card, plus the
/// outer gutter, stays on the canvas.
pub fn compute_rects_on(
    layout: Layout,
    item_count: usize,
    date: time::Date,
) -> BoothResult<LayoutPlan> {
    let n = ItemCount::new(item_count)?.get();
    let placed = layout.placed_count(n);
    if placed < n {
        tracing::debug!(%layout, requested = n, placed, "dropping items beyond layout capacity");
    }

    let plan = match layout {
        Layout::Grid2x2 => grid_plan(layout, 2, 10.0, placed),
        Layout::Grid3x3 => grid_plan(layout, 3, 8.0, placed),
        Layout::Strip => strip_plan(placed),
        Layout::Polaroid => polaroid_plan(placed, &caption_date(date)?),
    };
    tracing::debug!(
        %layout,
        width = plan.canvas.width,
        height = plan.canvas.height,
        placements = plan.placements.len(),
        "layout computed"
    );
    Ok(plan)
}

fn grid_plan(layout: Layout, cols: usize, padding: f64, placed: usize) -> LayoutPlan {
    let canvas = layout.canvas_size();
    let cell_w = f64::from(canvas.width) / cols as f64;
    let cell_h = f64::from(canvas.height) / cols as f64;

    let placements = (0..placed)
        .map(|i| {
            let row = (i / cols) as f64;
            let col = (i % cols) as f64;
            Placement {
                index: i,
                rect: Rect::new(
                    col * cell_w + padding,
                    row * cell_h + padding,
                    (col + 1.0) * cell_w - padding,
                    (row + 1.0) * cell_h - padding,
                ),
                decoration: None,
            }
        })
        .collect();

    LayoutPlan {
        layout,
        canvas,
        placements,
    }
}

fn strip_plan(placed: usize) -> LayoutPlan {
    const PADDING: f64 = 5.0;
    let canvas = Layout::Strip.canvas_size();
    // Columns widen when fewer than the maximum are selected.
    let columns = placed.min(STRIP_MAX_COLUMNS);
    let cell_w = f64::from(canvas.width) / columns as f64;
    let cell_h = f64::from(canvas.height);

    let placements = (0..placed)
        .map(|i| Placement {
            index: i,
            rect: Rect::new(
                i as f64 * cell_w + PADDING,
                PADDING,
                (i as f64 + 1.0) * cell_w - PADDING,
                cell_h - PADDING,
            ),
            decoration: None,
        })
        .collect();

    LayoutPlan {
        layout: Layout::Strip,
        canvas,
        placements,
    }
}

fn polaroid_plan(placed: usize, caption: &str) -> LayoutPlan {
    let cols = ceil_sqrt(placed);
    let rows = placed.div_ceil(cols);
    let pitch_x = POLAROID_CARD_W + POLAROID_GUTTER;
    let pitch_y = POLAROID_CARD_H + POLAROID_GUTTER;

    let nominal = Layout::Polaroid.canvas_size();
    let needed_w = (cols as f64 * pitch_x + POLAROID_GUTTER).ceil() as u32;
    let needed_h = (rows as f64 * pitch_y + POLAROID_GUTTER).ceil() as u32;
    let canvas = Canvas::new(nominal.width.max(needed_w), nominal.height.max(needed_h));

    let placements = (0..placed)
        .map(|i| {
            let col = (i % cols) as f64;
            let row = (i / cols) as f64;
            let x = col * pitch_x + POLAROID_GUTTER;
            let y = row * pitch_y + POLAROID_GUTTER;
            let photo_x = x + (POLAROID_CARD_W - POLAROID_PHOTO) / 2.0;
            let photo_y = y + POLAROID_PHOTO_INSET;

            Placement {
                index: i,
                rect: Rect::new(
                    photo_x,
                    photo_y,
                    photo_x + POLAROID_PHOTO,
                    photo_y + POLAROID_PHOTO,
                ),
                decoration: Some(Decoration {
                    card: Rect::new(x, y, x + POLAROID_CARD_W, y + POLAROID_CARD_H),
                    background: Rgba8::WHITE,
                    border: Rgba8::opaque(0xdd, 0xdd, 0xdd),
                    border_width: 2.0,
                    caption: Caption {
                        text: caption.to_string(),
                        anchor: Point::new(
                            x + POLAROID_CARD_W / 2.0,
                            y + POLAROID_CARD_H - POLAROID_CAPTION_FROM_BOTTOM,
                        ),
                        color: Rgba8::opaque(0x66, 0x66, 0x66),
                        font_size_px: 12.0,
                    },
                }),
            }
        })
        .collect();

    LayoutPlan {
        layout: Layout::Polaroid,
        canvas,
        placements,
    }
}

/// Smallest `c` with `c * c >= n` (and at least 1).
fn ceil_sqrt(n: usize) -> usize {
    let mut c = (n as f64).sqrt() as usize;
    while c * c < n {
        c += 1;
    }
    while c > 1 && (c - 1) * (c - 1) >= n {
        c -= 1;
    }
    c.max(1)
}

fn caption_date(date: time::Date) -> BoothResult<String> {
    date.format(format_description!(
        "[month padding:none]/[day padding:none]/[year]"
    ))
    .map_err(|e| BoothError::Other(anyhow::anyhow!("format caption date: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
