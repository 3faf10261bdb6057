use std::sync::Arc;

use crate::{
    assets::decode::DecodedImage,
    foundation::core::{Canvas, Point, Rect, Rgba8},
    foundation::error::{BoothError, BoothResult},
    layout::engine::{Caption, Decoration, LayoutPlan, Placement},
    render::{composite::over_in_place, surface::Surface, text::rasterize_captions},
};

/// Empty-state background.
pub const PLACEHOLDER_BACKGROUND: Rgba8 = Rgba8::opaque(0xf0, 0xf0, 0xf0);
/// Empty-state prompt.
pub const PLACEHOLDER_TEXT: &str = "Select photos and click Generate";

/// Knobs for [`Compositor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositorSettings {
    /// Canvas fill under everything else.
    pub background: Rgba8,
    /// Draw decoration captions (polaroid dates).
    pub draw_captions: bool,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            background: Rgba8::WHITE,
            draw_captions: true,
        }
    }
}

/// CPU collage rasterizer.
///
/// Layers are drawn with `vello_cpu` into transparent scratch pixmaps and composited source-over
/// onto the output surface in a fixed order: background, decorations, captions, photos.
#[derive(Clone, Debug, Default)]
pub struct Compositor {
    settings: CompositorSettings,
}

impl Compositor {
    /// Create a compositor with explicit settings.
    pub fn new(settings: CompositorSettings) -> Self {
        Self { settings }
    }

    /// Active settings.
    pub fn settings(&self) -> CompositorSettings {
        self.settings
    }

    /// Render `images` into the placements of `plan`.
    ///
    /// `plan.placements[i]` receives `images[i]`; images past the placement count are ignored.
    /// The returned surface is complete; nothing partially drawn escapes on error.
    #[tracing::instrument(
        skip(self, plan, images),
        fields(layout = %plan.layout, width = plan.canvas.width, height = plan.canvas.height)
    )]
    pub fn render(&self, plan: &LayoutPlan, images: &[DecodedImage]) -> BoothResult<Surface> {
        if images.len() < plan.placements.len() {
            return Err(BoothError::Other(anyhow::anyhow!(
                "layout places {} images but only {} were decoded",
                plan.placements.len(),
                images.len()
            )));
        }
        if images.len() > plan.placements.len() {
            tracing::warn!(
                dropped = images.len() - plan.placements.len(),
                "images beyond the layout capacity are ignored"
            );
        }

        let mut surface = Surface::new(plan.canvas, self.settings.background)?;

        let decorations: Vec<&Decoration> = plan
            .placements
            .iter()
            .filter_map(|p| p.decoration.as_ref())
            .collect();
        if !decorations.is_empty() {
            let layer = paint_layer(plan.canvas, |ctx| {
                for deco in &decorations {
                    draw_decoration(ctx, deco);
                }
                Ok(())
            })?;
            over_in_place(surface.as_premul_bytes_mut(), layer.data_as_u8_slice())?;
        }

        if self.settings.draw_captions {
            let captions: Vec<&Caption> = decorations.iter().map(|d| &d.caption).collect();
            if let Some(layer) = rasterize_captions(plan.canvas, &captions)? {
                over_in_place(surface.as_premul_bytes_mut(), &layer)?;
            }
        }

        let layer = paint_layer(plan.canvas, |ctx| {
            for (placement, image) in plan.placements.iter().zip(images) {
                draw_photo(ctx, placement, image)?;
            }
            Ok(())
        })?;
        over_in_place(surface.as_premul_bytes_mut(), layer.data_as_u8_slice())?;

        tracing::debug!(placed = plan.placements.len(), "collage composited");
        Ok(surface)
    }

    /// Render the empty-state placeholder shown before any collage exists.
    #[tracing::instrument(skip(self))]
    pub fn render_placeholder(&self, canvas: Canvas) -> BoothResult<Surface> {
        let mut surface = Surface::new(canvas, PLACEHOLDER_BACKGROUND)?;
        let prompt = Caption {
            text: PLACEHOLDER_TEXT.to_string(),
            anchor: Point::new(f64::from(canvas.width) / 2.0, f64::from(canvas.height) / 2.0),
            color: Rgba8::opaque(0x99, 0x99, 0x99),
            font_size_px: 24.0,
        };
        if let Some(layer) = rasterize_captions(canvas, &[&prompt])? {
            over_in_place(surface.as_premul_bytes_mut(), &layer)?;
        }
        Ok(surface)
    }
}

fn paint_layer(
    canvas: Canvas,
    draw: impl FnOnce(&mut vello_cpu::RenderContext) -> BoothResult<()>,
) -> BoothResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(canvas.width, canvas.height)?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    draw(&mut ctx)?;
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap)
}

fn draw_decoration(ctx: &mut vello_cpu::RenderContext, deco: &Decoration) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

    set_color(ctx, deco.background);
    ctx.fill_rect(&to_cpu_rect(deco.card));

    // Border straddles the card edge, half outside and half inside.
    let half = deco.border_width / 2.0;
    let c = deco.card;
    set_color(ctx, deco.border);
    for edge in [
        Rect::new(c.x0 - half, c.y0 - half, c.x1 + half, c.y0 + half),
        Rect::new(c.x0 - half, c.y1 - half, c.x1 + half, c.y1 + half),
        Rect::new(c.x0 - half, c.y0 + half, c.x0 + half, c.y1 - half),
        Rect::new(c.x1 - half, c.y0 + half, c.x1 + half, c.y1 - half),
    ] {
        ctx.fill_rect(&to_cpu_rect(edge));
    }
}

fn draw_photo(
    ctx: &mut vello_cpu::RenderContext,
    placement: &Placement,
    image: &DecodedImage,
) -> BoothResult<()> {
    let pixmap = premul_to_pixmap(image)?;
    let (w, h) = (f64::from(image.width), f64::from(image.height));
    let rect = placement.rect;

    // Stretch to fill; aspect ratio is not preserved.
    let transform = vello_cpu::kurbo::Affine::translate((rect.x0, rect.y0))
        * vello_cpu::kurbo::Affine::scale_non_uniform(rect.width() / w, rect.height() / h);
    ctx.set_transform(transform);
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
    Ok(())
}

fn premul_to_pixmap(image: &DecodedImage) -> BoothResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(image.width, image.height)?;
    if image.rgba8_premul.len() != image.width as usize * image.height as usize * 4 {
        return Err(BoothError::Other(anyhow::anyhow!(
            "decoded image byte length mismatch"
        )));
    }

    let mut may_have_opacities = false;
    let pixels = image
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

fn to_cpu_rect(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn dims_u16(width: u32, height: u32) -> BoothResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| BoothError::Other(anyhow::anyhow!("width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| BoothError::Other(anyhow::anyhow!("height {height} exceeds u16")))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
