use std::sync::{Arc, OnceLock};

use crate::{
    foundation::core::Canvas,
    foundation::error::{BoothError, BoothResult},
    layout::engine::Caption,
};

const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";

static FONTDB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

fn system_fontdb() -> Arc<usvg::fontdb::Database> {
    FONTDB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            let sans = usvg::fontdb::Query {
                families: &[usvg::fontdb::Family::SansSerif],
                ..Default::default()
            };
            if db.query(&sans).is_none() {
                let fallback = db
                    .faces()
                    .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
                if let Some(name) = fallback {
                    db.set_sans_serif_family(name);
                }
            }
            tracing::debug!(faces = db.faces().count(), "loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

/// Whether any font face is available to the caption rasterizer.
pub fn fonts_available() -> bool {
    system_fontdb().faces().next().is_some()
}

/// Rasterize `captions` into a transparent, canvas-sized premultiplied RGBA8 layer.
///
/// Each caption is centered horizontally on its anchor, with the anchor on the text baseline.
/// Returns `Ok(None)` when there is nothing to draw or no font face is available; callers treat
/// that as "skip the text" rather than a failure.
pub fn rasterize_captions(canvas: Canvas, captions: &[&Caption]) -> BoothResult<Option<Vec<u8>>> {
    if captions.is_empty() {
        return Ok(None);
    }
    let fontdb = system_fontdb();
    if fontdb.faces().next().is_none() {
        tracing::warn!(count = captions.len(), "no font faces available, skipping captions");
        return Ok(None);
    }

    let svg = captions_svg(canvas, captions);
    let opts = usvg::Options {
        fontdb,
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
        .map_err(|e| BoothError::Other(anyhow::anyhow!("parse caption svg: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
        .ok_or_else(|| BoothError::Other(anyhow::anyhow!("failed to allocate caption pixmap")))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );
    Ok(Some(pixmap.data().to_vec()))
}

fn captions_svg(canvas: Canvas, captions: &[&Caption]) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = canvas.width,
        h = canvas.height
    );
    for c in captions {
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-family="{FONT_FAMILY}" font-size="{size}" fill="{fill}" fill-opacity="{opacity}" text-anchor="middle">{text}</text>"#,
            x = c.anchor.x,
            y = c.anchor.y,
            size = c.font_size_px,
            fill = c.color.to_hex(),
            opacity = f64::from(c.color.a) / 255.0,
            text = escape_xml(&c.text),
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
