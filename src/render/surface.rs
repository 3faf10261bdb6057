use crate::{
    assets::{
        filter::unpremultiply_rgba8_in_place,
        raster::{EncodedRaster, encode_jpeg, encode_png},
    },
    foundation::core::{Canvas, Rgba8},
    foundation::error::{BoothError, BoothResult},
};

/// Premultiplied RGBA8 raster target sized to a [`Canvas`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    canvas: Canvas,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a surface filled with `fill`.
    pub fn new(canvas: Canvas, fill: Rgba8) -> BoothResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(BoothError::Other(anyhow::anyhow!(
                "surface must be non-empty (got {}x{})",
                canvas.width,
                canvas.height
            )));
        }
        if canvas.width > u32::from(u16::MAX) || canvas.height > u32::from(u16::MAX) {
            return Err(BoothError::Other(anyhow::anyhow!(
                "surface {}x{} exceeds the raster limit",
                canvas.width,
                canvas.height
            )));
        }
        let mut surface = Self {
            canvas,
            data: vec![0; canvas.pixel_count() * 4],
        };
        surface.clear(fill);
        Ok(surface)
    }

    /// Overwrite every pixel with `color`.
    pub fn clear(&mut self, color: Rgba8) {
        let px = color.to_premul();
        for dst in self.data.chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Raw premultiplied bytes, row-major.
    pub fn as_premul_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_premul_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Straight-alpha pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let i = (y as usize * self.canvas.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[i..i + 4]);
        unpremultiply_rgba8_in_place(&mut px);
        Some(Rgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Straight-alpha copy for encoders.
    pub fn to_rgba_image(&self) -> BoothResult<image::RgbaImage> {
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        image::RgbaImage::from_raw(self.canvas.width, self.canvas.height, straight)
            .ok_or_else(|| BoothError::Other(anyhow::anyhow!("surface byte length mismatch")))
    }

    /// Encode as baseline JPEG at `quality` (1..=100).
    pub fn encode_jpeg(&self, quality: u8) -> BoothResult<EncodedRaster> {
        encode_jpeg(&self.to_rgba_image()?, quality)
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> BoothResult<EncodedRaster> {
        encode_png(&self.to_rgba_image()?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
