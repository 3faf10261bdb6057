use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::foundation::error::{BoothError, BoothResult};

/// Encoded-image handle: raw bytes of a browser-native raster (JPEG, PNG, ...).
///
/// Cheap to clone; the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedRaster {
    bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for EncodedRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedRaster")
            .field("mime", &self.mime_type())
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl EncodedRaster {
    /// Wrap already-encoded bytes. The payload is not validated until it is decoded.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::new(bytes.into()),
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> BoothResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| BoothError::decode("raster source is not a data URI"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| BoothError::decode("data URI has no payload separator"))?;
        if !meta.ends_with(";base64") {
            return Err(BoothError::decode("data URI payload must be base64"));
        }
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| BoothError::decode(format!("invalid base64 in data URI: {e}")))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Encode as a `data:` URI using the sniffed MIME type.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            STANDARD.encode(self.bytes.as_slice())
        )
    }

    /// Raw encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Return `true` for an empty payload.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Container format sniffed from the magic bytes, if recognized.
    pub fn format(&self) -> Option<image::ImageFormat> {
        image::guess_format(&self.bytes).ok()
    }

    /// MIME type for the sniffed format; `application/octet-stream` when unknown.
    pub fn mime_type(&self) -> &'static str {
        self.format()
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream")
    }
}

/// Encode straight-alpha RGBA8 pixels as JPEG, flattening any transparency over white.
pub fn encode_jpeg(rgba: &image::RgbaImage, quality: u8) -> BoothResult<EncodedRaster> {
    let quality = quality.clamp(1, 100);
    let (width, height) = rgba.dimensions();
    let mut rgb = image::RgbImage::new(width, height);
    for (dst, src) in rgb.pixels_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        let a = u32::from(a);
        let flatten = |c: u8| -> u8 { ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8 };
        *dst = image::Rgb([flatten(r), flatten(g), flatten(b)]);
    }

    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&rgb)
        .map_err(|e| anyhow::anyhow!("encode jpeg {width}x{height}: {e}"))?;
    Ok(EncodedRaster::from_bytes(buf))
}

/// Encode straight-alpha RGBA8 pixels as PNG.
pub fn encode_png(rgba: &image::RgbaImage) -> BoothResult<EncodedRaster> {
    let mut buf = Vec::new();
    rgba.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| anyhow::anyhow!("encode png: {e}"))?;
    Ok(EncodedRaster::from_bytes(buf))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/raster.rs"]
mod tests;
