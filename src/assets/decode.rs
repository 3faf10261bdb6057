use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    assets::raster::EncodedRaster,
    foundation::cancel::CancelToken,
    foundation::error::{BoothError, BoothResult},
};

/// Largest decoded edge the CPU compositor accepts.
pub const MAX_DECODED_DIM: u32 = 16_384;

/// Decoded bitmap in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode one encoded raster.
///
/// Fails with [`BoothError::Decode`] when the payload is not a supported raster encoding.
pub fn decode_image(raster: &EncodedRaster) -> BoothResult<DecodedImage> {
    if raster.is_empty() {
        return Err(BoothError::decode("empty raster payload"));
    }
    let dyn_img = image::load_from_memory(raster.as_bytes())
        .map_err(|e| BoothError::decode(format!("unsupported raster: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(BoothError::decode("raster has zero width or height"));
    }
    if width > MAX_DECODED_DIM || height > MAX_DECODED_DIM {
        return Err(BoothError::decode(format!(
            "raster too large: {width}x{height} (max {MAX_DECODED_DIM}x{MAX_DECODED_DIM})"
        )));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Decode a batch concurrently, preserving input order in the output.
///
/// All-or-nothing: the first failing item fails the batch and no partial results are returned.
/// A cancelled `cancel` token wins over any other outcome and yields [`BoothError::Cancelled`].
#[tracing::instrument(skip(rasters, cancel), fields(count = rasters.len()))]
pub fn decode_batch(
    rasters: &[EncodedRaster],
    cancel: &CancelToken,
    threads: Option<usize>,
) -> BoothResult<Vec<DecodedImage>> {
    cancel.check()?;
    if rasters.is_empty() {
        return Ok(Vec::new());
    }

    let pool = build_thread_pool(threads)?;
    let decoded = pool.install(|| {
        rasters
            .par_iter()
            .enumerate()
            .map(|(idx, raster)| -> BoothResult<DecodedImage> {
                cancel.check()?;
                let img = decode_image(raster).map_err(|e| match e {
                    BoothError::Decode(msg) => BoothError::decode(format!("image #{idx}: {msg}")),
                    other => other,
                })?;
                cancel.check()?;
                Ok(img)
            })
            .collect::<Vec<_>>()
    });

    cancel.check()?;
    let out = decoded.into_iter().collect::<BoothResult<Vec<_>>>()?;
    tracing::debug!(decoded = out.len(), "decode batch joined");
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> BoothResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(BoothError::config("decode threads must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        BoothError::Other(anyhow::anyhow!("failed to build decode thread pool: {e}"))
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
