use crate::foundation::error::{BoothError, BoothResult};

/// One premultiplied `[r, g, b, a]` pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

/// Source-over a whole premultiplied layer onto `dst`.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> BoothResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(BoothError::Other(anyhow::anyhow!(
            "over_in_place expects equal-length rgba8 buffers ({} vs {})",
            dst.len(),
            src.len()
        )));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
