//! Capture filters applied to a still before it is stored in the gallery.
//!
//! Each named filter is a chain of CSS filter functions evaluated left to right on straight-alpha
//! RGB in `[0, 1]`, clamping after every function the way browsers do.

use crate::{
    assets::decode::decode_image,
    assets::raster::{EncodedRaster, encode_jpeg},
    foundation::error::BoothResult,
};

/// A single CSS filter function with its argument.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterFn {
    /// `grayscale(amount)`.
    Grayscale(f32),
    /// `sepia(amount)`.
    Sepia(f32),
    /// `invert(amount)`.
    Invert(f32),
    /// `brightness(factor)`.
    Brightness(f32),
    /// `contrast(factor)`.
    Contrast(f32),
    /// `saturate(factor)`.
    Saturate(f32),
    /// `hue-rotate(degrees)`.
    HueRotate(f32),
    /// `blur(px)`; the argument is the Gaussian standard deviation.
    Blur(f32),
}

/// Named capture filters offered by the booth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CaptureFilter {
    /// Pass-through.
    #[default]
    None,
    /// Full desaturation.
    Grayscale,
    /// Full sepia tone.
    Sepia,
    /// Color negative.
    Invert,
    /// 2px Gaussian blur.
    Blur,
    /// Half sepia with a slight contrast and saturation lift.
    Vintage,
    /// Brightness x1.5.
    Bright,
    /// Brightness x0.6.
    Dark,
    /// Contrast x1.8.
    Contrast,
    /// Saturation x2.
    Saturate,
    /// Hue rotated by 90 degrees.
    HueRotate,
    /// Punchy contrast with a 270 degree hue shift.
    Cyberpunk,
    /// Blue-shifted, slightly brighter.
    Cool,
    /// Warm 30 degree hue shift.
    Warm,
    /// Green-leaning warm tone with a touch of sepia.
    WarmGreen,
    /// Purple cast with a touch of sepia.
    Purple,
    /// Darkened green cast.
    Matrix,
    /// Strong sepia, muted saturation.
    Nostalgia,
    /// Bright, soft and slightly blurred.
    Dreamy,
}

impl CaptureFilter {
    /// Every filter, in menu order.
    pub const ALL: [CaptureFilter; 19] = [
        Self::None,
        Self::Grayscale,
        Self::Sepia,
        Self::Invert,
        Self::Blur,
        Self::Vintage,
        Self::Bright,
        Self::Dark,
        Self::Contrast,
        Self::Saturate,
        Self::HueRotate,
        Self::Cyberpunk,
        Self::Cool,
        Self::Warm,
        Self::WarmGreen,
        Self::Purple,
        Self::Matrix,
        Self::Nostalgia,
        Self::Dreamy,
    ];

    /// Resolve a filter by name. Unrecognized names fall back to [`CaptureFilter::None`].
    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == name.trim())
            .unwrap_or(Self::None)
    }

    /// Stable name as stored in gallery entries.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Invert => "invert",
            Self::Blur => "blur",
            Self::Vintage => "vintage",
            Self::Bright => "bright",
            Self::Dark => "dark",
            Self::Contrast => "contrast",
            Self::Saturate => "saturate",
            Self::HueRotate => "hue-rotate",
            Self::Cyberpunk => "cyberpunk",
            Self::Cool => "cool",
            Self::Warm => "warm",
            Self::WarmGreen => "warm-green",
            Self::Purple => "purple",
            Self::Matrix => "matrix",
            Self::Nostalgia => "nostalgia",
            Self::Dreamy => "dreamy",
        }
    }

    /// Filter-function chain for this filter.
    pub fn chain(self) -> &'static [FilterFn] {
        use FilterFn::*;
        match self {
            Self::None => &[],
            Self::Grayscale => &[Grayscale(1.0)],
            Self::Sepia => &[Sepia(1.0)],
            Self::Invert => &[Invert(1.0)],
            Self::Blur => &[Blur(2.0)],
            Self::Vintage => &[Sepia(0.5), Contrast(1.2), Brightness(1.1), Saturate(1.2)],
            Self::Bright => &[Brightness(1.5)],
            Self::Dark => &[Brightness(0.6)],
            Self::Contrast => &[Contrast(1.8)],
            Self::Saturate => &[Saturate(2.0)],
            Self::HueRotate => &[HueRotate(90.0)],
            Self::Cyberpunk => &[
                Contrast(1.5),
                Brightness(1.2),
                Saturate(1.5),
                HueRotate(270.0),
            ],
            Self::Cool => &[
                Brightness(1.1),
                Contrast(1.2),
                Saturate(1.3),
                HueRotate(180.0),
            ],
            Self::Warm => &[
                Brightness(1.2),
                Contrast(1.1),
                Saturate(1.4),
                HueRotate(30.0),
            ],
            Self::WarmGreen => &[
                Brightness(1.15),
                Contrast(1.2),
                Saturate(1.3),
                HueRotate(80.0),
                Sepia(0.1),
            ],
            Self::Purple => &[
                Brightness(1.1),
                Contrast(1.3),
                Saturate(1.5),
                HueRotate(270.0),
                Sepia(0.2),
            ],
            Self::Matrix => &[
                Brightness(0.8),
                Contrast(1.5),
                Saturate(0.8),
                HueRotate(120.0),
            ],
            Self::Nostalgia => &[
                Sepia(0.7),
                Contrast(1.1),
                Brightness(1.2),
                Saturate(0.8),
            ],
            Self::Dreamy => &[
                Brightness(1.3),
                Contrast(0.8),
                Saturate(1.2),
                Blur(0.5),
            ],
        }
    }
}

impl std::fmt::Display for CaptureFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply `filter` to straight-alpha RGBA8 pixels.
pub fn apply_filter(img: &image::RgbaImage, filter: CaptureFilter) -> image::RgbaImage {
    let mut out = img.clone();
    for &func in filter.chain() {
        match func {
            FilterFn::Blur(sigma) => {
                if sigma > 0.0 {
                    out = image::imageops::blur(&out, sigma);
                }
            }
            color_fn => {
                for px in out.pixels_mut() {
                    let [r, g, b, a] = px.0;
                    let rgb = apply_color_fn(
                        color_fn,
                        [
                            f32::from(r) / 255.0,
                            f32::from(g) / 255.0,
                            f32::from(b) / 255.0,
                        ],
                    );
                    px.0 = [to_u8(rgb[0]), to_u8(rgb[1]), to_u8(rgb[2]), a];
                }
            }
        }
    }
    out
}

/// Decode `raster`, apply `filter`, and re-encode as JPEG at `quality`.
#[tracing::instrument(skip(raster), fields(bytes = raster.len()))]
pub fn filter_raster(
    raster: &EncodedRaster,
    filter: CaptureFilter,
    quality: u8,
) -> BoothResult<EncodedRaster> {
    let decoded = decode_image(raster)?;
    let mut straight = decoded.rgba8_premul.as_ref().clone();
    unpremultiply_rgba8_in_place(&mut straight);
    let img = image::RgbaImage::from_raw(decoded.width, decoded.height, straight)
        .ok_or_else(|| anyhow::anyhow!("decoded buffer does not match its dimensions"))?;
    encode_jpeg(&apply_filter(&img, filter), quality)
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn apply_color_fn(func: FilterFn, [r, g, b]: [f32; 3]) -> [f32; 3] {
    let out = match func {
        FilterFn::Grayscale(amount) => {
            let k = 1.0 - amount.clamp(0.0, 1.0);
            mat3(
                [
                    [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
                    [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
                    [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
                ],
                [r, g, b],
            )
        }
        FilterFn::Sepia(amount) => {
            let k = 1.0 - amount.clamp(0.0, 1.0);
            mat3(
                [
                    [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
                    [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
                    [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
                ],
                [r, g, b],
            )
        }
        FilterFn::Saturate(s) => {
            let s = s.max(0.0);
            mat3(
                [
                    [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
                ],
                [r, g, b],
            )
        }
        FilterFn::HueRotate(deg) => {
            let (sin, cos) = deg.to_radians().sin_cos();
            mat3(
                [
                    [
                        0.213 + cos * 0.787 - sin * 0.213,
                        0.715 - cos * 0.715 - sin * 0.715,
                        0.072 - cos * 0.072 + sin * 0.928,
                    ],
                    [
                        0.213 - cos * 0.213 + sin * 0.143,
                        0.715 + cos * 0.285 + sin * 0.140,
                        0.072 - cos * 0.072 - sin * 0.283,
                    ],
                    [
                        0.213 - cos * 0.213 - sin * 0.787,
                        0.715 - cos * 0.715 + sin * 0.715,
                        0.072 + cos * 0.928 + sin * 0.072,
                    ],
                ],
                [r, g, b],
            )
        }
        FilterFn::Brightness(f) => [r * f, g * f, b * f],
        FilterFn::Contrast(c) => {
            let off = 0.5 - 0.5 * c;
            [r * c + off, g * c + off, b * c + off]
        }
        FilterFn::Invert(amount) => {
            let a = amount.clamp(0.0, 1.0);
            [
                a * (1.0 - r) + (1.0 - a) * r,
                a * (1.0 - g) + (1.0 - a) * g,
                a * (1.0 - b) + (1.0 - a) * b,
            ]
        }
        FilterFn::Blur(_) => [r, g, b],
    };
    out.map(|c| c.clamp(0.0, 1.0))
}

fn mat3(m: [[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn to_u8(c: f32) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/assets/filter.rs"]
mod tests;
