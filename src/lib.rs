//! photobooth is the core of a photo booth: capture filters, a persisted gallery, and a
//! fixed-layout collage composition engine rendered on the CPU.
//!
//! # Pipeline overview
//!
//! 1. **Capture**: an encoded still is filtered ([`CaptureFilter`]), re-encoded as JPEG and stored
//!    at the front of a [`Gallery`].
//! 2. **Select**: a [`CollageSession`] snapshots the gallery, tracks an ordered, capped selection
//!    and the chosen [`Layout`].
//! 3. **Render**: the selection is decoded in parallel ([`decode_batch`]), laid out
//!    ([`compute_rects`]) and composited ([`Compositor`]) into a [`Surface`].
//! 4. **Deliver**: the result is exported as JPEG ([`Exporter`]) or saved back to the gallery.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Order preserving**: `placements[i]` always receives the `i`-th selected photo.
//! - **Premultiplied RGBA8** internally; encoders receive straight alpha.
//! - **Atomic renders**: a surface is only handed out once fully drawn, and a render job whose
//!   session moved on is discarded ([`BoothError::StaleRender`]).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;
mod gallery;
mod layout;
mod render;
mod session;

pub use assets::decode::{DecodedImage, MAX_DECODED_DIM, decode_batch, decode_image};
pub use assets::filter::{CaptureFilter, FilterFn, apply_filter, filter_raster};
pub use assets::raster::{EncodedRaster, encode_jpeg, encode_png};
pub use foundation::cancel::CancelToken;
pub use foundation::config::BoothConfig;
pub use foundation::core::{Canvas, Point, Rect, Rgba8};
pub use foundation::error::{BoothError, BoothResult};
pub use gallery::export::{
    DirExporter, Exporter, MemoryExporter, capture_filename, collage_filename, file_stamp,
    gallery_item_filename,
};
pub use gallery::store::{
    COLLAGE_FILTER, DEFAULT_CAPACITY, EntryId, FileGallery, Gallery, GalleryEntry, MemoryGallery,
    display_timestamp, now_local, now_ms,
};
pub use layout::engine::{
    Caption, Decoration, ItemCount, Layout, LayoutPlan, Placement, canvas_size, compute_rects,
    compute_rects_on,
};
pub use render::composite::{over, over_in_place};
pub use render::compositor::{
    Compositor, CompositorSettings, PLACEHOLDER_BACKGROUND, PLACEHOLDER_TEXT,
};
pub use render::surface::Surface;
pub use render::text::{fonts_available, rasterize_captions};
pub use session::capture::capture_still;
pub use session::collage::{
    CollageResult, CollageSession, Notice, NoticeLevel, RenderJob, RenderOutput, SessionState,
    SourceImage,
};
pub use session::selection::{Selection, Toggle};
