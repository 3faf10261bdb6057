use std::sync::OnceLock;

use time::OffsetDateTime;

use crate::{
    assets::{
        decode::decode_batch,
        raster::EncodedRaster,
    },
    foundation::{
        cancel::CancelToken,
        config::BoothConfig,
        core::Canvas,
        error::{BoothError, BoothResult},
    },
    gallery::{
        export::{Exporter, collage_filename},
        store::{EntryId, Gallery, GalleryEntry, now_local},
    },
    layout::engine::{Layout, compute_rects, compute_rects_on},
    render::{compositor::Compositor, surface::Surface},
    session::selection::{Selection, Toggle},
};

/// Collage authoring states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No authoring in progress.
    #[default]
    Idle,
    /// Picking photos; layout is still the default.
    PhotoSelectionOpen,
    /// A layout has been picked explicitly.
    LayoutChosen,
    /// A render job is in flight.
    Rendering,
    /// A collage result is held.
    Rendered,
    /// The held result has been exported at least once.
    Downloaded,
    /// The result went to the gallery; the session is finished.
    SavedToGallery,
    /// Dismissed without saving.
    Closed,
}

impl SessionState {
    fn holds_result(self) -> bool {
        matches!(self, Self::Rendered | Self::Downloaded)
    }

    fn is_selecting(self) -> bool {
        matches!(self, Self::PhotoSelectionOpen | Self::LayoutChosen)
    }
}

/// Severity of a [`Notice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Something finished.
    Success,
    /// Something was refused or failed.
    Error,
}

/// Transient, dismissible message for the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Display text.
    pub message: String,
}

/// Gallery photo fed into a collage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    /// Gallery id.
    pub id: EntryId,
    /// Encoded image bytes.
    pub raster: EncodedRaster,
}

impl SourceImage {
    /// Build from a stored entry, decoding its data URI.
    pub fn from_entry(entry: &GalleryEntry) -> BoothResult<Self> {
        let raster = entry
            .raster()
            .map_err(|e| BoothError::decode(format!("gallery entry {}: {e}", entry.id)))?;
        Ok(Self {
            id: entry.id,
            raster,
        })
    }
}

/// Immutable output of one composition pass.
#[derive(Debug)]
pub struct CollageResult {
    surface: Surface,
    layout: Layout,
    source_count: usize,
    created_at: OffsetDateTime,
    jpeg_quality: u8,
    jpeg: OnceLock<EncodedRaster>,
}

impl CollageResult {
    /// Rendered pixels.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Layout the collage was rendered with.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Number of selected photos (including any the layout did not place).
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    /// Render completion time.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// JPEG encoding, computed on first use and cached.
    pub fn jpeg(&self) -> BoothResult<&EncodedRaster> {
        if let Some(jpeg) = self.jpeg.get() {
            return Ok(jpeg);
        }
        let encoded = self.surface.encode_jpeg(self.jpeg_quality)?;
        Ok(self.jpeg.get_or_init(|| encoded))
    }
}

/// Detached decode-and-composite work for one render attempt.
///
/// Created by [`CollageSession::begin_render`]; its output goes back through
/// [`CollageSession::finish_render`], which discards it if the session moved on meanwhile.
#[derive(Debug)]
pub struct RenderJob {
    generation: u64,
    layout: Layout,
    entries: Vec<GalleryEntry>,
    compositor: Compositor,
    caption_date: Option<time::Date>,
    decode_threads: Option<usize>,
    jpeg_quality: u8,
}

impl RenderJob {
    /// Session generation this job belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run to completion, or until `cancel` fires.
    #[tracing::instrument(skip_all, fields(generation = self.generation, layout = %self.layout, count = self.entries.len()))]
    pub fn run(self, cancel: &CancelToken) -> RenderOutput {
        let generation = self.generation;
        let outcome = self.execute(cancel);
        if let Err(e) = &outcome {
            tracing::debug!(error = %e, "render job failed");
        }
        RenderOutput {
            generation,
            outcome,
        }
    }

    fn execute(self, cancel: &CancelToken) -> BoothResult<CollageResult> {
        cancel.check()?;
        let sources = self
            .entries
            .iter()
            .map(SourceImage::from_entry)
            .collect::<BoothResult<Vec<_>>>()?;
        let rasters: Vec<EncodedRaster> = sources.into_iter().map(|s| s.raster).collect();
        let decoded = decode_batch(&rasters, cancel, self.decode_threads)?;

        let plan = match self.caption_date {
            Some(date) => compute_rects_on(self.layout, decoded.len(), date)?,
            None => compute_rects(self.layout, decoded.len())?,
        };
        cancel.check()?;
        let surface = self.compositor.render(&plan, &decoded)?;
        cancel.check()?;

        Ok(CollageResult {
            surface,
            layout: self.layout,
            source_count: self.entries.len(),
            created_at: now_local(),
            jpeg_quality: self.jpeg_quality,
            jpeg: OnceLock::new(),
        })
    }
}

/// What a [`RenderJob`] produced, tagged with its generation.
#[derive(Debug)]
pub struct RenderOutput {
    generation: u64,
    outcome: BoothResult<CollageResult>,
}

impl RenderOutput {
    /// Generation of the job that produced this output.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` when the job succeeded.
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// One collage authoring interaction: selection, layout, render, then download or save.
#[derive(Debug)]
pub struct CollageSession {
    state: SessionState,
    pre_render: SessionState,
    layout: Layout,
    selection: Selection,
    snapshot: Vec<GalleryEntry>,
    result: Option<CollageResult>,
    generation: u64,
    notices: Vec<Notice>,
    min_photos: usize,
    jpeg_quality: u8,
    decode_threads: Option<usize>,
    compositor: Compositor,
    caption_date: Option<time::Date>,
}

impl CollageSession {
    /// Idle session using the limits from `config`.
    pub fn new(config: &BoothConfig) -> Self {
        Self {
            state: SessionState::Idle,
            pre_render: SessionState::Idle,
            layout: Layout::default(),
            selection: Selection::new(config.max_selection),
            snapshot: Vec::new(),
            result: None,
            generation: 0,
            notices: Vec::new(),
            min_photos: config.min_photos,
            jpeg_quality: config.jpeg_quality,
            decode_threads: config.decode_threads,
            compositor: Compositor::default(),
            caption_date: None,
        }
    }

    /// Replace the compositor used by future renders.
    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    /// Caption polaroid cards with `date` instead of today.
    pub fn with_caption_date(mut self, date: time::Date) -> Self {
        self.caption_date = Some(date);
        self
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current layout.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Preview canvas: the held result's canvas, else the layout's nominal size.
    pub fn canvas_size(&self) -> Canvas {
        match &self.result {
            Some(r) => r.surface().canvas(),
            None => self.layout.canvas_size(),
        }
    }

    /// Selected ids in selection order.
    pub fn selection(&self) -> &[EntryId] {
        self.selection.ids()
    }

    /// 1-based badge number of `id`, if selected.
    pub fn selection_position(&self, id: EntryId) -> Option<usize> {
        self.selection.position(id)
    }

    /// Gallery entries captured when the session opened.
    pub fn candidates(&self) -> &[GalleryEntry] {
        &self.snapshot
    }

    /// Held collage, if any.
    pub fn result(&self) -> Option<&CollageResult> {
        self.result.as_ref()
    }

    /// Drain pending notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Start authoring from the photos currently in `gallery`.
    #[tracing::instrument(skip_all)]
    pub fn open<G: Gallery + ?Sized>(&mut self, gallery: &G) -> BoothResult<()> {
        self.expect_state(&[SessionState::Idle], "open")?;
        let available = gallery.len();
        if available < self.min_photos {
            self.notify_error(format!(
                "You need at least {} photos to create a collage!",
                self.min_photos
            ));
            return Err(BoothError::InsufficientPhotos {
                available,
                required: self.min_photos,
            });
        }

        self.snapshot = gallery.entries().to_vec();
        self.selection.clear();
        self.layout = Layout::default();
        self.result = None;
        self.set_state(SessionState::PhotoSelectionOpen);
        Ok(())
    }

    /// Select or deselect one gallery photo.
    #[tracing::instrument(skip(self))]
    pub fn toggle(&mut self, id: EntryId) -> BoothResult<Toggle> {
        if !self.state.is_selecting() {
            return Err(self.wrong_state("toggle"));
        }
        if !self.snapshot.iter().any(|e| e.id == id) {
            return Err(BoothError::invalid_selection(format!(
                "photo {id} is not in the gallery"
            )));
        }
        match self.selection.toggle(id) {
            Ok(t) => {
                tracing::debug!(?t, selected = self.selection.len(), "selection changed");
                Ok(t)
            }
            Err(e) => {
                self.notify_error(format!(
                    "Maximum {} photos can be selected for a collage!",
                    self.selection.limit()
                ));
                Err(e)
            }
        }
    }

    /// Switch layout; any held result is discarded.
    #[tracing::instrument(skip(self))]
    pub fn choose_layout(&mut self, layout: Layout) -> BoothResult<()> {
        if !(self.state.is_selecting() || self.state.holds_result()) {
            return Err(self.wrong_state("choose a layout"));
        }
        self.layout = layout;
        self.result = None;
        self.set_state(SessionState::LayoutChosen);
        Ok(())
    }

    /// Snapshot the selection into a detached [`RenderJob`] and enter `Rendering`.
    #[tracing::instrument(skip(self))]
    pub fn begin_render(&mut self) -> BoothResult<RenderJob> {
        if !(self.state.is_selecting() || self.state.holds_result()) {
            return Err(self.wrong_state("render"));
        }
        if self.selection.is_empty() {
            self.notify_error("Please select at least one photo!");
            return Err(BoothError::EmptySelection);
        }

        let mut entries = Vec::with_capacity(self.selection.len());
        for &id in self.selection.ids() {
            let entry = self.snapshot.iter().find(|e| e.id == id).ok_or_else(|| {
                BoothError::invalid_selection(format!("photo {id} is not in the gallery"))
            })?;
            entries.push(entry.clone());
        }

        self.generation += 1;
        self.pre_render = self.state;
        self.set_state(SessionState::Rendering);
        Ok(RenderJob {
            generation: self.generation,
            layout: self.layout,
            entries,
            compositor: self.compositor.clone(),
            caption_date: self.caption_date,
            decode_threads: self.decode_threads,
            jpeg_quality: self.jpeg_quality,
        })
    }

    /// Apply a job's output.
    ///
    /// Output from a superseded job fails with [`BoothError::StaleRender`] and changes nothing.
    /// A failed job restores the state from before [`Self::begin_render`] (including any
    /// previously held result) and surfaces the cause wrapped in [`BoothError::Render`].
    #[tracing::instrument(skip_all, fields(generation = output.generation))]
    pub fn finish_render(&mut self, output: RenderOutput) -> BoothResult<()> {
        if output.generation != self.generation || self.state != SessionState::Rendering {
            tracing::debug!(current = self.generation, "discarding stale render output");
            return Err(BoothError::StaleRender);
        }
        match output.outcome {
            Ok(result) => {
                tracing::debug!(
                    width = result.surface().width(),
                    height = result.surface().height(),
                    "collage rendered"
                );
                self.result = Some(result);
                self.set_state(SessionState::Rendered);
                self.notify_success("Collage generated successfully!");
                Ok(())
            }
            Err(cause) => {
                self.set_state(self.pre_render);
                self.notify_error("Error generating collage!");
                Err(BoothError::render(cause))
            }
        }
    }

    /// [`Self::begin_render`], [`RenderJob::run`] and [`Self::finish_render`] in one call.
    pub fn render(&mut self, cancel: &CancelToken) -> BoothResult<&CollageResult> {
        let job = self.begin_render()?;
        let output = job.run(cancel);
        self.finish_render(output)?;
        self.result
            .as_ref()
            .ok_or_else(|| BoothError::invalid_state("render finished without a result"))
    }

    /// Export the held collage as JPEG; returns the filename used.
    #[tracing::instrument(skip_all)]
    pub fn download<E: Exporter + ?Sized>(&mut self, exporter: &mut E) -> BoothResult<String> {
        let Some(result) = self.result.as_ref().filter(|_| self.state.holds_result()) else {
            return Err(self.wrong_state("download"));
        };
        let filename = collage_filename(OffsetDateTime::now_utc())?;
        exporter.export(result.jpeg()?, &filename)?;
        tracing::info!(%filename, "collage downloaded");
        self.set_state(SessionState::Downloaded);
        self.notify_success("Collage downloaded!");
        Ok(filename)
    }

    /// Store the held collage in `gallery` and finish the session.
    #[tracing::instrument(skip_all)]
    pub fn save_to_gallery<G: Gallery + ?Sized>(&mut self, gallery: &mut G) -> BoothResult<EntryId> {
        let Some(result) = self.result.as_ref().filter(|_| self.state.holds_result()) else {
            return Err(self.wrong_state("save to the gallery"));
        };
        let id = gallery.next_id();
        let entry = GalleryEntry::collage(
            id,
            result.jpeg()?,
            result.layout(),
            result.source_count(),
            result.created_at(),
        )?;
        gallery.append(entry)?;
        tracing::info!(id, "collage saved to gallery");

        self.discard();
        self.set_state(SessionState::SavedToGallery);
        self.notify_success("Collage added to gallery!");
        Ok(id)
    }

    /// Dismiss the session; the selection and any result are dropped.
    #[tracing::instrument(skip(self))]
    pub fn close(&mut self) {
        self.discard();
        self.set_state(SessionState::Closed);
    }

    /// Return to `Idle` with default layout and nothing selected.
    #[tracing::instrument(skip(self))]
    pub fn reset(&mut self) {
        self.discard();
        self.snapshot.clear();
        self.layout = Layout::default();
        self.set_state(SessionState::Idle);
    }

    fn discard(&mut self) {
        // Invalidates any in-flight job.
        self.generation += 1;
        self.selection.clear();
        self.result = None;
    }

    fn set_state(&mut self, next: SessionState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "session state");
        }
        self.state = next;
    }

    fn expect_state(&self, allowed: &[SessionState], action: &str) -> BoothResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.wrong_state(action))
        }
    }

    fn wrong_state(&self, action: &str) -> BoothError {
        BoothError::invalid_state(format!("cannot {action} while {:?}", self.state))
    }

    fn notify_success(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        });
    }

    fn notify_error(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/collage.rs"]
mod tests;
