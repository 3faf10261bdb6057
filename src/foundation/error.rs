/// Convenience result type used across photobooth.
pub type BoothResult<T> = Result<T, BoothError>;

/// Error taxonomy for the collage engine, session and collaborators.
///
/// Every variant is recoverable: callers surface it as a transient notice and keep going.
#[derive(thiserror::Error, Debug)]
pub enum BoothError {
    /// Item count or selected id is not usable (zero, negative, non-integer, unknown id).
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// Layout identifier outside the fixed layout set.
    #[error("unknown layout '{0}'")]
    UnknownLayout(String),

    /// Payload is not a supported raster encoding.
    #[error("decode error: {0}")]
    Decode(String),

    /// Gallery holds fewer photos than a collage needs.
    #[error("need at least {required} photos to create a collage, gallery has {available}")]
    InsufficientPhotos {
        /// Photos currently in the gallery.
        available: usize,
        /// Minimum photos required.
        required: usize,
    },

    /// Selection is already at capacity.
    #[error("maximum {limit} photos can be selected for a collage")]
    SelectionLimitExceeded {
        /// Selection capacity.
        limit: usize,
    },

    /// Render requested with nothing selected.
    #[error("select at least one photo before rendering")]
    EmptySelection,

    /// A render attempt failed; wraps the decode or compositor error that caused it.
    #[error("render error: {0}")]
    Render(Box<BoothError>),

    /// Operation not valid in the session's current state.
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// Work was abandoned through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// Render output belongs to a session generation that no longer exists.
    #[error("render output is stale and was discarded")]
    StaleRender,

    /// Gallery persistence failures.
    #[error("gallery error: {0}")]
    Gallery(String),

    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BoothError {
    /// Build a [`BoothError::InvalidSelection`] value.
    pub fn invalid_selection(msg: impl Into<String>) -> Self {
        Self::InvalidSelection(msg.into())
    }

    /// Build a [`BoothError::UnknownLayout`] value.
    pub fn unknown_layout(id: impl Into<String>) -> Self {
        Self::UnknownLayout(id.into())
    }

    /// Build a [`BoothError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`BoothError::InvalidState`] value.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Build a [`BoothError::Gallery`] value.
    pub fn gallery(msg: impl Into<String>) -> Self {
        Self::Gallery(msg.into())
    }

    /// Build a [`BoothError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap `cause` as a [`BoothError::Render`].
    ///
    /// Cancellation and staleness are passed through unchanged so callers can tell an abandoned
    /// render from a failed one.
    pub fn render(cause: BoothError) -> Self {
        match cause {
            Self::Cancelled | Self::StaleRender | Self::Render(_) => cause,
            other => Self::Render(Box::new(other)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
