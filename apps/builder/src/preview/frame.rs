use thiserror::Error;

use crate::preview::document::PreviewDocument;

/// Opacity applied while a template is loading, masking the blank document.
pub const LOADING_OPACITY: f32 = 0.01;

#[derive(Debug, Error, PartialEq)]
pub enum SurfaceError {
    #[error("preview surface has no document loaded")]
    NotLoaded,

    #[error("preview surface is loading template {0}")]
    Loading(String),

    #[error("preview element '{0}' not found")]
    MissingElement(String),
}

#[derive(Debug)]
enum FrameState {
    Empty,
    Loading { template_id: String },
    Ready(PreviewDocument),
}

/// The isolated surface the resume template renders into.
///
/// Access to the document can fail (nothing loaded yet, or a template swap in
/// progress); callers log and skip rather than propagate.
#[derive(Debug)]
pub struct PreviewFrame {
    state: FrameState,
    opacity: f32,
}

impl Default for PreviewFrame {
    fn default() -> Self {
        Self {
            state: FrameState::Empty,
            opacity: 1.0,
        }
    }
}

impl PreviewFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FrameState::Loading { .. })
    }

    /// Fades out and drops the current document until `finish_loading`.
    pub fn begin_loading(&mut self, template_id: &str) {
        self.opacity = LOADING_OPACITY;
        self.state = FrameState::Loading {
            template_id: template_id.to_string(),
        };
    }

    pub fn finish_loading(&mut self, document: PreviewDocument) {
        self.state = FrameState::Ready(document);
    }

    pub fn document(&self) -> Result<&PreviewDocument, SurfaceError> {
        match &self.state {
            FrameState::Ready(doc) => Ok(doc),
            FrameState::Loading { template_id } => Err(SurfaceError::Loading(template_id.clone())),
            FrameState::Empty => Err(SurfaceError::NotLoaded),
        }
    }

    pub fn document_mut(&mut self) -> Result<&mut PreviewDocument, SurfaceError> {
        match &mut self.state {
            FrameState::Ready(doc) => Ok(doc),
            FrameState::Loading { template_id } => Err(SurfaceError::Loading(template_id.clone())),
            FrameState::Empty => Err(SurfaceError::NotLoaded),
        }
    }
}
