use thiserror::Error;

use crate::preview::SurfaceError;
use crate::sections::SectionError;
use crate::state::InvalidStep;
use crate::store::{RemoteError, StoreError};
use crate::templates::TemplateError;

/// Every failure a builder operation can report to its host.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Section(#[from] SectionError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Step(#[from] InvalidStep),
}
