// Preview surface: the document the resume template renders into.

pub mod document;
pub mod frame;

pub use document::{Element, Node, PreviewDocument};
pub use frame::{PreviewFrame, SurfaceError, LOADING_OPACITY};
