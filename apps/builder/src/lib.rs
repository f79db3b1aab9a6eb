//! ResumeCraft builder engine.
//!
//! A multi-step resume form kept in sync with a live preview document.
//! [`Builder`] owns the form state and pushes every change through the field
//! binder, the section renderer and a deferred visibility pass into the
//! preview; templates can be swapped at any time and the whole state is
//! replayed into the new document. Saves go to the resume API with a local
//! fallback.

pub mod builder;
pub mod config;
pub mod errors;
pub mod fields;
pub mod markup;
pub mod preview;
pub mod scheduler;
pub mod sections;
pub mod state;
pub mod store;
pub mod templates;
pub mod visibility;

pub use builder::Builder;
pub use config::BuilderConfig;
pub use errors::BuilderError;
pub use fields::PreviewField;
pub use sections::{EntryField, EntryId, GroupKind};
pub use state::FormState;
pub use store::{ResumeStore, SaveLocation, SaveOutcome};
