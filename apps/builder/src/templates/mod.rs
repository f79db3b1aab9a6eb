//! Template Loader: resume templates, their manifests and where they come from.

pub mod loader;
pub mod manifest;
pub mod source;

use thiserror::Error;

pub use loader::TemplateLoader;
pub use manifest::{TemplateDefinition, TemplateManifest};
pub use source::{BuiltinTemplates, DirectoryTemplates, TemplateSource};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template '{0}' not found")]
    NotFound(String),

    #[error("template '{id}' is not valid JSON: {source}")]
    Parse {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read template '{id}': {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template '{requested}' declares id '{declared}'")]
    IdMismatch { requested: String, declared: String },

    #[error("template '{template}' contains duplicate element id '{id}'")]
    DuplicateId { template: String, id: String },

    #[error("template '{template}' maps to missing element '{id}'")]
    UnknownElement { template: String, id: String },
}

/// Accepts both `"2"` and `"template2"`.
pub fn normalize_template_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_prefix("template") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => trimmed.to_string(),
    }
}
