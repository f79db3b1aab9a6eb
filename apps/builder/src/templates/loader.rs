use tracing::{error, info};

use crate::preview::PreviewFrame;
use crate::templates::{
    normalize_template_id, BuiltinTemplates, TemplateDefinition, TemplateError, TemplateManifest,
    TemplateSource,
};

/// Resolves template ids to validated definitions and tracks the active manifest.
///
/// Loading is split in two: `prepare` resolves and validates (a bad template
/// is refused while the current surface is still intact), `activate` installs
/// the document into the frame once the fade has run.
pub struct TemplateLoader {
    source: Box<dyn TemplateSource>,
    active: Option<TemplateManifest>,
}

impl TemplateLoader {
    pub fn new(source: Box<dyn TemplateSource>) -> Self {
        Self {
            source,
            active: None,
        }
    }

    pub fn builtin() -> Self {
        Self::new(Box::new(BuiltinTemplates))
    }

    pub fn prepare(&self, raw_id: &str) -> Result<TemplateDefinition, TemplateError> {
        let id = normalize_template_id(raw_id);
        let def = self
            .source
            .load(&id)
            .and_then(|def| def.validate().map(|_| def))
            .map_err(|e| {
                error!("Refusing template {}: {}", id, e);
                e
            })?;
        Ok(def)
    }

    pub fn activate(&mut self, def: TemplateDefinition, frame: &mut PreviewFrame) {
        let (manifest, doc) = def.into_parts();
        info!("Template {} ({}) loaded", manifest.id, manifest.name);
        frame.finish_loading(doc);
        self.active = Some(manifest);
    }

    pub fn manifest(&self) -> Option<&TemplateManifest> {
        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|m| m.id.as_str())
    }

    pub fn available(&self) -> Vec<String> {
        self.source.ids()
    }
}
