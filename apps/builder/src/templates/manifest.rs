use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::fields::PreviewField;
use crate::preview::{Element, PreviewDocument};
use crate::sections::GroupKind;
use crate::templates::TemplateError;

fn default_photo_classes() -> Vec<String> {
    vec!["avatar".to_string(), "photo".to_string()]
}

fn default_monogram_class() -> String {
    "monogram".to_string()
}

/// Where a template renders each piece of form state.
///
/// Fields and groups missing from the maps are simply not rendered by the
/// template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateManifest {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<PreviewField, String>,
    #[serde(default)]
    pub groups: BTreeMap<GroupKind, String>,
    #[serde(default = "default_photo_classes")]
    pub photo_classes: Vec<String>,
    #[serde(default = "default_monogram_class")]
    pub monogram_class: String,
}

impl TemplateManifest {
    pub fn field_id(&self, field: PreviewField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn group_id(&self, group: GroupKind) -> Option<&str> {
        self.groups.get(&group).map(String::as_str)
    }

    fn declared_ids(&self) -> impl Iterator<Item = &str> {
        self.fields
            .values()
            .chain(self.groups.values())
            .map(String::as_str)
    }
}

/// A template as shipped: its manifest plus the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub manifest: TemplateManifest,
    pub layout: Element,
}

impl TemplateDefinition {
    /// Layout ids must be unique and every id the manifest declares must exist.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let mut ids = Vec::new();
        self.layout.collect_ids(&mut ids);

        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                return Err(TemplateError::DuplicateId {
                    template: self.manifest.id.clone(),
                    id: id.to_string(),
                });
            }
        }

        if let Some(missing) = self.manifest.declared_ids().find(|id| !seen.contains(id)) {
            return Err(TemplateError::UnknownElement {
                template: self.manifest.id.clone(),
                id: missing.to_string(),
            });
        }
        Ok(())
    }

    pub fn into_parts(self) -> (TemplateManifest, PreviewDocument) {
        let doc = PreviewDocument::new(self.manifest.id.clone(), self.layout);
        (self.manifest, doc)
    }
}
