use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::warn;

use crate::templates::{TemplateDefinition, TemplateError};

/// Anything that can hand out template definitions by id.
pub trait TemplateSource: Send + Sync {
    fn load(&self, id: &str) -> Result<TemplateDefinition, TemplateError>;

    /// Ids this source can load, sorted.
    fn ids(&self) -> Vec<String>;
}

fn parse(requested: &str, json: &str) -> Result<TemplateDefinition, TemplateError> {
    let def: TemplateDefinition = serde_json::from_str(json).map_err(|e| TemplateError::Parse {
        id: requested.to_string(),
        source: e,
    })?;
    if def.manifest.id != requested {
        return Err(TemplateError::IdMismatch {
            requested: requested.to_string(),
            declared: def.manifest.id,
        });
    }
    Ok(def)
}

const BUILTIN: &[(&str, &str)] = &[
    ("1", include_str!("../../templates/template1.json")),
    ("2", include_str!("../../templates/template2.json")),
    ("3", include_str!("../../templates/template3.json")),
];

/// The three templates compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl TemplateSource for BuiltinTemplates {
    fn load(&self, id: &str) -> Result<TemplateDefinition, TemplateError> {
        let (_, json) = BUILTIN
            .iter()
            .find(|(builtin_id, _)| *builtin_id == id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        parse(id, json)
    }

    fn ids(&self) -> Vec<String> {
        BUILTIN.iter().map(|(id, _)| id.to_string()).collect()
    }
}

/// Templates stored as `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    dir: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TemplateSource for DirectoryTemplates {
    fn load(&self, id: &str) -> Result<TemplateDefinition, TemplateError> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(TemplateError::NotFound(id.to_string()));
        }
        let path = self.dir.join(format!("{id}.json"));
        let json = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TemplateError::NotFound(id.to_string()),
            _ => TemplateError::Io {
                id: id.to_string(),
                source: e,
            },
        })?;
        parse(id, &json)
    }

    fn ids(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list templates in {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };
        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        ids.sort();
        ids
    }
}
