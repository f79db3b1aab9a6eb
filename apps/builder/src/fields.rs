//! Field Binder: static form fields written into single preview nodes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::markup::{write_plain_text, BLANK};
use crate::preview::{Element, PreviewDocument, SurfaceError};
use crate::templates::TemplateManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreviewField {
    FullName,
    Role,
    Email,
    Phone,
    Address,
    Summary,
    Skills,
}

impl PreviewField {
    pub const ALL: [PreviewField; 7] = [
        PreviewField::FullName,
        PreviewField::Role,
        PreviewField::Email,
        PreviewField::Phone,
        PreviewField::Address,
        PreviewField::Summary,
        PreviewField::Skills,
    ];
}

/// The control value after input transforms, with the caret to restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInput {
    pub value: String,
    pub cursor: usize,
}

/// Applies per-field input transforms. The role is forced upper-case; the
/// caret (a char offset) stays where it was, clamped to the new length.
pub fn normalize_input(field: PreviewField, raw: &str, cursor: usize) -> NormalizedInput {
    let value = match field {
        PreviewField::Role => raw.to_uppercase(),
        _ => raw.to_string(),
    };
    let cursor = cursor.min(value.chars().count());
    NormalizedInput { value, cursor }
}

/// Comma-delimited skills, trimmed, empties dropped.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Writes `value` into the node the template maps `field` to.
///
/// Returns `Ok(false)` when the template does not render the field.
pub fn write_field(
    doc: &mut PreviewDocument,
    manifest: &TemplateManifest,
    field: PreviewField,
    value: &str,
) -> Result<bool, SurfaceError> {
    let Some(id) = manifest.field_id(field) else {
        debug!("Template {} does not render {:?}", manifest.id, field);
        return Ok(false);
    };
    let target = doc
        .element_by_id_mut(id)
        .ok_or_else(|| SurfaceError::MissingElement(id.to_string()))?;

    match field {
        PreviewField::Skills => write_skills(target, value),
        _ => write_plain_text(target, value),
    }
    Ok(true)
}

fn write_skills(target: &mut Element, raw: &str) {
    let skills = split_skills(raw);
    if target.is_list() {
        target.replace_children(
            skills
                .into_iter()
                .map(|s| Element::new("li").with_text(s).into())
                .collect(),
        );
    } else if skills.is_empty() {
        target.set_text(BLANK);
    } else {
        target.set_text(skills.join(", "));
    }
}

/// Holds the monogram's initials while a photo covers it.
const MONOGRAM_TEXT_ATTR: &str = "data-monogram";

/// Propagates the profile image to the template's photo and monogram elements.
/// Returns how many elements were updated.
pub fn apply_profile_photo(
    doc: &mut PreviewDocument,
    manifest: &TemplateManifest,
    data_url: &str,
) -> usize {
    let mut updated = 0;
    for class in &manifest.photo_classes {
        doc.for_each_with_class_mut(class, &mut |el| {
            el.set_attr("src", data_url);
            updated += 1;
        });
    }
    doc.for_each_with_class_mut(&manifest.monogram_class, &mut |el| {
        if el.attr(MONOGRAM_TEXT_ATTR).is_none() {
            let initials = el.text_content();
            el.set_attr(MONOGRAM_TEXT_ATTR, initials);
        }
        el.set_style("background-image", format!("url({data_url})"));
        el.set_style("background-size", "cover");
        el.set_style("background-position", "center");
        el.clear_children();
        updated += 1;
    });
    updated
}

/// Undoes [`apply_profile_photo`]: photo sources are emptied and the
/// monogram gets its initials back. Returns how many elements were reset.
pub fn clear_profile_photo(doc: &mut PreviewDocument, manifest: &TemplateManifest) -> usize {
    let mut cleared = 0;
    for class in &manifest.photo_classes {
        doc.for_each_with_class_mut(class, &mut |el| {
            if el.attr("src").is_some_and(|src| !src.is_empty()) {
                el.set_attr("src", "");
                cleared += 1;
            }
        });
    }
    doc.for_each_with_class_mut(&manifest.monogram_class, &mut |el| {
        let had_photo = el.style.remove("background-image").is_some();
        el.style.remove("background-size");
        el.style.remove("background-position");
        if let Some(initials) = el.attributes.remove(MONOGRAM_TEXT_ATTR) {
            el.set_text(initials);
        }
        if had_photo {
            cleared += 1;
        }
    });
    cleared
}
