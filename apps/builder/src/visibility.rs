//! Visibility Collapser: hides the enclosing section of every empty region.

use tracing::debug;

use crate::fields::PreviewField;
use crate::preview::{Element, PreviewDocument};
use crate::sections::GroupKind;
use crate::templates::TemplateManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Name,
    Role,
    Summary,
    Skills,
    Education,
    Experience,
    Projects,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Name,
        Region::Role,
        Region::Summary,
        Region::Skills,
        Region::Education,
        Region::Experience,
        Region::Projects,
    ];

    /// Tag of the ancestor hidden when the region is empty.
    pub fn ancestor_tag(self) -> &'static str {
        match self {
            Region::Name | Region::Role => "header",
            _ => "section",
        }
    }

    fn is_container(self) -> bool {
        matches!(self, Region::Education | Region::Experience | Region::Projects)
    }

    fn element_id(self, manifest: &TemplateManifest) -> Option<&str> {
        match self {
            Region::Name => manifest.field_id(PreviewField::FullName),
            Region::Role => manifest.field_id(PreviewField::Role),
            Region::Summary => manifest.field_id(PreviewField::Summary),
            Region::Skills => manifest.field_id(PreviewField::Skills),
            Region::Education => manifest.group_id(GroupKind::Education),
            Region::Experience => manifest.group_id(GroupKind::Experience),
            Region::Projects => manifest.group_id(GroupKind::Projects),
        }
    }
}

fn has_content(region: Region, el: &Element) -> bool {
    if region.is_container() || el.is_list() {
        el.child_elements().any(|child| !child.text_content().trim().is_empty())
    } else {
        !el.text_content().trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilityReport {
    pub hidden: Vec<Region>,
    pub shown: Vec<Region>,
    pub skipped: Vec<Region>,
}

/// One pass over every known region. Idempotent.
///
/// Regions that share an ancestor (name and role in one header) keep it
/// visible as long as any of them has content.
pub fn collapse_empty_sections(doc: &mut PreviewDocument, manifest: &TemplateManifest) -> VisibilityReport {
    let mut report = VisibilityReport::default();
    let mut ancestors: Vec<(Vec<usize>, bool, Vec<Region>)> = Vec::new();

    for region in Region::ALL {
        let Some(id) = region.element_id(manifest) else {
            report.skipped.push(region);
            continue;
        };
        let Some(el) = doc.element_by_id(id) else {
            debug!("Region {:?} element '{}' missing from template {}", region, id, manifest.id);
            report.skipped.push(region);
            continue;
        };
        let filled = has_content(region, el);
        let Some(path) = doc.section_path(id, region.ancestor_tag()) else {
            report.skipped.push(region);
            continue;
        };
        match ancestors.iter_mut().find(|(p, _, _)| *p == path) {
            Some((_, any_filled, regions)) => {
                *any_filled |= filled;
                regions.push(region);
            }
            None => ancestors.push((path, filled, vec![region])),
        }
    }

    for (path, filled, regions) in ancestors {
        if let Some(el) = doc.element_at_mut(&path) {
            el.set_hidden(!filled);
        }
        if filled {
            report.shown.extend(regions);
        } else {
            report.hidden.extend(regions);
        }
    }
    report
}
