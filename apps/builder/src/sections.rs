//! Repeating Section Manager for education, experience and project entries.
//!
//! Entries carry a stable [`EntryId`] for their whole life. Preview ids are
//! derived from display position only when rendering: the first entry gets
//! the bare id (`degreePreview`), the Nth gets a numeric suffix
//! (`degreePreview2`, ...). Every render clears the group's container and
//! rebuilds all entries in order.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use resumecraft_common::{EducationEntry, ExperienceEntry, ProjectEntry};

use crate::markup::{write_plain_text, write_rich_text};
use crate::preview::{Element, Node, PreviewDocument, SurfaceError};

pub const ENTRY_ID_ATTR: &str = "data-entry-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupKind {
    Education,
    Experience,
    Projects,
}

impl GroupKind {
    pub const ALL: [GroupKind; 3] = [GroupKind::Education, GroupKind::Experience, GroupKind::Projects];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Degree,
    School,
    EduYears,
    JobTitle,
    Company,
    ExpYears,
    JobDescription,
    ProjectTitle,
    ProjectDescription,
}

impl EntryField {
    pub fn group(self) -> GroupKind {
        match self {
            EntryField::Degree | EntryField::School | EntryField::EduYears => GroupKind::Education,
            EntryField::JobTitle
            | EntryField::Company
            | EntryField::ExpYears
            | EntryField::JobDescription => GroupKind::Experience,
            EntryField::ProjectTitle | EntryField::ProjectDescription => GroupKind::Projects,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SectionError {
    #[error("position {position} is out of range for {group:?} ({len} entries)")]
    OutOfRange {
        group: GroupKind,
        position: usize,
        len: usize,
    },

    #[error("{group:?} entry {id} not found")]
    UnknownEntry { group: GroupKind, id: EntryId },

    #[error("field {field:?} does not belong to {group:?}")]
    WrongGroup { group: GroupKind, field: EntryField },
}

/// Preview id for `base` at display `position` (0-based).
pub fn preview_id(base: &str, position: usize) -> String {
    if position == 0 {
        format!("{base}Preview")
    } else {
        format!("{base}Preview{}", position + 1)
    }
}

fn text_node(tag: &str, id: String, value: &str) -> Element {
    let mut el = Element::new(tag).with_id(id);
    write_plain_text(&mut el, value);
    el
}

fn rich_node(id: String, value: &str) -> Element {
    let mut el = Element::new("div").with_class("description").with_id(id);
    write_rich_text(&mut el, value);
    el
}

/// An entry type that can live in a [`Section`].
pub trait SectionEntry: Clone + Default + fmt::Debug {
    const GROUP: GroupKind;

    /// Sets one sub-field; `false` if the field belongs to another group.
    fn set(&mut self, field: EntryField, value: String) -> bool;

    fn render(&self, position: usize) -> Element;
}

impl SectionEntry for EducationEntry {
    const GROUP: GroupKind = GroupKind::Education;

    fn set(&mut self, field: EntryField, value: String) -> bool {
        match field {
            EntryField::Degree => self.degree = value,
            EntryField::School => self.school = value,
            EntryField::EduYears => self.years = value,
            _ => return false,
        }
        true
    }

    fn render(&self, position: usize) -> Element {
        Element::new("div")
            .with_class("education-entry")
            .with_child(text_node("h3", preview_id("degree", position), &self.degree))
            .with_child(
                text_node("p", preview_id("school", position), &self.school)
                    .with_class("muted")
                    .with_class("sub"),
            )
            .with_child(
                text_node("p", preview_id("eduYears", position), &self.years)
                    .with_class("muted")
                    .with_class("sub"),
            )
    }
}

impl SectionEntry for ExperienceEntry {
    const GROUP: GroupKind = GroupKind::Experience;

    fn set(&mut self, field: EntryField, value: String) -> bool {
        match field {
            EntryField::JobTitle => self.job_title = value,
            EntryField::Company => self.company = value,
            EntryField::ExpYears => self.years = value,
            EntryField::JobDescription => self.description = value,
            _ => return false,
        }
        true
    }

    fn render(&self, position: usize) -> Element {
        Element::new("div")
            .with_class("experience-entry")
            .with_child(text_node("h3", preview_id("jobTitle", position), &self.job_title))
            .with_child(
                text_node("p", preview_id("company", position), &self.company)
                    .with_class("muted"),
            )
            .with_child(
                text_node("p", preview_id("expYears", position), &self.years)
                    .with_class("muted")
                    .with_class("sub"),
            )
            .with_child(rich_node(preview_id("jobDesc", position), &self.description))
    }
}

impl SectionEntry for ProjectEntry {
    const GROUP: GroupKind = GroupKind::Projects;

    fn set(&mut self, field: EntryField, value: String) -> bool {
        match field {
            EntryField::ProjectTitle => self.title = value,
            EntryField::ProjectDescription => self.description = value,
            _ => return false,
        }
        true
    }

    fn render(&self, position: usize) -> Element {
        Element::new("li")
            .with_class("project-entry")
            .with_child(text_node("strong", preview_id("projectTitle", position), &self.title))
            .with_child(rich_node(preview_id("projectDesc", position), &self.description))
    }
}

/// Ordered entries of one repeatable group. Order is on-screen order.
#[derive(Debug, Clone)]
pub struct Section<E> {
    entries: Vec<(EntryId, E)>,
    next_id: u64,
}

impl<E> Default for Section<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<E: SectionEntry> Section<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<E>) -> Self {
        let mut section = Self::new();
        section.replace_all(entries);
        section
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends a blank entry.
    pub fn add(&mut self) -> EntryId {
        self.push(E::default())
    }

    pub fn push(&mut self, entry: E) -> EntryId {
        let id = self.allocate_id();
        self.entries.push((id, entry));
        id
    }

    /// Inserts at `position` (0..=len); later entries shift down one place.
    pub fn insert(&mut self, position: usize, entry: E) -> Result<EntryId, SectionError> {
        if position > self.entries.len() {
            return Err(SectionError::OutOfRange {
                group: E::GROUP,
                position,
                len: self.entries.len(),
            });
        }
        let id = self.allocate_id();
        self.entries.insert(position, (id, entry));
        Ok(id)
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|(eid, _)| *eid == id)
    }

    pub fn remove(&mut self, id: EntryId) -> Result<E, SectionError> {
        let position = self.position(id).ok_or(SectionError::UnknownEntry {
            group: E::GROUP,
            id,
        })?;
        Ok(self.entries.remove(position).1)
    }

    pub fn remove_at(&mut self, position: usize) -> Result<E, SectionError> {
        if position >= self.entries.len() {
            return Err(SectionError::OutOfRange {
                group: E::GROUP,
                position,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(position).1)
    }

    pub fn update(&mut self, id: EntryId, field: EntryField, value: String) -> Result<(), SectionError> {
        let (_, entry) = self
            .entries
            .iter_mut()
            .find(|(eid, _)| *eid == id)
            .ok_or(SectionError::UnknownEntry {
                group: E::GROUP,
                id,
            })?;
        if entry.set(field, value) {
            Ok(())
        } else {
            Err(SectionError::WrongGroup {
                group: E::GROUP,
                field,
            })
        }
    }

    pub fn get(&self, id: EntryId) -> Option<&E> {
        self.entries.iter().find(|(eid, _)| *eid == id).map(|(_, e)| e)
    }

    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub fn values(&self) -> Vec<E> {
        self.entries.iter().map(|(_, e)| e.clone()).collect()
    }

    /// Replaces every entry; previously issued ids become invalid.
    pub fn replace_all(&mut self, entries: Vec<E>) {
        self.entries.clear();
        for entry in entries {
            self.push(entry);
        }
    }

    pub fn render(&self) -> Vec<Node> {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, (id, entry))| {
                let mut el = entry.render(position);
                el.set_attr(ENTRY_ID_ATTR, id.to_string());
                Node::Element(el)
            })
            .collect()
    }

    /// Clears `container_id` and rebuilds it from the current entries.
    pub fn render_into(&self, doc: &mut PreviewDocument, container_id: &str) -> Result<(), SurfaceError> {
        let container = doc
            .element_by_id_mut(container_id)
            .ok_or_else(|| SurfaceError::MissingElement(container_id.to_string()))?;
        container.replace_children(self.render());
        Ok(())
    }
}

/// Group-agnostic view of a section, used by the builder controller.
pub trait SectionOps {
    fn group(&self) -> GroupKind;
    fn len(&self) -> usize;
    fn add_blank(&mut self) -> EntryId;
    fn insert_blank(&mut self, position: usize) -> Result<EntryId, SectionError>;
    fn remove_entry(&mut self, id: EntryId) -> Result<(), SectionError>;
    fn update_entry(&mut self, id: EntryId, field: EntryField, value: String) -> Result<(), SectionError>;
    fn render_into(&self, doc: &mut PreviewDocument, container_id: &str) -> Result<(), SurfaceError>;
}

impl<E: SectionEntry> SectionOps for Section<E> {
    fn group(&self) -> GroupKind {
        E::GROUP
    }

    fn len(&self) -> usize {
        Section::len(self)
    }

    fn add_blank(&mut self) -> EntryId {
        self.add()
    }

    fn insert_blank(&mut self, position: usize) -> Result<EntryId, SectionError> {
        self.insert(position, E::default())
    }

    fn remove_entry(&mut self, id: EntryId) -> Result<(), SectionError> {
        self.remove(id).map(|_| ())
    }

    fn update_entry(&mut self, id: EntryId, field: EntryField, value: String) -> Result<(), SectionError> {
        self.update(id, field, value)
    }

    fn render_into(&self, doc: &mut PreviewDocument, container_id: &str) -> Result<(), SurfaceError> {
        Section::render_into(self, doc, container_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container_doc() -> PreviewDocument {
        PreviewDocument::new(
            "1",
            Element::new("section").with_child(Element::new("div").with_id("educationContainer")),
        )
    }

    fn degree(name: &str) -> EducationEntry {
        EducationEntry {
            degree: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_preview_id_suffix_rule() {
        assert_eq!(preview_id("degree", 0), "degreePreview");
        assert_eq!(preview_id("degree", 1), "degreePreview2");
        assert_eq!(preview_id("degree", 10), "degreePreview11");
    }

    #[test]
    fn test_remove_reindexes_by_new_position() {
        let mut section = Section::new();
        let ids: Vec<EntryId> = ["A", "B", "C", "D"].iter().map(|d| section.push(degree(d))).collect();

        // remove the 2nd entry (1-indexed k = 2)
        section.remove(ids[1]).unwrap();

        let mut doc = container_doc();
        section.render_into(&mut doc, "educationContainer").unwrap();
        let container = doc.element_by_id("educationContainer").unwrap();
        assert_eq!(container.child_elements().count(), 3);
        assert_eq!(doc.element_by_id("degreePreview").unwrap().text_content(), "A");
        assert_eq!(doc.element_by_id("degreePreview2").unwrap().text_content(), "C");
        assert_eq!(doc.element_by_id("degreePreview3").unwrap().text_content(), "D");
        assert!(doc.element_by_id("degreePreview4").is_none());
    }

    #[test]
    fn test_entry_ids_are_stable_across_removal() {
        let mut section: Section<EducationEntry> = Section::new();
        let a = section.add();
        let b = section.add();
        let c = section.add();
        section.remove(a).unwrap();
        assert_eq!(section.ids(), vec![b, c]);
        section.update(c, EntryField::School, "MIT".to_string()).unwrap();
        assert_eq!(section.get(c).unwrap().school, "MIT");
        assert_eq!(section.position(c), Some(1));
    }

    #[test]
    fn test_render_tags_entries_with_stable_ids() {
        let mut section: Section<EducationEntry> = Section::new();
        section.add();
        let second = section.add();
        section.remove_at(0).unwrap();
        let nodes = section.render();
        let Node::Element(el) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(el.attr(ENTRY_ID_ATTR), Some(second.to_string().as_str()));
        assert!(el.find_path("degreePreview").is_some());
    }

    #[test]
    fn test_insert_at_position() {
        let mut section = Section::with_entries(vec![degree("A"), degree("C")]);
        section.insert(1, degree("B")).unwrap();
        let names: Vec<String> = section.values().into_iter().map(|e| e.degree).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        section.insert(3, degree("D")).unwrap();
        assert_eq!(section.len(), 4);
    }

    #[test]
    fn test_insert_past_end_is_rejected() {
        let mut section: Section<EducationEntry> = Section::new();
        let err = section.insert(1, degree("X")).unwrap_err();
        assert_eq!(
            err,
            SectionError::OutOfRange {
                group: GroupKind::Education,
                position: 1,
                len: 0
            }
        );
    }

    #[test]
    fn test_update_rejects_foreign_field() {
        let mut section: Section<ProjectEntry> = Section::new();
        let id = section.add();
        assert!(matches!(
            section.update(id, EntryField::Degree, "x".to_string()),
            Err(SectionError::WrongGroup { .. })
        ));
    }

    #[test]
    fn test_experience_description_renders_bullets() {
        let entry = ExperienceEntry {
            job_title: "Engineer".to_string(),
            description: "Owned billing\n• Cut costs\n• Shipped v2".to_string(),
            ..Default::default()
        };
        let el = entry.render(1);
        let desc = el.at_path(&el.find_path("jobDescPreview2").unwrap()).unwrap();
        let mut items = Vec::new();
        desc.descendants_by_tag("li", &mut items);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text_content(), "Cut costs");
    }

    #[test]
    fn test_blank_entry_renders_blank_text() {
        let el = ProjectEntry::default().render(0);
        assert_eq!(el.text_content().trim(), "");
    }

    #[test]
    fn test_render_into_missing_container() {
        let section: Section<EducationEntry> = Section::new();
        let mut doc = PreviewDocument::new("1", Element::new("div"));
        assert_eq!(
            section.render_into(&mut doc, "educationContainer").unwrap_err(),
            SurfaceError::MissingElement("educationContainer".to_string())
        );
    }
}
