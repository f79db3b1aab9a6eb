//! The form state: single source of truth for everything the preview shows.

use chrono::{DateTime, Utc};
use thiserror::Error;

use resumecraft_common::{
    EducationEntry, ExperienceEntry, ProjectEntry, ResumeRecord, DEFAULT_TEMPLATE_ID,
};

use crate::fields::PreviewField;
use crate::sections::{GroupKind, Section, SectionOps};

pub const STEP_COUNT: u8 = 7;

#[derive(Debug, Error, PartialEq)]
#[error("step {0} is outside 1..={max}", max = STEP_COUNT)]
pub struct InvalidStep(pub u8);

#[derive(Debug, Clone)]
pub struct FormState {
    step: u8,
    pub full_name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub summary: String,
    pub skills: String,
    pub education: Section<EducationEntry>,
    pub experience: Section<ExperienceEntry>,
    pub projects: Section<ProjectEntry>,
    pub profile_photo: Option<String>,
    pub template_id: String,
    /// Set once the resume has been saved or loaded; later saves update it.
    pub record_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Default for FormState {
    fn default() -> Self {
        let mut education = Section::new();
        education.add();
        Self {
            step: 1,
            full_name: String::new(),
            role: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            summary: String::new(),
            skills: String::new(),
            education,
            experience: Section::new(),
            projects: Section::new(),
            profile_photo: None,
            template_id: DEFAULT_TEMPLATE_ID.to_string(),
            record_id: None,
            created_at: None,
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    // ──────────────────────────────────────────────
    // Step navigation
    // ──────────────────────────────────────────────

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn next_step(&mut self) -> u8 {
        self.step = (self.step + 1).min(STEP_COUNT);
        self.step
    }

    pub fn prev_step(&mut self) -> u8 {
        self.step = self.step.saturating_sub(1).max(1);
        self.step
    }

    pub fn go_to_step(&mut self, step: u8) -> Result<(), InvalidStep> {
        if !(1..=STEP_COUNT).contains(&step) {
            return Err(InvalidStep(step));
        }
        self.step = step;
        Ok(())
    }

    // ──────────────────────────────────────────────
    // Fields and groups
    // ──────────────────────────────────────────────

    pub fn field(&self, field: PreviewField) -> &str {
        match field {
            PreviewField::FullName => &self.full_name,
            PreviewField::Role => &self.role,
            PreviewField::Email => &self.email,
            PreviewField::Phone => &self.phone,
            PreviewField::Address => &self.address,
            PreviewField::Summary => &self.summary,
            PreviewField::Skills => &self.skills,
        }
    }

    pub fn set_field(&mut self, field: PreviewField, value: String) {
        let slot = match field {
            PreviewField::FullName => &mut self.full_name,
            PreviewField::Role => &mut self.role,
            PreviewField::Email => &mut self.email,
            PreviewField::Phone => &mut self.phone,
            PreviewField::Address => &mut self.address,
            PreviewField::Summary => &mut self.summary,
            PreviewField::Skills => &mut self.skills,
        };
        *slot = value;
    }

    pub fn section(&self, group: GroupKind) -> &dyn SectionOps {
        match group {
            GroupKind::Education => &self.education,
            GroupKind::Experience => &self.experience,
            GroupKind::Projects => &self.projects,
        }
    }

    pub fn section_mut(&mut self, group: GroupKind) -> &mut dyn SectionOps {
        match group {
            GroupKind::Education => &mut self.education,
            GroupKind::Experience => &mut self.experience,
            GroupKind::Projects => &mut self.projects,
        }
    }

    // ──────────────────────────────────────────────
    // Record conversion
    // ──────────────────────────────────────────────

    /// Assembles a record for saving. Entries with every sub-field empty are
    /// dropped and the legacy education fields mirror the first entry.
    pub fn to_record(&self) -> ResumeRecord {
        let mut record = ResumeRecord {
            id: self.record_id.clone(),
            full_name: self.full_name.clone(),
            role: self.role.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            education: self
                .education
                .values()
                .into_iter()
                .filter(|e| !e.is_blank())
                .collect(),
            experience: self
                .experience
                .values()
                .into_iter()
                .filter(|e| !e.is_blank())
                .collect(),
            projects: self
                .projects
                .values()
                .into_iter()
                .filter(|e| !e.is_blank())
                .collect(),
            skills: self.skills.clone(),
            summary: self.summary.clone(),
            profile_photo_data: self.profile_photo.clone(),
            template_id: self.template_id.clone(),
            created_at: self.created_at,
            ..Default::default()
        };
        record.sync_legacy_education();
        record
    }

    /// Replaces the whole state with `record`. Education falls back to the
    /// legacy fields, and always keeps at least one (blank) entry.
    pub fn apply_record(&mut self, record: &ResumeRecord) {
        let mut education = record.education_entries();
        if education.is_empty() {
            education.push(EducationEntry::default());
        }
        *self = Self {
            step: self.step,
            full_name: record.full_name.clone(),
            role: record.role.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            address: record.address.clone(),
            summary: record.summary.clone(),
            skills: record.skills.clone(),
            education: Section::with_entries(education),
            experience: Section::with_entries(record.experience.clone()),
            projects: Section::with_entries(record.projects.clone()),
            profile_photo: record.profile_photo_data.clone().filter(|p| !p.is_empty()),
            template_id: record.template_id.clone(),
            record_id: record.id.clone(),
            created_at: record.created_at,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::EntryField;

    #[test]
    fn test_new_state_has_one_education_entry() {
        let state = FormState::new();
        assert_eq!(state.education.len(), 1);
        assert_eq!(state.step(), 1);
        assert_eq!(state.template_id, "1");
    }

    #[test]
    fn test_step_navigation_is_bounded() {
        let mut state = FormState::new();
        assert_eq!(state.prev_step(), 1);
        for _ in 0..10 {
            state.next_step();
        }
        assert_eq!(state.step(), STEP_COUNT);
        assert_eq!(state.go_to_step(0), Err(InvalidStep(0)));
        assert_eq!(state.go_to_step(8), Err(InvalidStep(8)));
        state.go_to_step(3).unwrap();
        assert_eq!(state.prev_step(), 2);
    }

    #[test]
    fn test_to_record_skips_blank_entries() {
        let mut state = FormState::new();
        let first = state.education.ids()[0];
        state.education.add();
        state
            .education
            .update(first, EntryField::Degree, "BSc".to_string())
            .unwrap();
        state.experience.add();

        let record = state.to_record();
        assert_eq!(record.education.len(), 1);
        assert!(record.experience.is_empty());
        assert_eq!(record.degree, "BSc");
    }

    #[test]
    fn test_apply_record_seeds_legacy_education() {
        let record = ResumeRecord {
            id: Some("r1".to_string()),
            full_name: "Jane".to_string(),
            school: "MIT".to_string(),
            template_id: "2".to_string(),
            ..Default::default()
        };
        let mut state = FormState::new();
        state.go_to_step(4).unwrap();
        state.apply_record(&record);
        assert_eq!(state.education.values()[0].school, "MIT");
        assert_eq!(state.record_id.as_deref(), Some("r1"));
        assert_eq!(state.template_id, "2");
        assert_eq!(state.step(), 4);
    }

    #[test]
    fn test_section_ops_dispatch() {
        let mut state = FormState::new();
        let id = state.section_mut(GroupKind::Projects).add_blank();
        state
            .section_mut(GroupKind::Projects)
            .update_entry(id, EntryField::ProjectTitle, "Site".to_string())
            .unwrap();
        assert_eq!(state.section(GroupKind::Projects).len(), 1);
        assert_eq!(state.projects.values()[0].title, "Site");
    }

    #[test]
    fn test_field_accessors() {
        let mut state = FormState::new();
        state.set_field(PreviewField::Skills, "Go".to_string());
        assert_eq!(state.field(PreviewField::Skills), "Go");
    }
}
