//! The builder controller: owns the form state and drives every preview write.

use std::sync::Arc;

use anyhow::Context;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::BuilderConfig;
use crate::errors::BuilderError;
use crate::fields::{self, normalize_input, NormalizedInput, PreviewField};
use crate::preview::{PreviewDocument, PreviewFrame, SurfaceError};
use crate::scheduler::{
    DeferredQueue, DeferredTask, REPLAY_DELAY, TEMPLATE_FADE_DELAY, VISIBILITY_DELAY,
};
use crate::sections::{EntryField, EntryId, GroupKind};
use crate::state::FormState;
use crate::store::{
    FileStorage, HttpResumeApi, KeyValueStorage, ResumeApi, ResumeStore, SaveOutcome,
};
use crate::templates::{
    normalize_template_id, DirectoryTemplates, TemplateDefinition, TemplateLoader,
};
use crate::visibility::{collapse_empty_sections, VisibilityReport};

pub struct Builder<S> {
    state: FormState,
    frame: PreviewFrame,
    templates: TemplateLoader,
    queue: DeferredQueue,
    store: ResumeStore<S>,
}

impl Builder<FileStorage> {
    /// Wires a builder from configuration: file-backed local storage, the
    /// HTTP API when enabled, and either the built-in or a directory of templates.
    pub fn from_config(config: &BuilderConfig) -> anyhow::Result<Self> {
        let api: Option<Arc<dyn ResumeApi>> = if config.use_api {
            let client = HttpResumeApi::new(config.api_base.clone())
                .context("Failed to build the resume API client")?;
            Some(Arc::new(client))
        } else {
            None
        };
        let templates = match &config.templates_dir {
            Some(dir) => TemplateLoader::new(Box::new(DirectoryTemplates::new(dir))),
            None => TemplateLoader::builtin(),
        };
        let store = ResumeStore::new(api, FileStorage::new(&config.storage_dir));
        Builder::new(templates, store).context("Failed to load the initial template")
    }
}

impl<S: KeyValueStorage> Builder<S> {
    /// Loads the default template straight away (no fade) and renders the
    /// empty form into it.
    pub fn new(templates: TemplateLoader, store: ResumeStore<S>) -> Result<Self, BuilderError> {
        let mut builder = Self {
            state: FormState::new(),
            frame: PreviewFrame::new(),
            templates,
            queue: DeferredQueue::new(),
            store,
        };
        let def = builder.templates.prepare(&builder.state.template_id)?;
        builder.templates.activate(def, &mut builder.frame);
        builder.replay();
        builder.request_visibility();
        Ok(builder)
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn frame(&self) -> &PreviewFrame {
        &self.frame
    }

    pub fn document(&self) -> Result<&PreviewDocument, SurfaceError> {
        self.frame.document()
    }

    pub fn store(&self) -> &ResumeStore<S> {
        &self.store
    }

    pub fn active_template(&self) -> Option<&str> {
        self.templates.active_id()
    }

    pub fn available_templates(&self) -> Vec<String> {
        self.templates.available()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    // ──────────────────────────────────────────────
    // Steps
    // ──────────────────────────────────────────────

    pub fn next_step(&mut self) -> u8 {
        self.state.next_step()
    }

    pub fn prev_step(&mut self) -> u8 {
        self.state.prev_step()
    }

    pub fn go_to_step(&mut self, step: u8) -> Result<(), BuilderError> {
        Ok(self.state.go_to_step(step)?)
    }

    // ──────────────────────────────────────────────
    // Input
    // ──────────────────────────────────────────────

    /// Handles one input event for a static field. Returns the value the
    /// control should now show, with the caret to restore.
    pub fn input(&mut self, field: PreviewField, raw: &str, cursor: usize) -> NormalizedInput {
        let normalized = normalize_input(field, raw, cursor);
        self.state.set_field(field, normalized.value.clone());
        self.write_field(field);
        self.request_visibility();
        normalized
    }

    pub fn add_entry(&mut self, group: GroupKind) -> EntryId {
        let id = self.state.section_mut(group).add_blank();
        self.after_group_change(group);
        id
    }

    pub fn insert_entry(&mut self, group: GroupKind, position: usize) -> Result<EntryId, BuilderError> {
        let id = self.state.section_mut(group).insert_blank(position)?;
        self.after_group_change(group);
        Ok(id)
    }

    pub fn remove_entry(&mut self, group: GroupKind, id: EntryId) -> Result<(), BuilderError> {
        self.state.section_mut(group).remove_entry(id)?;
        self.after_group_change(group);
        Ok(())
    }

    pub fn update_entry(&mut self, id: EntryId, field: EntryField, value: &str) -> Result<(), BuilderError> {
        let group = field.group();
        self.state
            .section_mut(group)
            .update_entry(id, field, value.to_string())?;
        self.after_group_change(group);
        Ok(())
    }

    pub fn set_profile_photo(&mut self, data_url: impl Into<String>) {
        self.state.profile_photo = Some(data_url.into());
        self.apply_photo();
    }

    fn after_group_change(&mut self, group: GroupKind) {
        self.render_group(group);
        self.request_visibility();
    }

    // ──────────────────────────────────────────────
    // Preview writes
    // ──────────────────────────────────────────────

    fn write_field(&mut self, field: PreviewField) {
        let Some(manifest) = self.templates.manifest() else {
            debug!("No template loaded, skipping {:?}", field);
            return;
        };
        let doc = match self.frame.document_mut() {
            Ok(doc) => doc,
            Err(e) => {
                debug!("Skipping preview write for {:?}: {}", field, e);
                return;
            }
        };
        if let Err(e) = fields::write_field(doc, manifest, field, self.state.field(field)) {
            warn!("Preview write for {:?} failed: {}", field, e);
        }
    }

    fn render_group(&mut self, group: GroupKind) {
        let Some(container_id) = self.templates.manifest().and_then(|m| m.group_id(group)) else {
            debug!("Template does not render {:?}", group);
            return;
        };
        let doc = match self.frame.document_mut() {
            Ok(doc) => doc,
            Err(e) => {
                debug!("Skipping {:?} render: {}", group, e);
                return;
            }
        };
        if let Err(e) = self.state.section(group).render_into(doc, container_id) {
            warn!("Rendering {:?} failed: {}", group, e);
        }
    }

    fn apply_photo(&mut self) {
        let Some(manifest) = self.templates.manifest() else {
            return;
        };
        match (self.frame.document_mut(), &self.state.profile_photo) {
            (Ok(doc), Some(photo)) => {
                let updated = fields::apply_profile_photo(doc, manifest, photo);
                debug!("Profile photo applied to {} elements", updated);
            }
            (Ok(doc), None) => {
                let cleared = fields::clear_profile_photo(doc, manifest);
                debug!("Profile photo cleared from {} elements", cleared);
            }
            (Err(e), _) => debug!("Skipping profile photo: {}", e),
        }
    }

    /// Writes every field, every group and the profile photo into the
    /// current document.
    pub fn replay(&mut self) {
        for field in PreviewField::ALL {
            self.write_field(field);
        }
        for group in GroupKind::ALL {
            self.render_group(group);
        }
        self.apply_photo();
    }

    fn request_visibility(&mut self) {
        self.queue.schedule(VISIBILITY_DELAY, DeferredTask::Visibility);
    }

    fn collapse(&mut self) -> Option<VisibilityReport> {
        let manifest = self.templates.manifest()?;
        match self.frame.document_mut() {
            Ok(doc) => Some(collapse_empty_sections(doc, manifest)),
            Err(e) => {
                debug!("Skipping visibility pass: {}", e);
                None
            }
        }
    }

    // ──────────────────────────────────────────────
    // Templates and deferred work
    // ──────────────────────────────────────────────

    /// Starts a template switch. The template is resolved and validated
    /// first; a bad one is refused and the current document stays.
    pub fn select_template(&mut self, raw_id: &str) -> Result<(), BuilderError> {
        let def = self.templates.prepare(raw_id)?;
        info!("Switching to template {}", def.manifest.id);
        self.state.template_id = def.manifest.id.clone();
        self.frame.set_opacity(crate::preview::LOADING_OPACITY);
        self.queue
            .schedule(TEMPLATE_FADE_DELAY, DeferredTask::SwapDocument(Box::new(def)));
        Ok(())
    }

    fn swap_document(&mut self, def: TemplateDefinition) {
        self.frame.begin_loading(&def.manifest.id);
        self.queue
            .schedule(REPLAY_DELAY, DeferredTask::Reveal(Box::new(def)));
    }

    fn reveal(&mut self, def: TemplateDefinition) {
        self.templates.activate(def, &mut self.frame);
        self.frame.set_opacity(1.0);
        self.replay();
        self.request_visibility();
    }

    fn execute(&mut self, task: DeferredTask) {
        match task {
            DeferredTask::Visibility => {
                if let Some(report) = self.collapse() {
                    debug!(
                        "Visibility pass: {} hidden, {} shown",
                        report.hidden.len(),
                        report.shown.len()
                    );
                }
            }
            DeferredTask::SwapDocument(def) => self.swap_document(*def),
            DeferredTask::Reveal(def) => self.reveal(*def),
        }
    }

    /// Runs whatever is due now without waiting. Returns how many tasks ran.
    pub fn run_due(&mut self) -> usize {
        let tasks = self.queue.pop_due(Instant::now());
        let count = tasks.len();
        for task in tasks {
            self.execute(task);
        }
        count
    }

    /// Waits for and runs deferred work until the queue is empty, including
    /// tasks scheduled by the tasks themselves.
    pub async fn run_pending(&mut self) {
        while let Some(due) = self.queue.next_due() {
            tokio::time::sleep_until(due).await;
            self.run_due();
        }
    }

    // ──────────────────────────────────────────────
    // Persistence
    // ──────────────────────────────────────────────

    pub async fn save(&mut self) -> Result<SaveOutcome, BuilderError> {
        let outcome = self.store.save(self.state.to_record()).await?;
        self.state.record_id = Some(outcome.id.clone());
        self.state.created_at = outcome.record.created_at;
        Ok(outcome)
    }

    /// Loads a record into the form and the preview, switching template when
    /// the record names a different one.
    pub async fn load(&mut self, id: &str) -> Result<(), BuilderError> {
        let record = self.store.load(id).await?;
        self.state.apply_record(&record);
        self.replay();
        self.request_visibility();

        let wanted = normalize_template_id(&record.template_id);
        if self.templates.active_id() != Some(wanted.as_str()) {
            if let Err(e) = self.select_template(&wanted) {
                warn!("Keeping current template for resume {}: {}", id, e);
                self.state.template_id = self
                    .templates
                    .active_id()
                    .unwrap_or(resumecraft_common::DEFAULT_TEMPLATE_ID)
                    .to_string();
            }
        }
        info!("Loaded resume {}", id);
        Ok(())
    }

    /// Clears the form for a new resume, keeping the current template.
    pub fn new_resume(&mut self) {
        let template_id = self.state.template_id.clone();
        self.state = FormState::new();
        self.state.template_id = template_id;
        self.replay();
        self.request_visibility();
    }
}
