//! Per-note session memory: the candidate pools computed when a note becomes
//! active, plus the state of the suggestion session in progress.

use serde::Serialize;
use tracing::debug;

use pla_core::{DocumentId, DocumentIndex, FieldValueIndex, MetadataRecord, Settings};

use crate::extract::extract_links;
use crate::related::{resolve_related, RelatedLinks, RelationPolicy};
use crate::titles::vault_titles;
use crate::trigger::{Mode, TriggerSequence};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionMemory {
    /// Links written in the active note.
    pub file_links: Vec<String>,
    /// Related notes and their links.
    pub yaml_links: Vec<String>,
    pub field_values: FieldValueIndex,
    /// Every note title and unresolved link target.
    pub vault_links: Vec<String>,
    pub mode: Mode,
    /// Candidates shown for the last query.
    pub match_count: usize,
    pub trigger_sequence: Option<TriggerSequence>,
    /// Values offered by the current metadata completion.
    pub completion_values: Vec<String>,
    /// Active note metadata as of the last related-note pass.
    #[serde(skip)]
    pub(crate) active_metadata: Option<MetadataRecord>,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the session in progress; the pools stay.
    pub fn reset_session(&mut self) {
        self.mode = Mode::Yaml;
        self.match_count = 0;
        self.trigger_sequence = None;
        self.completion_values.clear();
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Recompute every pool for `active`.
    pub fn recompute<I>(&mut self, index: &I, active: &DocumentId, settings: &Settings)
    where
        I: DocumentIndex + ?Sized,
    {
        self.file_links = recompute_file_links(index, active, settings.include_aliases);
        self.vault_links = recompute_vault_index(index);
        self.refresh_related(index, active, settings);
        debug!(
            note = %active,
            file_links = self.file_links.len(),
            yaml_links = self.yaml_links.len(),
            vault_links = self.vault_links.len(),
            "session memory recomputed"
        );
    }

    /// Recompute after the active note's metadata was re-resolved. Related
    /// notes are only re-resolved if the metadata actually changed.
    pub fn refresh<I>(&mut self, index: &I, active: &DocumentId, settings: &Settings)
    where
        I: DocumentIndex + ?Sized,
    {
        self.file_links = recompute_file_links(index, active, settings.include_aliases);
        self.vault_links = recompute_vault_index(index);
        if index.metadata(active) != self.active_metadata {
            self.refresh_related(index, active, settings);
        } else {
            debug!(note = %active, "metadata unchanged; related notes kept");
        }
    }

    fn refresh_related<I>(&mut self, index: &I, active: &DocumentId, settings: &Settings)
    where
        I: DocumentIndex + ?Sized,
    {
        let related = recompute_related(index, active, settings);
        self.yaml_links = related.links;
        self.field_values = related.field_values;
        self.active_metadata = index.metadata(active);
    }
}

/// Links written in `doc`.
pub fn recompute_file_links<I>(index: &I, doc: &DocumentId, include_aliases: bool) -> Vec<String>
where
    I: DocumentIndex + ?Sized,
{
    index
        .parsed_links(doc)
        .map(|refs| extract_links(&refs, include_aliases))
        .unwrap_or_default()
}

/// Notes related to `doc`, their links, and the vault's field values.
pub fn recompute_related<I>(index: &I, doc: &DocumentId, settings: &Settings) -> RelatedLinks
where
    I: DocumentIndex + ?Sized,
{
    let meta = index.metadata(doc);
    resolve_related(
        index,
        doc,
        meta.as_ref(),
        &RelationPolicy::from_settings(settings),
        settings.include_aliases,
    )
}

pub fn recompute_vault_index<I>(index: &I) -> Vec<String>
where
    I: DocumentIndex + ?Sized,
{
    vault_titles(index)
}
