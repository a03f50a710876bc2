//! Related-note resolution.
//!
//! Two notes are related when some frontmatter field they share (by name,
//! case-folded) has a value in common. The fields that count are configured
//! through a [`RelationPolicy`]. The same pass over the vault also collects
//! every field's distinct values for metadata value completion.

use indexmap::IndexSet;
use serde::Serialize;
use tracing::debug;

use pla_core::settings::DEFAULT_RELATED_FIELDS;
use pla_core::{
    names_match, DocumentId, DocumentIndex, FieldValueIndex, MetadataField, MetadataRecord,
    Settings, POSITION_FIELD,
};

use crate::extract::extract_links;

/// Which frontmatter fields make two notes related.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationPolicy {
    fields: Vec<String>,
}

impl Default for RelationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RELATED_FIELDS.iter().copied())
    }
}

impl RelationPolicy {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.related_fields.iter().cloned())
    }

    /// Whether a field with this name takes part in relation matching.
    #[must_use]
    pub fn is_eligible(&self, name: &str) -> bool {
        name != POSITION_FIELD && self.fields.iter().any(|f| names_match(f, name))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

/// Output of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelatedLinks {
    /// Basenames of related notes, each followed by that note's own links.
    pub links: Vec<String>,
    /// Distinct values per field across every note but the active one.
    pub field_values: FieldValueIndex,
}

/// Resolve the notes related to `active` and index the vault's field values.
///
/// `active_meta` is the active note's metadata. Without it nothing is
/// related, but the field-value index is still built.
pub fn resolve_related<I>(
    index: &I,
    active: &DocumentId,
    active_meta: Option<&MetadataRecord>,
    policy: &RelationPolicy,
    include_aliases: bool,
) -> RelatedLinks
where
    I: DocumentIndex + ?Sized,
{
    let mut field_values = FieldValueIndex::new();
    let mut others = Vec::new();
    for doc in index.documents() {
        if &doc == active {
            continue;
        }
        let Some(meta) = index.metadata(&doc) else {
            continue;
        };
        field_values.merge_record(&meta);
        others.push((doc, meta));
    }

    let eligible: Vec<MetadataField<'_>> = active_meta
        .map(|meta| {
            meta.data_fields()
                .filter(|f| policy.is_eligible(f.name))
                .collect()
        })
        .unwrap_or_default();

    let mut links = IndexSet::new();
    if !eligible.is_empty() {
        for (doc, meta) in &others {
            if !is_related(&eligible, meta) {
                continue;
            }
            debug!(active = %active, related = %doc, "related note");
            links.insert(doc.basename().to_string());
            if let Some(refs) = index.parsed_links(doc) {
                links.extend(extract_links(&refs, include_aliases));
            }
        }
    }

    debug!(
        active = %active,
        links = links.len(),
        fields = field_values.len(),
        "related notes resolved"
    );
    RelatedLinks {
        links: links.into_iter().collect(),
        field_values,
    }
}

fn is_related(eligible: &[MetadataField<'_>], candidate: &MetadataRecord) -> bool {
    candidate.data_fields().any(|theirs| {
        eligible
            .iter()
            .filter(|ours| names_match(ours.name, theirs.name))
            .any(|ours| shares_value(ours.values, theirs.values))
    })
}

fn shares_value(ours: &[String], theirs: &[String]) -> bool {
    ours.iter()
        .any(|a| theirs.iter().any(|b| names_match(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pla_vault::Vault;

    fn values<'a>(fv: &'a FieldValueIndex, name: &str) -> Vec<&'a str> {
        fv.get(name).unwrap().iter().map(String::as_str).collect()
    }

    fn vault() -> Vault {
        let mut vault = Vault::in_memory();
        vault.insert_note(
            "Active.md",
            "---\ncompany: Acme\nstatus: open\n---\n",
        );
        vault.insert_note(
            "Deals/Acme Deal.md",
            "---\nCompany: acme\nstatus: closed\n---\n[[Pricing]] [[Jane Doe|Jane]]\n",
        );
        vault.insert_note(
            "Globex.md",
            "---\ncompany: Globex\nstatus: open\n---\n[[Elsewhere]]\n",
        );
        vault.insert_note("Loose.md", "no frontmatter [[Pricing]]\n");
        vault
    }

    fn resolve(vault: &Vault, policy: &RelationPolicy) -> RelatedLinks {
        let active: DocumentId = "Active.md".into();
        let meta = vault.metadata(&active);
        resolve_related(vault, &active, meta.as_ref(), policy, true)
    }

    #[test]
    fn shared_field_value_relates_notes() {
        let related = resolve(&vault(), &RelationPolicy::default());
        assert_eq!(related.links, ["Acme Deal", "Pricing", "Jane Doe", "Jane Doe|Jane"]);
    }

    #[test]
    fn unlisted_fields_do_not_relate() {
        // `status: open` is shared with Globex, but status is not a relation field.
        let related = resolve(&vault(), &RelationPolicy::default());
        assert!(!related.links.contains(&"Globex".to_string()));

        let related = resolve(&vault(), &RelationPolicy::new(["Status"]));
        assert_eq!(related.links, ["Globex", "Elsewhere"]);
    }

    #[test]
    fn field_values_cover_every_other_note() {
        let related = resolve(&vault(), &RelationPolicy::default());
        let fv = related.field_values;
        assert_eq!(values(&fv, "company"), ["Globex"]);
        assert_eq!(values(&fv, "Company"), ["acme"]);
        assert_eq!(values(&fv, "status"), ["closed", "open"]);
    }

    #[test]
    fn active_without_metadata_still_indexes_values() {
        let vault = vault();
        let active: DocumentId = "Loose.md".into();
        let related = resolve_related(&vault, &active, None, &RelationPolicy::default(), true);
        assert!(related.links.is_empty());
        assert_eq!(values(&related.field_values, "company"), ["Acme", "Globex"]);
    }

    #[test]
    fn position_is_never_eligible() {
        let policy = RelationPolicy::new(["position", "company"]);
        assert!(!policy.is_eligible("position"));
        assert!(policy.is_eligible("COMPANY"));
    }

    #[test]
    fn links_are_distinct_when_several_notes_share_targets() {
        let mut vault = vault();
        vault.insert_note("Acme Notes.md", "---\ncompany: Acme\n---\n[[Pricing]]\n");
        let related = resolve(&vault, &RelationPolicy::default());
        let pricing = related.links.iter().filter(|l| *l == "Pricing").count();
        assert_eq!(pricing, 1);
        assert!(related.links.contains(&"Acme Notes".to_string()));
    }
}
